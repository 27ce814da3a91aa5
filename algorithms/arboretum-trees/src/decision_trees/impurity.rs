//! Impurity measures and information gain
//!
//! All measures are computed on the class distribution of the target column of a dataset. An
//! empty dataset is considered pure.
use std::collections::BTreeMap;

use arboretum::{error::Error, Category, Dataset};

use super::SplitCriterion;
use crate::error::Result;

/// Proportion of every class in the target column, in class order
fn class_proportions<V: Category>(dataset: &Dataset<V>) -> Vec<f64> {
    let counts = dataset.value_counts(dataset.target_index());
    let n_samples = dataset.nsamples() as f64;

    counts
        .values()
        .map(|count| *count as f64 / n_samples)
        .collect()
}

/// Number of occurences of every class in the target column
pub(crate) fn class_frequencies<V: Category>(dataset: &Dataset<V>) -> BTreeMap<V, usize> {
    dataset.value_counts(dataset.target_index())
}

/// Calculates the misclassification error of the target column of a dataset.
pub fn misclassification_error<V: Category>(dataset: &Dataset<V>) -> f64 {
    let max = class_proportions(dataset)
        .into_iter()
        .fold(0.0, f64::max);

    if dataset.nsamples() == 0 {
        0.0
    } else {
        1.0 - max
    }
}

/// Calculates the entropy of the target column of a dataset.
pub fn entropy<V: Category>(dataset: &Dataset<V>) -> f64 {
    class_proportions(dataset)
        .into_iter()
        .map(|x| if x > 0.0 { -x * x.log2() } else { 0.0 })
        .sum()
}

/// Calculates the gini impurity of the target column of a dataset.
pub fn gini<V: Category>(dataset: &Dataset<V>) -> f64 {
    if dataset.nsamples() == 0 {
        return 0.0;
    }

    let purity = class_proportions(dataset)
        .into_iter()
        .map(|x| x * x)
        .sum::<f64>();

    1.0 - purity
}

/// Impurity of the subset under the given criterion
pub fn impurity<V: Category>(dataset: &Dataset<V>, criterion: SplitCriterion) -> f64 {
    match criterion {
        SplitCriterion::MisclassificationError => misclassification_error(dataset),
        SplitCriterion::Entropy => entropy(dataset),
        SplitCriterion::Gini => gini(dataset),
    }
}

/// Information gain of splitting the dataset on `attribute`
///
/// This is the impurity of the dataset minus the weighted impurity of the partitions induced by
/// every distinct value of the attribute, each partition weighted by its share of the rows.
pub fn gain<V: Category>(
    dataset: &Dataset<V>,
    criterion: SplitCriterion,
    attribute: usize,
) -> Result<f64> {
    if attribute >= dataset.ncols() {
        return Err(Error::Parameters(format!(
            "attribute {} is out of bounds for {} columns",
            attribute,
            dataset.ncols()
        ))
        .into());
    }
    if attribute == dataset.target_index() {
        return Err(Error::Parameters(format!(
            "attribute {} is the target column",
            attribute
        ))
        .into());
    }

    Ok(split_gain(dataset, criterion, attribute))
}

fn split_gain<V: Category>(dataset: &Dataset<V>, criterion: SplitCriterion, attribute: usize) -> f64 {
    let n_samples = dataset.nsamples() as f64;
    if n_samples == 0.0 {
        return 0.0;
    }

    let weighted = dataset
        .partition(attribute)
        .iter()
        .map(|part| part.data.nsamples() as f64 / n_samples * impurity(&part.data, criterion))
        .sum::<f64>();

    impurity(dataset, criterion) - weighted
}

/// Finds the attribute of maximum information gain
///
/// Every column except the target is a candidate. On ties the lowest column index wins. Returns
/// `None` when the dataset has no attribute column.
pub fn max_gain_index<V: Category>(
    dataset: &Dataset<V>,
    criterion: SplitCriterion,
) -> Option<(usize, f64)> {
    (0..dataset.ncols())
        .filter(|idx| *idx != dataset.target_index())
        .map(|idx| (idx, split_gain(dataset, criterion, idx)))
        .fold(None, |best, (idx, gain)| match best {
            Some((_, best_gain)) if best_gain >= gain => best,
            _ => Some((idx, gain)),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn dataset(rows: Vec<Vec<&'static str>>, target: usize) -> Dataset<&'static str> {
        Dataset::from_rows(rows, target).unwrap()
    }

    #[test]
    fn gini_impurity_example() {
        // Class a occurs 75% of the time, class b 25% of the time
        // Gini impurity is 1 - 0.75*0.75 - 0.25*0.25 = 0.375
        let data = dataset(vec![vec!["a"], vec!["a"], vec!["a"], vec!["b"]], 0);

        assert_abs_diff_eq!(gini(&data), 0.375, epsilon = 1e-10);
        assert_abs_diff_eq!(misclassification_error(&data), 0.25, epsilon = 1e-10);
    }

    #[test]
    fn entropy_example() {
        // Entropy is -0.75*log2(0.75) - 0.25*log2(0.25) = 0.81127812
        let data = dataset(vec![vec!["a"], vec!["a"], vec!["a"], vec!["b"]], 0);
        assert_abs_diff_eq!(entropy(&data), 0.81127, epsilon = 1e-5);

        // If the subset is pure then entropy is zero
        let pure = dataset(vec![vec!["a"], vec!["a"]], 0);
        assert_abs_diff_eq!(entropy(&pure), 0.0);
    }

    #[test]
    fn gain_of_perfect_and_uncorrelated_attributes() -> Result<()> {
        // column 0 determines the class, column 1 carries no information about it
        let data = dataset(
            vec![
                vec!["x", "p", "yes"],
                vec!["x", "q", "yes"],
                vec!["y", "p", "no"],
                vec!["y", "q", "no"],
            ],
            2,
        );

        assert_abs_diff_eq!(
            gain(&data, SplitCriterion::Entropy, 0)?,
            entropy(&data),
            epsilon = 1e-10
        );
        assert_abs_diff_eq!(gain(&data, SplitCriterion::Entropy, 1)?, 0.0, epsilon = 1e-10);
        assert_abs_diff_eq!(gain(&data, SplitCriterion::Gini, 0)?, 0.5, epsilon = 1e-10);

        assert_eq!(max_gain_index(&data, SplitCriterion::Entropy).map(|x| x.0), Some(0));

        Ok(())
    }

    #[test]
    fn gain_rejects_target_and_out_of_range() {
        let data = dataset(vec![vec!["x", "yes"], vec!["y", "no"]], 1);

        assert!(gain(&data, SplitCriterion::Gini, 1).is_err());
        assert!(gain(&data, SplitCriterion::Gini, 2).is_err());
    }

    #[test]
    fn max_gain_ties_pick_lowest_index() {
        // target in the middle, both attributes are identical copies
        let data = dataset(
            vec![vec!["x", "yes", "x"], vec!["y", "no", "y"], vec!["y", "no", "y"]],
            1,
        );

        let (idx, gain) = max_gain_index(&data, SplitCriterion::MisclassificationError).unwrap();
        assert_eq!(idx, 0);
        assert_abs_diff_eq!(gain, 1.0 / 3.0, epsilon = 1e-10);

        let target_only = dataset(vec![vec!["yes"], vec!["no"]], 0);
        assert!(max_gain_index(&target_only, SplitCriterion::Gini).is_none());
    }
}
