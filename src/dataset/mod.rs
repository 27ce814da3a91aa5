//! Datasets
//!
//! This module implements the categorical dataset struct and the helpers used by the tree
//! learners to slice, partition and resample it.
use ndarray::Array2;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use std::fmt;
use std::hash::Hash;

mod impl_dataset;

pub use impl_dataset::bootstrap_indices;

/// Categorical values
///
/// Categories are countable, comparable and hashable. The total order is only used to make every
/// iteration over distinct values deterministic, it carries no meaning for the learners. Strings,
/// string slices, integers, booleans and chars are the usual choices.
pub trait Category: Eq + Hash + Ord + Clone + fmt::Debug {}

impl<T: Eq + Hash + Ord + Clone + fmt::Debug> Category for T {}

/// Dataset
///
/// A table of categorical values where every row is an observation and one column is designated
/// as the target. In contrast to a split records/targets layout the target stays inside the
/// table, so that column projections and partitions carry it along.
///
/// # Fields
///
/// * `records`: a two-dimensional matrix with dimensionality (nsamples, ncols), including the
/// target column
/// * `target`: index of the target column
/// * `feature_names`: optional descriptive column names with dimensionality (ncols)
///
/// # Invariants
///
/// All rows have the same length, which `Array2` guarantees, and `target < ncols`.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<V> {
    pub records: Array2<V>,
    target: usize,
    feature_names: Vec<String>,
}

/// A dataset slice tagged with the attribute value which produced it
///
/// The root of a tree carries no label, every other slice holds the value its parent was split
/// on.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledDataset<V> {
    pub label: Option<V>,
    pub data: Dataset<V>,
}

impl<V> LabeledDataset<V> {
    /// Wraps the dataset given to a tree root
    pub fn root(data: Dataset<V>) -> Self {
        LabeledDataset { label: None, data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use ndarray::{array, Array1};
    use rand::{rngs::SmallRng, SeedableRng};

    fn weather() -> Dataset<&'static str> {
        Dataset::from_rows(
            vec![
                vec!["sunny", "hot", "no"],
                vec!["sunny", "mild", "no"],
                vec!["rain", "mild", "yes"],
                vec!["overcast", "hot", "yes"],
                vec!["rain", "cool", "yes"],
                vec!["sunny", "cool", "yes"],
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn dataset_implements_required_methods() {
        let dataset = weather();

        assert_eq!(dataset.nsamples(), 6);
        assert_eq!(dataset.ncols(), 3);
        assert_eq!(dataset.nfeatures(), 2);
        assert_eq!(dataset.target_index(), 2);
        assert_eq!(
            dataset.targets(),
            array!["no", "no", "yes", "yes", "yes", "yes"]
        );
        assert_eq!(
            dataset.feature_names(),
            vec!["column-0", "column-1", "column-2"]
        );

        let named = dataset.with_feature_names(vec!["outlook", "temperature", "play"]);
        assert_eq!(named.feature_names(), vec!["outlook", "temperature", "play"]);
    }

    #[test]
    fn rejects_malformed_tables() {
        let ragged = Dataset::from_rows(vec![vec!["a", "b"], vec!["c"]], 1);
        assert!(matches!(
            ragged,
            Err(Error::RaggedRows {
                row: 1,
                expected: 2,
                got: 1
            })
        ));

        let target = Dataset::new(array![["a", "b"]], 2);
        assert!(matches!(
            target,
            Err(Error::InvalidTarget { target: 2, ncols: 2 })
        ));

        let empty: Result<Dataset<String>, _> = Dataset::from_rows(vec![], 0);
        assert!(matches!(empty, Err(Error::EmptyDataset)));
    }

    #[test]
    fn unique_values_are_sorted() {
        let dataset = weather();

        assert_eq!(dataset.unique_values(0), vec!["overcast", "rain", "sunny"]);
        assert_eq!(dataset.unique_values(2), vec!["no", "yes"]);

        let counts = dataset.value_counts(1);
        assert_eq!(counts.get("hot"), Some(&2));
        assert_eq!(counts.get("mild"), Some(&2));
        assert_eq!(counts.get("cool"), Some(&2));
    }

    #[test]
    fn partition_by_column() {
        let dataset = weather();
        let parts = dataset.partition(0);

        let labels = parts.iter().map(|p| p.label.unwrap()).collect::<Vec<_>>();
        assert_eq!(labels, vec!["overcast", "rain", "sunny"]);

        let sizes = parts.iter().map(|p| p.data.nsamples()).collect::<Vec<_>>();
        assert_eq!(sizes, vec![1, 2, 3]);

        for part in &parts {
            assert_eq!(part.data.target_index(), 2);
            assert_eq!(part.data.unique_values(0), vec![part.label.unwrap()]);
        }
    }

    #[test]
    fn separate_and_project() -> crate::error::Result<()> {
        let dataset = weather();

        let (features, targets) = dataset.separate_targets();
        assert_eq!(features.dim(), (6, 2));
        assert_eq!(features.row(0), array!["sunny", "hot"]);
        assert_eq!(targets, dataset.targets());

        let projected = dataset.project(&[1, 2])?;
        assert_eq!(projected.ncols(), 2);
        assert_eq!(projected.target_index(), 1);
        assert_eq!(projected.records.row(3), array!["hot", "yes"]);

        assert!(dataset.project(&[0, 1]).is_err());
        assert!(dataset.project(&[0, 7, 2]).is_err());

        assert_eq!(
            dataset.feature_row(2),
            Array1::from(vec!["rain", "mild"])
        );
        assert_eq!(
            dataset.without_target(array!["overcast", "hot", "yes"].view()),
            array!["overcast", "hot"]
        );

        Ok(())
    }

    #[test]
    fn shuffle_split_and_bootstrap() {
        let mut rng = SmallRng::seed_from_u64(42);
        let dataset = weather();

        let shuffled = dataset.shuffle(&mut rng);
        assert_eq!(shuffled.nsamples(), dataset.nsamples());
        let mut before = dataset.targets().to_vec();
        let mut after = shuffled.targets().to_vec();
        before.sort();
        after.sort();
        assert_eq!(before, after);

        let (train, test) = shuffled.split_with_ratio(0.5);
        assert_eq!(train.nsamples(), 3);
        assert_eq!(test.nsamples(), 3);

        let (train, test) = dataset.clone().split_with_ratio(0.75);
        assert_eq!(train.nsamples(), 5);
        assert_eq!(test.nsamples(), 1);

        let sample = dataset.bootstrap_rows(10, &mut rng);
        assert_eq!(sample.nsamples(), 10);
        assert_eq!(sample.ncols(), 3);
    }
}
