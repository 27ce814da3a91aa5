//! Chi-squared significance test of a split
//!
//! The test compares the observed co-occurrence of attribute values and classes with the counts
//! expected if the attribute were independent of the target. A split is only worth taking when
//! the difference is significant at the configured confidence level.
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::debug;

use arboretum::{Category, Dataset};

use crate::error::{Result, TreeError};

/// Observed and expected counts, indexed by `[attribute value][class]`
struct ContingencyTable {
    observed: Vec<Vec<f64>>,
    expected: Vec<Vec<f64>>,
}

impl ContingencyTable {
    fn new<V: Category>(dataset: &Dataset<V>, attribute: usize) -> Self {
        let target = dataset.target_index();
        let values = dataset.unique_values(attribute);
        let classes = dataset.unique_values(target);
        let n_samples = dataset.nsamples() as f64;

        let mut observed = vec![vec![0.0; classes.len()]; values.len()];
        for row in dataset.records.rows() {
            // both lookups hit, the values were collected from the same columns
            if let (Ok(v), Ok(c)) = (
                values.binary_search(&row[attribute]),
                classes.binary_search(&row[target]),
            ) {
                observed[v][c] += 1.0;
            }
        }

        let value_totals = observed
            .iter()
            .map(|row| row.iter().sum::<f64>())
            .collect::<Vec<_>>();
        let class_totals = (0..classes.len())
            .map(|c| observed.iter().map(|row| row[c]).sum::<f64>())
            .collect::<Vec<_>>();

        let expected = value_totals
            .iter()
            .map(|value_total| {
                class_totals
                    .iter()
                    .map(|class_total| value_total * class_total / n_samples)
                    .collect()
            })
            .collect();

        ContingencyTable { observed, expected }
    }

    fn degrees_of_freedom(&self) -> usize {
        let n_values = self.observed.len();
        let n_classes = self.observed.first().map(|row| row.len()).unwrap_or(0);

        n_values.saturating_sub(1) * n_classes.saturating_sub(1)
    }

    fn statistic(&self) -> f64 {
        self.observed
            .iter()
            .flatten()
            .zip(self.expected.iter().flatten())
            .map(|(observed, expected)| {
                if *expected > 0.0 {
                    (observed - expected).powi(2) / expected
                } else {
                    0.0
                }
            })
            .sum()
    }
}

/// Chi-squared statistic of the attribute/class contingency table
///
/// Cells with an expected count of zero contribute nothing.
pub fn chi_squared_value<V: Category>(dataset: &Dataset<V>, attribute: usize) -> f64 {
    ContingencyTable::new(dataset, attribute).statistic()
}

/// Upper-tail critical value of the chi-squared distribution
///
/// Returns the value `x` with `P(X > x) = alpha` for `dof` degrees of freedom. An `alpha` of zero
/// or less yields infinity, so that no statistic exceeds it.
pub fn chi_squared_lookup(dof: f64, alpha: f64) -> Result<f64> {
    if alpha <= 0.0 {
        return Ok(f64::INFINITY);
    }

    let distribution =
        ChiSquared::new(dof).map_err(|err| TreeError::ChiSquared(err.to_string()))?;

    Ok(distribution.inverse_cdf(1.0 - alpha))
}

/// Returns true if splitting on `attribute` is significant at the given confidence
///
/// A table with zero degrees of freedom, i.e. a single attribute value or a single class, never
/// passes.
pub fn chi_squared_test<V: Category>(
    dataset: &Dataset<V>,
    attribute: usize,
    confidence: f64,
) -> Result<bool> {
    let table = ContingencyTable::new(dataset, attribute);
    let dof = table.degrees_of_freedom();
    if dof == 0 {
        debug!(attribute, "chi-squared test without degrees of freedom, split rejected");
        return Ok(false);
    }

    let statistic = table.statistic();
    let critical = chi_squared_lookup(dof as f64, 1.0 - confidence)?;
    let significant = statistic > critical;

    debug!(
        attribute,
        dof,
        statistic,
        critical,
        significant,
        "chi-squared test"
    );

    Ok(significant)
}
