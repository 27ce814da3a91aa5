use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use arboretum::{error::Error, ParamGuard};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use crate::error::TreeError;
use crate::DecisionTree;

/// The impurity measure used to rank the attributes a node could be split on
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitCriterion {
    /// One minus the proportion of the most frequent class, i.e. the error rate of a node which
    /// always predicts its majority class.
    MisclassificationError,
    /// Sum over all classes of the probability of the class times its logarithm in base two,
    /// with negative sign. The entropy of a node minus the weighted entropy of its children is
    /// the "information gain" of the split.
    Entropy,
    /// One minus the sum over all classes of the squared probability of the class, which is the
    /// probability of a randomly drawn observation being misclassified by a random label drawn
    /// from the same distribution.
    Gini,
}

impl SplitCriterion {
    /// Name under which the criterion is parsed
    pub fn name(&self) -> &'static str {
        match self {
            SplitCriterion::MisclassificationError => "misclassificationError",
            SplitCriterion::Entropy => "entropy",
            SplitCriterion::Gini => "gini",
        }
    }
}

impl FromStr for SplitCriterion {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "misclassificationError" => Ok(SplitCriterion::MisclassificationError),
            "entropy" => Ok(SplitCriterion::Entropy),
            "gini" => Ok(SplitCriterion::Gini),
            other => Err(TreeError::UnknownCriterion(other.to_string())),
        }
    }
}

impl fmt::Display for SplitCriterion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a random forest stops the growth of its trees
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PruneMethod {
    /// Nodes become leaves once their majority class reaches the purity threshold
    PurityThreshold,
    /// Additionally rejects splits which are not significant under a chi-squared test
    ChiSquared,
}

impl FromStr for PruneMethod {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "purityThreshold" => Ok(PruneMethod::PurityThreshold),
            "chiSquared" => Ok(PruneMethod::ChiSquared),
            other => Err(TreeError::UnknownPruneMethod(other.to_string())),
        }
    }
}

impl fmt::Display for PruneMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PruneMethod::PurityThreshold => f.write_str("purityThreshold"),
            PruneMethod::ChiSquared => f.write_str("chiSquared"),
        }
    }
}

/// The set of hyperparameters that can be specified for fitting a
/// [decision tree](struct.DecisionTree.html).
///
/// Every tree carries its own copy, so trees with different settings can be trained side by
/// side.
///
/// ### Example
///
/// ```rust
/// use arboretum_trees::{DecisionTree, SplitCriterion};
/// use arboretum::prelude::*;
///
/// // Initialize the default set of parameters
/// let params = DecisionTree::<&str>::params();
/// // Set the parameters to the desired values
/// let params = params
///     .split_criterion(SplitCriterion::Entropy)
///     .max_depth(Some(5))
///     .purity_threshold(0.95);
///
/// let checked = params.check().unwrap();
/// assert_eq!(checked.max_depth(), Some(5));
/// ```
///
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTreeValidParams<V> {
    split_criterion: SplitCriterion,
    purity_threshold: f64,
    max_depth: Option<usize>,
    chi_squared: bool,
    confidence: f64,

    label_marker: PhantomData<V>,
}

impl<V> DecisionTreeValidParams<V> {
    pub fn split_criterion(&self) -> SplitCriterion {
        self.split_criterion
    }

    pub fn purity_threshold(&self) -> f64 {
        self.purity_threshold
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn chi_squared(&self) -> bool {
        self.chi_squared
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct DecisionTreeParams<V>(DecisionTreeValidParams<V>);

impl<V> DecisionTreeParams<V> {
    pub fn new() -> Self {
        Self(DecisionTreeValidParams {
            split_criterion: SplitCriterion::Gini,
            purity_threshold: 0.9,
            max_depth: None,
            chi_squared: false,
            confidence: 0.95,
            label_marker: PhantomData,
        })
    }

    /// Sets the impurity measure used to rank the split attributes
    pub fn split_criterion(mut self, split_criterion: SplitCriterion) -> Self {
        self.0.split_criterion = split_criterion;
        self
    }

    /// Sets the proportion of the majority class at which a node stops splitting
    pub fn purity_threshold(mut self, purity_threshold: f64) -> Self {
        self.0.purity_threshold = purity_threshold;
        self
    }

    /// Sets the optional limit to the depth of the decision tree
    ///
    /// A limit of zero produces a tree consisting of the root only.
    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Enables the chi-squared significance test before every split
    pub fn chi_squared(mut self, chi_squared: bool) -> Self {
        self.0.chi_squared = chi_squared;
        self
    }

    /// Sets the confidence level of the chi-squared test
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.0.confidence = confidence;
        self
    }
}

impl<V> Default for DecisionTreeParams<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> DecisionTree<V> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `split_criterion = SplitCriterion::Gini`
    /// * `purity_threshold = 0.9`
    /// * `max_depth = None`
    /// * `chi_squared = false`
    /// * `confidence = 0.95`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> DecisionTreeParams<V> {
        DecisionTreeParams::new()
    }
}

/// Shared range check of the purity threshold and the confidence level
pub(crate) fn check_unit_interval(name: &str, value: f64) -> Result<(), Error> {
    if !(value > 0.0 && value <= 1.0) {
        Err(Error::Parameters(format!(
            "{} should be in range (0, 1], but was {}",
            name, value
        )))
    } else {
        Ok(())
    }
}

impl<V> ParamGuard for DecisionTreeParams<V> {
    type Checked = DecisionTreeValidParams<V>;
    type Error = Error;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        check_unit_interval("purity threshold", self.0.purity_threshold)?;
        check_unit_interval("confidence", self.0.confidence)?;

        Ok(&self.0)
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_criterion_names() {
        assert_eq!(
            "misclassificationError".parse::<SplitCriterion>().unwrap(),
            SplitCriterion::MisclassificationError
        );
        assert_eq!(
            "entropy".parse::<SplitCriterion>().unwrap(),
            SplitCriterion::Entropy
        );
        assert_eq!("gini".parse::<SplitCriterion>().unwrap(), SplitCriterion::Gini);

        let err = "variance".parse::<SplitCriterion>().unwrap_err();
        assert!(matches!(err, TreeError::UnknownCriterion(name) if name == "variance"));

        for criterion in &[
            SplitCriterion::MisclassificationError,
            SplitCriterion::Entropy,
            SplitCriterion::Gini,
        ] {
            assert_eq!(criterion.to_string().parse::<SplitCriterion>().unwrap(), *criterion);
        }
    }

    #[test]
    fn parse_prune_methods() {
        assert_eq!(
            "chiSquared".parse::<PruneMethod>().unwrap(),
            PruneMethod::ChiSquared
        );
        assert_eq!(
            "purityThreshold".parse::<PruneMethod>().unwrap(),
            PruneMethod::PurityThreshold
        );
        assert!(matches!(
            "none".parse::<PruneMethod>(),
            Err(TreeError::UnknownPruneMethod(_))
        ));
    }

    #[test]
    fn default_params() {
        let params = DecisionTreeParams::<&str>::default().check().unwrap();

        assert_eq!(params.split_criterion(), SplitCriterion::Gini);
        assert_eq!(params.purity_threshold(), 0.9);
        assert_eq!(params.max_depth(), None);
        assert!(!params.chi_squared());
        assert_eq!(params.confidence(), 0.95);
    }

    #[test]
    fn reject_out_of_range_params() {
        assert!(DecisionTreeParams::<&str>::new().purity_threshold(0.0).check().is_err());
        assert!(DecisionTreeParams::<&str>::new().purity_threshold(1.5).check().is_err());
        assert!(DecisionTreeParams::<&str>::new()
            .purity_threshold(f64::NAN)
            .check()
            .is_err());
        assert!(DecisionTreeParams::<&str>::new().confidence(0.0).check().is_err());
        assert!(DecisionTreeParams::<&str>::new().confidence(1.0).check().is_ok());
        assert!(DecisionTreeParams::<&str>::new().purity_threshold(1.0).check().is_ok());
    }
}
