//! Random Forest Classifier
//!
//! An ensemble of decision trees trained on bootstrapped, feature-subsampled slices of the data.
use std::marker::PhantomData;

use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};
use rand::{rngs::SmallRng, seq::index::sample, Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use arboretum::{
    dataset::bootstrap_indices,
    error::Error,
    metrics::{ConfusionMatrix, ToConfusionMatrix},
    traits::*,
    Category, Dataset, ParamGuard,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::hyperparams::check_unit_interval;
use super::{DecisionTree, DecisionTreeValidParams, PruneMethod, SplitCriterion};
use crate::error::{Result, TreeError};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForestValidParams<V> {
    num_bags: usize,
    min_feature_size: usize,
    prune_method: PruneMethod,
    split_criterion: SplitCriterion,
    confidence: f64,
    purity_threshold: f64,
    max_depth: Option<usize>,
    bootstrap: bool,
    bootstrap_proportion: f64,
    seed: u64,

    label_marker: PhantomData<V>,
}

impl<V> RandomForestValidParams<V> {
    pub fn num_bags(&self) -> usize {
        self.num_bags
    }

    pub fn min_feature_size(&self) -> usize {
        self.min_feature_size
    }

    pub fn prune_method(&self) -> PruneMethod {
        self.prune_method
    }

    pub fn split_criterion(&self) -> SplitCriterion {
        self.split_criterion
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn purity_threshold(&self) -> f64 {
        self.purity_threshold
    }

    pub fn max_depth(&self) -> Option<usize> {
        self.max_depth
    }

    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }

    pub fn bootstrap_proportion(&self) -> f64 {
        self.bootstrap_proportion
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Hyperparameters shared by every tree of the forest
    pub fn tree_params(&self) -> Result<DecisionTreeValidParams<V>> {
        let params = DecisionTree::params()
            .split_criterion(self.split_criterion)
            .purity_threshold(self.purity_threshold)
            .max_depth(self.max_depth)
            .chi_squared(self.prune_method == PruneMethod::ChiSquared)
            .confidence(self.confidence)
            .check()?;

        Ok(params)
    }
}

/// The set of hyperparameters that can be specified for fitting a
/// [random forest](struct.RandomForest.html).
///
/// ### Example
///
/// ```rust
/// use arboretum::prelude::*;
/// use arboretum_trees::{PruneMethod, RandomForest};
///
/// let params = RandomForest::<String>::params()
///     .num_bags(25)
///     .min_feature_size(2)
///     .prune_method(PruneMethod::ChiSquared)
///     .seed(7);
///
/// assert!(params.check_ref().is_ok());
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
pub struct RandomForestParams<V>(RandomForestValidParams<V>);

impl<V> RandomForestParams<V> {
    pub fn new() -> Self {
        Self(RandomForestValidParams {
            num_bags: 10,
            min_feature_size: 1,
            prune_method: PruneMethod::PurityThreshold,
            split_criterion: SplitCriterion::Gini,
            confidence: 0.95,
            purity_threshold: 0.9,
            max_depth: None,
            bootstrap: true,
            bootstrap_proportion: 1.0,
            seed: 42,
            label_marker: PhantomData,
        })
    }

    /// Sets the number of trees
    pub fn num_bags(mut self, num_bags: usize) -> Self {
        self.0.num_bags = num_bags;
        self
    }

    /// Sets the smallest number of attributes a tree is trained on
    pub fn min_feature_size(mut self, min_feature_size: usize) -> Self {
        self.0.min_feature_size = min_feature_size;
        self
    }

    pub fn prune_method(mut self, prune_method: PruneMethod) -> Self {
        self.0.prune_method = prune_method;
        self
    }

    pub fn split_criterion(mut self, split_criterion: SplitCriterion) -> Self {
        self.0.split_criterion = split_criterion;
        self
    }

    /// Sets the confidence level of the chi-squared test
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.0.confidence = confidence;
        self
    }

    pub fn purity_threshold(mut self, purity_threshold: f64) -> Self {
        self.0.purity_threshold = purity_threshold;
        self
    }

    pub fn max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.0.max_depth = max_depth;
        self
    }

    /// Whether rows are drawn with replacement for every tree
    ///
    /// Without bootstrapping every tree sees all rows.
    pub fn bootstrap(mut self, bootstrap: bool) -> Self {
        self.0.bootstrap = bootstrap;
        self
    }

    /// Sets the number of bootstrapped rows relative to the size of the dataset
    pub fn bootstrap_proportion(mut self, bootstrap_proportion: f64) -> Self {
        self.0.bootstrap_proportion = bootstrap_proportion;
        self
    }

    /// Sets the seed of the bagging random number generator
    pub fn seed(mut self, seed: u64) -> Self {
        self.0.seed = seed;
        self
    }
}

impl<V> Default for RandomForestParams<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> ParamGuard for RandomForestParams<V> {
    type Checked = RandomForestValidParams<V>;
    type Error = Error;

    fn check_ref(&self) -> std::result::Result<&Self::Checked, Self::Error> {
        if self.0.num_bags == 0 {
            return Err(Error::Parameters("num_bags must be > 0".into()));
        }
        if self.0.min_feature_size == 0 {
            return Err(Error::Parameters("min_feature_size must be >= 1".into()));
        }
        if self.0.bootstrap_proportion.is_nan() || self.0.bootstrap_proportion <= 0.0 {
            return Err(Error::Parameters(format!(
                "bootstrap_proportion must be > 0, but was {}",
                self.0.bootstrap_proportion
            )));
        }
        check_unit_interval("confidence", self.0.confidence)?;
        check_unit_interval("purity threshold", self.0.purity_threshold)?;

        Ok(&self.0)
    }

    fn check(self) -> std::result::Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

/// Rows and columns of the training data seen by one tree
///
/// `features` holds the sorted attribute columns followed by the target column, `rows` the
/// sampled observations in drawing order.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bag {
    features: Vec<usize>,
    rows: Vec<usize>,
}

impl Bag {
    /// Columns of the bag, the target column last
    pub fn features(&self) -> &[usize] {
        &self.features
    }

    /// Attribute columns of the bag
    pub fn attributes(&self) -> &[usize] {
        &self.features[..self.features.len() - 1]
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }
}

/// A random forest for categorical classification
///
/// Every tree is grown on a bag: a random subset of the attributes, whose size lies between the
/// configured minimum and the number of attributes, and a bootstrap sample of the rows. The
/// forest predicts the class receiving the most votes of its trees, the class voted for first
/// wins ties.
///
/// Bags are drawn from a random number generator seeded from the hyperparameters, so fitting
/// twice with the same seed gives the same forest.
///
/// ### Example
///
/// ```rust
/// use arboretum::prelude::*;
/// use arboretum_trees::RandomForest;
///
/// let dataset = Dataset::from_rows(
///     vec![
///         vec!["sunny", "hot", "no"],
///         vec!["sunny", "mild", "no"],
///         vec!["rain", "mild", "yes"],
///         vec!["overcast", "hot", "yes"],
///     ],
///     2,
/// )
/// .unwrap();
///
/// let forest = RandomForest::params().num_bags(5).fit(&dataset).unwrap();
/// let class = forest.predict_row(&["overcast", "hot"]).unwrap();
/// assert!(class == "yes" || class == "no");
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest<V> {
    trees: Vec<DecisionTree<V>>,
    bags: Vec<Bag>,
    params: RandomForestValidParams<V>,
    target: usize,
    ncols: usize,
}

impl<V> RandomForest<V> {
    /// Defaults are provided if the optional parameters are not specified:
    /// * `num_bags = 10`
    /// * `min_feature_size = 1`
    /// * `prune_method = PruneMethod::PurityThreshold`
    /// * `split_criterion = SplitCriterion::Gini`
    /// * `confidence = 0.95`
    /// * `purity_threshold = 0.9`
    /// * `max_depth = None`
    /// * `bootstrap = true`
    /// * `bootstrap_proportion = 1.0`
    /// * `seed = 42`
    // Violates the convention that new should return a value of type `Self`
    #[allow(clippy::new_ret_no_self)]
    pub fn params() -> RandomForestParams<V> {
        RandomForestParams::new()
    }

    pub fn trees(&self) -> &[DecisionTree<V>] {
        &self.trees
    }

    pub fn bags(&self) -> &[Bag] {
        &self.bags
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn hyperparams(&self) -> &RandomForestValidParams<V> {
        &self.params
    }
}

impl<V: Category> RandomForest<V> {
    /// Draws the bags and creates one untrained tree per bag
    pub fn new(dataset: &Dataset<V>, params: RandomForestValidParams<V>) -> Result<Self> {
        if dataset.nsamples() == 0 {
            return Err(Error::EmptyDataset.into());
        }

        let n_features = dataset.nfeatures();
        if params.min_feature_size > n_features {
            return Err(Error::Parameters(format!(
                "min_feature_size {} exceeds the number of attributes {}",
                params.min_feature_size, n_features
            ))
            .into());
        }

        let target = dataset.target_index();
        let columns = (0..dataset.ncols())
            .filter(|idx| *idx != target)
            .collect::<Vec<_>>();
        let n_rows = if params.bootstrap {
            ((dataset.nsamples() as f64 * params.bootstrap_proportion).ceil() as usize).max(1)
        } else {
            dataset.nsamples()
        };

        let mut rng = SmallRng::seed_from_u64(params.seed);
        let tree_params = params.tree_params()?;
        let mut trees = Vec::with_capacity(params.num_bags);
        let mut bags = Vec::with_capacity(params.num_bags);

        for _ in 0..params.num_bags {
            // a bag never holds every attribute unless the minimum asks for all of them
            let size = if params.min_feature_size < n_features {
                rng.gen_range(params.min_feature_size..n_features)
            } else {
                n_features
            };
            let mut features = sample(&mut rng, n_features, size)
                .into_iter()
                .map(|idx| columns[idx])
                .collect::<Vec<_>>();
            features.sort_unstable();
            features.push(target);

            let rows = if params.bootstrap {
                bootstrap_indices(dataset.nsamples(), n_rows, &mut rng)
            } else {
                (0..dataset.nsamples()).collect()
            };

            debug!(n_features = size, n_rows = rows.len(), "drew bag");

            let data = dataset.select_rows(&rows).project(&features)?;
            trees.push(DecisionTree::new(data, tree_params.clone())?);
            bags.push(Bag { features, rows });
        }

        Ok(RandomForest {
            trees,
            bags,
            params,
            target,
            ncols: dataset.ncols(),
        })
    }

    /// Predicts the class of a single observation
    ///
    /// The observation is either a full row in the column layout of the training data, whose
    /// target value is ignored, or the attribute values alone.
    pub fn predict_row(&self, row: &[V]) -> Result<V> {
        self.predict_view(ArrayView1::from(row))
    }

    /// Predicts the class of a single observation given as an array view
    pub fn predict_view(&self, row: ArrayView1<V>) -> Result<V> {
        let full = if row.len() == self.ncols {
            true
        } else if row.len() + 1 == self.ncols {
            false
        } else {
            return Err(Error::FeatureCountMismatch {
                expected: self.ncols - 1,
                got: row.len(),
            }
            .into());
        };

        let mut votes: Vec<(V, usize)> = Vec::new();
        for (tree, bag) in self.trees.iter().zip(&self.bags) {
            let features = bag
                .attributes()
                .iter()
                .map(|idx| {
                    let position = if full || *idx < self.target {
                        *idx
                    } else {
                        idx - 1
                    };
                    row[position].clone()
                })
                .collect::<Vec<_>>();

            let class = tree.predict_row(&features)?;
            match votes.iter_mut().find(|(voted, _)| *voted == class) {
                Some((_, count)) => *count += 1,
                None => votes.push((class, 1)),
            }
        }

        // the class voted for first wins ties
        votes
            .into_iter()
            .fold(None, |best: Option<(V, usize)>, (class, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((class, count)),
            })
            .map(|(class, _)| class)
            .ok_or(TreeError::NoVotes)
    }

    /// Evaluates the forest on a dataset with the same column layout as the training data
    pub fn test(&self, dataset: &Dataset<V>) -> Result<ConfusionMatrix<V>> {
        let predictions = self.predict(dataset)?;
        let cm = predictions.confusion_matrix(&dataset.targets())?;

        info!(
            correct = cm.correct(),
            total = cm.total(),
            accuracy = cm.percentage(),
            "random forest evaluated"
        );

        Ok(cm)
    }
}

impl<V: Category + Send + Sync> RandomForest<V> {
    /// Trains all trees in parallel
    #[instrument(skip_all, fields(n_trees = self.trees.len()))]
    pub fn train(&mut self) -> Result<()> {
        self.trees.par_iter_mut().try_for_each(|tree| tree.train())?;

        info!(
            n_leaves = self.trees.iter().map(|tree| tree.num_leaves()).sum::<usize>(),
            "random forest trained"
        );

        Ok(())
    }
}

impl<V: Category, D: Data<Elem = V>> Predict<&ArrayBase<D, Ix2>, Result<Array1<V>>>
    for RandomForest<V>
{
    /// Make predictions for each row of a matrix, with or without the target column.
    fn predict(&self, x: &ArrayBase<D, Ix2>) -> Result<Array1<V>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_view(row))
            .collect()
    }
}

impl<V: Category> Predict<&Dataset<V>, Result<Array1<V>>> for RandomForest<V> {
    /// Make predictions for each observation of a dataset, ignoring its target column.
    fn predict(&self, dataset: &Dataset<V>) -> Result<Array1<V>> {
        if dataset.ncols() != self.ncols {
            return Err(Error::FeatureCountMismatch {
                expected: self.ncols,
                got: dataset.ncols(),
            }
            .into());
        }

        let (features, _) = dataset.separate_targets();
        self.predict(&features)
    }
}

impl<V: Category + Send + Sync> Fit<V, TreeError> for RandomForestValidParams<V> {
    type Object = RandomForest<V>;

    fn fit(&self, dataset: &Dataset<V>) -> Result<Self::Object> {
        let mut forest = RandomForest::new(dataset, self.clone())?;
        forest.train()?;

        Ok(forest)
    }
}
