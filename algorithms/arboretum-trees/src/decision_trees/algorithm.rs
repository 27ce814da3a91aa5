//! Categorical decision trees
//!
use std::collections::{BTreeSet, VecDeque};

use ndarray::{Array1, ArrayBase, ArrayView1, Data, Ix2};
use tracing::{info, instrument, trace};

use arboretum::{
    error::Error,
    metrics::{ConfusionMatrix, ToConfusionMatrix},
    traits::*,
    Category, Dataset, LabeledDataset,
};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::node::{expand, NodeId, TreeNode};
use super::{DecisionTreeValidParams, NodeIter, Tikz};
use crate::error::{Result, TreeError};

/// A fitted decision tree model for categorical classification.
///
/// ### Structure
/// The nodes of the tree live in a flat arena in the order in which they were created, the root
/// first. Every internal node splits on one attribute and has one child for every value the
/// attribute takes in the training slice of the node. Children refer to their parent and parents
/// to their children by [`NodeId`], an index into the arena.
///
/// ### Algorithm
/// Nodes are expanded in breadth-first order. On construction a node determines the attribute
/// of maximum information gain and the purity of its slice. It stops splitting when the purity
/// reaches the threshold, when the depth limit is reached, when the chi-squared test rejects the
/// split (if enabled) or when the attribute takes a single value in the slice.
///
/// ### Predictions
/// An observation walks from the root along the children matching its attribute values. A value
/// never seen during training is routed to the child holding the most distinct classes. The
/// prediction is the majority class of the leaf reached.
///
/// ### Example
///
/// ```rust
/// use arboretum::prelude::*;
/// use arboretum_trees::DecisionTree;
///
/// let dataset = Dataset::from_rows(
///     vec![
///         vec!["red", "round", "apple"],
///         vec!["yellow", "long", "banana"],
///         vec!["green", "round", "apple"],
///         vec!["yellow", "round", "lemon"],
///     ],
///     2,
/// )
/// .unwrap();
///
/// let mut tree = DecisionTree::new(dataset.clone(), DecisionTree::params().check_unwrap()).unwrap();
/// tree.train().unwrap();
///
/// let cm = tree.test(&dataset).unwrap();
/// assert_eq!(cm.accuracy(), 1.0);
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree<V> {
    nodes: Vec<TreeNode<V>>,
    params: DecisionTreeValidParams<V>,
    target: usize,
    ncols: usize,
    trained: bool,
}

impl<V: Category> DecisionTree<V> {
    /// Creates an untrained tree whose root holds the whole dataset
    pub fn new(dataset: Dataset<V>, params: DecisionTreeValidParams<V>) -> Result<Self> {
        if dataset.nsamples() == 0 {
            return Err(Error::EmptyDataset.into());
        }

        let target = dataset.target_index();
        let ncols = dataset.ncols();
        let root = TreeNode::new(NodeId(0), 0, None, LabeledDataset::root(dataset), &params)?;

        Ok(DecisionTree {
            nodes: vec![root],
            params,
            target,
            ncols,
            trained: false,
        })
    }

    /// Grows the tree in breadth-first order
    ///
    /// Training an already trained tree does nothing.
    #[instrument(skip_all, fields(n_samples = self.nodes[0].dataset().nsamples()))]
    pub fn train(&mut self) -> Result<()> {
        if self.trained {
            return Ok(());
        }

        let mut queue = VecDeque::new();
        queue.push_back(NodeId(0));

        while let Some(id) = queue.pop_front() {
            let children = expand(&mut self.nodes, id, &self.params)?;
            queue.extend(children);
        }

        self.trained = true;

        info!(
            n_nodes = self.nodes.len(),
            n_leaves = self.num_leaves(),
            depth = self.depth(),
            "decision tree trained"
        );

        Ok(())
    }

    /// Predicts the class of a single observation
    ///
    /// `features` holds the attribute values in column order with the target column left out.
    pub fn predict_row(&self, features: &[V]) -> Result<V> {
        self.predict_view(ArrayView1::from(features))
    }

    /// Predicts the class of a single observation given as an array view
    pub fn predict_view(&self, features: ArrayView1<V>) -> Result<V> {
        let expected = self.ncols - 1;
        if features.len() != expected {
            return Err(Error::FeatureCountMismatch {
                expected,
                got: features.len(),
            }
            .into());
        }

        Ok(self.leaf_for(&features).majority_label().clone())
    }

    fn leaf_for(&self, features: &ArrayView1<V>) -> &TreeNode<V> {
        let mut node = &self.nodes[0];

        while !node.is_leaf() {
            let attribute = match node.attribute() {
                Some(attribute) => attribute,
                None => break,
            };
            // the target column is missing from the features
            let position = if attribute > self.target {
                attribute - 1
            } else {
                attribute
            };
            let value = &features[position];

            let matching = node
                .children()
                .iter()
                .map(|child| &self.nodes[child.0])
                .find(|child| child.branch() == Some(value));

            node = match matching {
                Some(child) => child,
                None => match node.most_diverse_child() {
                    Some(fallback) => {
                        trace!(id = %node.id(), ?value, "unseen value, using most diverse child");
                        &self.nodes[fallback.0]
                    }
                    None => break,
                },
            };
        }

        node
    }

    /// Evaluates the tree on a dataset with the same column layout as the training data
    pub fn test(&self, dataset: &Dataset<V>) -> Result<ConfusionMatrix<V>> {
        let predictions = self.predict(dataset)?;
        let cm = predictions.confusion_matrix(&dataset.targets())?;

        info!(
            correct = cm.correct(),
            total = cm.total(),
            accuracy = cm.percentage(),
            "decision tree evaluated"
        );

        Ok(cm)
    }
}

impl<V: Category, D: Data<Elem = V>> Predict<&ArrayBase<D, Ix2>, Result<Array1<V>>>
    for DecisionTree<V>
{
    /// Make predictions for each row of a matrix of features `x`, target column excluded.
    fn predict(&self, x: &ArrayBase<D, Ix2>) -> Result<Array1<V>> {
        x.rows()
            .into_iter()
            .map(|row| self.predict_view(row))
            .collect()
    }
}

impl<V: Category> Predict<&Dataset<V>, Result<Array1<V>>> for DecisionTree<V> {
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

impl<V: Category> Fit<V, TreeError> for DecisionTreeValidParams<V> {
    type Object = DecisionTree<V>;

    /// Fit a decision tree using the hyperparameters on the dataset
    fn fit(&self, dataset: &Dataset<V>) -> Result<Self::Object> {
        let mut tree = DecisionTree::new(dataset.clone(), self.clone())?;
        tree.train()?;

        Ok(tree)
    }
}

impl<V> DecisionTree<V> {
    /// Create a node iterator in level-order (BFT)
    pub fn iter_nodes(&self) -> NodeIter<V> {
        NodeIter::new(self)
    }

    /// Return all nodes in creation order, the root first
    pub fn nodes(&self) -> &[TreeNode<V>] {
        &self.nodes
    }

    /// Return root node of the tree
    pub fn root(&self) -> &TreeNode<V> {
        &self.nodes[0]
    }

    /// Return the node with the given id
    pub fn node(&self, id: NodeId) -> Option<&TreeNode<V>> {
        self.nodes.get(id.0)
    }

    /// Return the hyperparameters the tree was grown with
    pub fn hyperparams(&self) -> &DecisionTreeValidParams<V> {
        &self.params
    }

    pub fn is_trained(&self) -> bool {
        self.trained
    }

    /// Index of the target column in the training data
    pub fn target_index(&self) -> usize {
        self.target
    }

    /// Column names of the training data
    pub fn feature_names(&self) -> Vec<String> {
        self.nodes[0].dataset().feature_names()
    }

    /// Return the ids on the path from the root to every leaf
    ///
    /// Paths are listed in the order in which the leaves were created and start with the root.
    pub fn paths(&self) -> Vec<Vec<NodeId>> {
        self.nodes
            .iter()
            .filter(|node| node.is_leaf())
            .map(|leaf| {
                let mut path = vec![leaf.id()];
                let mut current = leaf.parent();
                while let Some(id) = current {
                    path.push(id);
                    current = self.nodes[id.0].parent();
                }
                path.reverse();

                path
            })
            .collect()
    }

    /// Return the attributes used by at least one split, sorted
    pub fn features(&self) -> Vec<usize> {
        self.iter_nodes()
            .filter(|node| !node.children().is_empty())
            .filter_map(|node| node.attribute())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Return the mean gain of the splits on each column
    pub fn mean_gain(&self) -> Vec<f64> {
        let mut gain = vec![0.0; self.ncols];
        let mut num_nodes = vec![0; self.ncols];

        for node in self.iter_nodes().filter(|node| !node.children().is_empty()) {
            if let Some(attribute) = node.attribute() {
                gain[attribute] += node.gain();
                num_nodes[attribute] += 1;
            }
        }

        gain.into_iter()
            .zip(num_nodes.into_iter())
            .map(|(val, n)| if n == 0 { 0.0 } else { val / n as f64 })
            .collect()
    }

    /// Return the feature importance, i.e. the relative mean gain, for each column
    ///
    /// The target column and unused attributes have an importance of zero. A tree without
    /// splits has no important feature at all.
    pub fn feature_importance(&self) -> Vec<f64> {
        let mean_gain = self.mean_gain();
        let sum = mean_gain.iter().sum::<f64>();

        mean_gain
            .into_iter()
            .map(|x| if sum > 0.0 { x / sum } else { 0.0 })
            .collect()
    }

    /// Return the level of the deepest node
    pub fn depth(&self) -> usize {
        self.nodes.iter().map(|node| node.level()).max().unwrap_or(0)
    }

    /// Return the number of leaves in this tree
    pub fn num_leaves(&self) -> usize {
        self.nodes.iter().filter(|node| node.is_leaf()).count()
    }
}

impl<V: std::fmt::Debug> DecisionTree<V> {
    /// Generates a [`Tikz`](struct.Tikz.html) structure to print the
    /// fitted tree in Tex using tikz and forest, with the following default parameters:
    ///
    /// * `legend=false`
    /// * `complete=true`
    ///
    pub fn export_to_tikz(&self) -> Tikz<V> {
        Tikz::new(self)
    }
}
