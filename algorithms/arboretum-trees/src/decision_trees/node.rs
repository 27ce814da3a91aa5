use std::fmt;

use tracing::trace;

use arboretum::{error::Error, Category, Dataset, LabeledDataset};

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

use super::chi_squared::chi_squared_test;
use super::impurity::{class_frequencies, max_gain_index};
use super::DecisionTreeValidParams;
use crate::error::Result;

/// Index of a node in the arena of its tree
///
/// Ids are assigned in creation order, the root is always `NodeId(0)`.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A node in the decision tree
///
/// Every node owns the slice of the training data that reaches it. On construction the node
/// picks the attribute of maximum gain and computes the purity of its slice; it is a leaf right
/// away when the slice is pure enough. Internal nodes get their children when the tree expands
/// them.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<V> {
    id: NodeId,
    level: usize,
    dataset: LabeledDataset<V>,
    attribute: Option<usize>,
    gain: f64,
    leaf: bool,
    purity: f64,
    majority_label: V,
    classes: Vec<V>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    most_diverse_child: Option<NodeId>,
}

impl<V: Category> TreeNode<V> {
    pub(crate) fn new(
        id: NodeId,
        level: usize,
        parent: Option<NodeId>,
        dataset: LabeledDataset<V>,
        params: &DecisionTreeValidParams<V>,
    ) -> Result<Self> {
        let data = &dataset.data;
        let frequencies = class_frequencies(data);

        // the first class in sorted order wins ties
        let (majority_label, majority_count) = frequencies
            .iter()
            .fold(None, |best: Option<(&V, usize)>, (class, count)| match best {
                Some((_, best_count)) if best_count >= *count => best,
                _ => Some((class, *count)),
            })
            .map(|(class, count)| (class.clone(), count))
            .ok_or(Error::EmptyDataset)?;

        let purity = majority_count as f64 / data.nsamples() as f64;
        let best = max_gain_index(data, params.split_criterion());
        let leaf = purity >= params.purity_threshold() || best.is_none();

        trace!(%id, level, purity, leaf, "created node");

        Ok(TreeNode {
            id,
            level,
            attribute: best.map(|(idx, _)| idx),
            gain: best.map(|(_, gain)| gain).unwrap_or(0.0),
            leaf,
            purity,
            majority_label,
            classes: frequencies.into_iter().map(|(class, _)| class).collect(),
            children: Vec::new(),
            parent,
            most_diverse_child: None,
            dataset,
        })
    }

    /// Decides whether the node splits and returns the partitions for its children
    ///
    /// Turns the node into a leaf when it reached the depth limit, when the split fails the
    /// chi-squared test or when the split attribute takes a single value in this slice. An empty
    /// vector is returned in all these cases.
    fn split(&mut self, params: &DecisionTreeValidParams<V>) -> Result<Vec<LabeledDataset<V>>> {
        if self.leaf {
            return Ok(Vec::new());
        }

        if params.max_depth().map_or(false, |max| self.level >= max) {
            trace!(id = %self.id, level = self.level, "depth limit reached");
            self.leaf = true;
            return Ok(Vec::new());
        }

        let attribute = match self.attribute {
            Some(attribute) => attribute,
            None => {
                self.leaf = true;
                return Ok(Vec::new());
            }
        };

        if params.chi_squared()
            && !chi_squared_test(&self.dataset.data, attribute, params.confidence())?
        {
            self.leaf = true;
            return Ok(Vec::new());
        }

        let partitions = self.dataset.data.partition(attribute);
        if partitions.len() < 2 {
            trace!(id = %self.id, attribute, "less than two partitions, node becomes a leaf");
            self.leaf = true;
            return Ok(Vec::new());
        }

        Ok(partitions)
    }
}

impl<V> TreeNode<V> {
    /// Node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Distance from the root, the root is at level zero
    pub fn level(&self) -> usize {
        self.level
    }

    /// Slice of the training data which reaches this node
    pub fn dataset(&self) -> &Dataset<V> {
        &self.dataset.data
    }

    /// Attribute value on which the parent routed to this node, `None` for the root
    pub fn branch(&self) -> Option<&V> {
        self.dataset.label.as_ref()
    }

    /// Column of maximum gain, the split attribute of internal nodes
    pub fn attribute(&self) -> Option<usize> {
        self.attribute
    }

    /// Information gain of the split attribute
    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn is_leaf(&self) -> bool {
        self.leaf
    }

    /// Proportion of the majority class
    pub fn purity(&self) -> f64 {
        self.purity
    }

    /// Most frequent class, the prediction of a leaf
    pub fn majority_label(&self) -> &V {
        &self.majority_label
    }

    /// Return the prediction of a leaf, `None` for internal nodes
    pub fn prediction(&self) -> Option<&V> {
        if self.leaf {
            Some(&self.majority_label)
        } else {
            None
        }
    }

    /// Distinct classes in this slice, sorted
    pub fn classes(&self) -> &[V] {
        &self.classes
    }

    /// Children in the order of their branch values
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child receiving observations with an attribute value not seen during training
    pub fn most_diverse_child(&self) -> Option<NodeId> {
        self.most_diverse_child
    }
}

/// Expands the node `id` of the arena
///
/// Appends one node per partition to the arena and links them to their parent. The child with
/// the most distinct classes, the first one on ties, becomes the fallback for unseen values.
/// Returns the ids of the new children.
pub(crate) fn expand<V: Category>(
    arena: &mut Vec<TreeNode<V>>,
    id: NodeId,
    params: &DecisionTreeValidParams<V>,
) -> Result<Vec<NodeId>> {
    let (partitions, level) = {
        let node = &mut arena[id.0];
        (node.split(params)?, node.level + 1)
    };

    let mut children = Vec::with_capacity(partitions.len());
    for partition in partitions {
        let child_id = NodeId(arena.len());
        arena.push(TreeNode::new(child_id, level, Some(id), partition, params)?);
        children.push(child_id);
    }

    let most_diverse_child = children
        .iter()
        .fold(None, |best: Option<(NodeId, usize)>, child| {
            let n_classes = arena[child.0].classes.len();
            match best {
                Some((_, best_classes)) if best_classes >= n_classes => best,
                _ => Some((*child, n_classes)),
            }
        })
        .map(|(child, _)| child);

    let node = &mut arena[id.0];
    node.children = children.clone();
    node.most_diverse_child = most_diverse_child;

    Ok(children)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DecisionTree, SplitCriterion};
    use arboretum::ParamGuard;

    fn params() -> DecisionTreeValidParams<&'static str> {
        DecisionTree::<&str>::params()
            .split_criterion(SplitCriterion::Entropy)
            .check_unwrap()
    }

    fn root(rows: Vec<Vec<&'static str>>, params: &DecisionTreeValidParams<&'static str>) -> TreeNode<&'static str> {
        let data = Dataset::from_rows(rows, 1).unwrap();
        TreeNode::new(NodeId(0), 0, None, LabeledDataset::root(data), params).unwrap()
    }

    #[test]
    fn pure_node_is_a_leaf() {
        let node = root(vec![vec!["x", "yes"], vec!["y", "yes"]], &params());

        assert!(node.is_leaf());
        assert_eq!(node.purity(), 1.0);
        assert_eq!(node.prediction(), Some(&"yes"));
        assert_eq!(node.classes(), &["yes"]);
    }

    #[test]
    fn majority_ties_pick_first_class() {
        let node = root(vec![vec!["x", "no"], vec!["y", "yes"]], &params());

        assert!(!node.is_leaf());
        assert_eq!(node.purity(), 0.5);
        assert_eq!(node.majority_label(), &"no");
        assert_eq!(node.attribute(), Some(0));
        assert_eq!(node.branch(), None);
    }

    #[test]
    fn expansion_links_children() -> Result<()> {
        let params = params();
        let node = root(
            vec![
                vec!["x", "no"],
                vec!["y", "yes"],
                vec!["z", "yes"],
                vec!["z", "no"],
            ],
            &params,
        );
        let mut arena = vec![node];

        let children = expand(&mut arena, NodeId(0), &params)?;
        assert_eq!(children, vec![NodeId(1), NodeId(2), NodeId(3)]);

        let branches = children
            .iter()
            .map(|id| *arena[id.0].branch().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(branches, vec!["x", "y", "z"]);

        for id in &children {
            assert_eq!(arena[id.0].parent(), Some(NodeId(0)));
            assert_eq!(arena[id.0].level(), 1);
        }

        // "z" holds both classes
        assert_eq!(arena[0].most_diverse_child(), Some(NodeId(3)));
        assert_eq!(arena[0].children(), children.as_slice());

        Ok(())
    }

    #[test]
    fn depth_limit_turns_node_into_leaf() -> Result<()> {
        let params = DecisionTree::<&str>::params().max_depth(Some(0)).check_unwrap();
        let node = root(vec![vec!["x", "no"], vec!["y", "yes"]], &params);
        let mut arena = vec![node];

        assert!(expand(&mut arena, NodeId(0), &params)?.is_empty());
        assert!(arena[0].is_leaf());
        assert_eq!(arena[0].prediction(), Some(&"no"));

        Ok(())
    }

    #[test]
    fn single_value_attribute_turns_node_into_leaf() -> Result<()> {
        let params = params();
        let node = root(vec![vec!["x", "no"], vec!["x", "yes"]], &params);
        let mut arena = vec![node];

        assert!(expand(&mut arena, NodeId(0), &params)?.is_empty());
        assert!(arena[0].is_leaf());
        assert_eq!(arena[0].most_diverse_child(), None);

        Ok(())
    }
}
