use std::collections::VecDeque;
use std::iter::Iterator;

use super::{DecisionTree, TreeNode};

/// Level-order (BFT) iterator of nodes in a decision tree
pub struct NodeIter<'a, V> {
    tree: &'a DecisionTree<V>,
    queue: VecDeque<&'a TreeNode<V>>,
}

impl<'a, V> NodeIter<'a, V> {
    pub fn new(tree: &'a DecisionTree<V>) -> Self {
        let queue = tree.nodes().iter().take(1).collect();

        NodeIter { tree, queue }
    }
}

impl<'a, V> Iterator for NodeIter<'a, V> {
    type Item = &'a TreeNode<V>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop_front().map(|node| {
            let nodes = self.tree.nodes();
            self.queue
                .extend(node.children().iter().map(|child| &nodes[child.0]));

            node
        })
    }
}
