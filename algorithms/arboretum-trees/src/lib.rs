//!
//! # Categorical decision tree learning
//! `arboretum-trees` provides decision trees and random forests over categorical attributes.
//!
//! # The big picture
//!
//! `arboretum-trees` is a crate in the arboretum workspace. The shared dataset type, the error
//! type and the `Fit`/`Predict` traits live in the `arboretum` base crate.
//!
//! A decision tree learns simple split rules over the attributes of a dataset. Every internal
//! node splits on the attribute of maximum information gain and owns one child for every value
//! the attribute takes in its slice of the data. Growth stops when a node is pure enough, when
//! the depth limit is reached or, optionally, when a chi-squared test finds the split
//! insignificant.
//!
//! # Current state
//!
//! `arboretum-trees` provides an [implementation](DecisionTree) of single-tree fitting for
//! categorical classification and a bagged [random forest](RandomForest) voting over many trees.
//!
//! ```rust
//! use arboretum::prelude::*;
//! use arboretum_trees::{DecisionTree, SplitCriterion};
//!
//! let dataset = Dataset::from_rows(
//!     vec![
//!         vec!["sunny", "high", "no"],
//!         vec!["sunny", "normal", "yes"],
//!         vec!["overcast", "high", "yes"],
//!         vec!["rain", "high", "no"],
//!         vec!["rain", "normal", "yes"],
//!     ],
//!     2,
//! )
//! .unwrap();
//!
//! let tree = DecisionTree::params()
//!     .split_criterion(SplitCriterion::Entropy)
//!     .fit(&dataset)
//!     .unwrap();
//!
//! assert_eq!(tree.predict_row(&["overcast", "normal"]).unwrap(), "yes");
//! ```
//!

mod decision_trees;
mod error;

pub use decision_trees::*;
pub use error::{Result, TreeError};
