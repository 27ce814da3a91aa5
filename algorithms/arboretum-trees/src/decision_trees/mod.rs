mod algorithm;
mod chi_squared;
mod hyperparams;
mod impurity;
mod iter;
mod node;
mod random_forest;
mod tikz;

pub use algorithm::*;
pub use chi_squared::{chi_squared_lookup, chi_squared_test, chi_squared_value};
pub use hyperparams::*;
pub use impurity::{entropy, gain, gini, impurity, max_gain_index, misclassification_error};
pub use iter::*;
pub use node::{NodeId, TreeNode};
pub use random_forest::*;
pub use tikz::*;
