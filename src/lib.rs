//! `arboretum` provides the shared building blocks of the arboretum workspace: a categorical
//! dataset with a designated target column, the error type, hyperparameter checking and the
//! `Fit`/`Predict` traits implemented by the learners.
//!
//! The learners themselves live in separate crates, `arboretum-trees` implements decision
//! trees over categorical attributes and random forests built from them.
//!
//! ## Datasets
//!
//! A [`Dataset`] stores every observation as one row of categorical values. One column is the
//! target, all other columns are attributes. The dataset offers the slicing helpers needed by
//! the learners (unique values, partitions, column projections) and the usual resampling
//! utilities (shuffle, train/test split, bootstrap).
//!
//! ```rust
//! use arboretum::Dataset;
//!
//! let dataset = Dataset::from_rows(
//!     vec![
//!         vec!["sunny", "hot", "no"],
//!         vec!["rain", "mild", "yes"],
//!         vec!["overcast", "hot", "yes"],
//!     ],
//!     2,
//! )
//! .unwrap();
//!
//! assert_eq!(dataset.nfeatures(), 2);
//! assert_eq!(dataset.unique_values(2), vec!["no", "yes"]);
//! ```
//!

pub mod dataset;
pub mod error;
mod metrics_classification;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Category, Dataset, LabeledDataset};
pub use error::Error;
pub use param_guard::ParamGuard;

/// Common metrics functions for classification
pub mod metrics {
    pub use crate::metrics_classification::{ConfusionMatrix, ToConfusionMatrix};
}
