//! Provide traits for different classes of algorithms
//!

use crate::dataset::{Category, Dataset};
use std::convert::From;

/// Fittable algorithms
///
/// A fittable algorithm takes a categorical dataset and creates a concept of some kind about it.
/// For example a decision tree learns split rules over the attributes which reproduce the
/// target column.
///
/// The fitting step may fail, for example when the dataset is empty or the hyperparameters do not
/// fit the dataset, so the result is wrapped in a `Result` with an error type convertible from the
/// base crate error.
pub trait Fit<V: Category, E: std::error::Error + From<crate::error::Error>> {
    type Object;

    fn fit(&self, dataset: &Dataset<V>) -> Result<Self::Object, E>;
}

/// Predict with model
///
/// This trait assumes the `Fit` trait and operates on feature records without the target column.
pub trait Predict<R, T> {
    fn predict(&self, x: R) -> T;
}
