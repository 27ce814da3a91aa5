//! Common metrics for performance evaluation of classifiers
//!
//! All metrics for categorical classification are derived from the entries of a confusion
//! matrix, which is built from a prediction and the ground truth.
use std::collections::HashMap;
use std::fmt;

use ndarray::prelude::*;
use ndarray::Data;

use crate::dataset::Category;
use crate::error::{Error, Result};

/// Return tuple of class index for each element of prediction and ground_truth
fn map_prediction_to_idx<A: Category>(
    prediction: &ArrayView1<A>,
    ground_truth: &ArrayView1<A>,
    classes: &[A],
) -> Vec<(usize, usize)> {
    // create a map from class label to index
    let set = classes
        .iter()
        .enumerate()
        .map(|(a, b)| (b, a))
        .collect::<HashMap<_, usize>>();

    // every label is part of `classes`, so the lookup cannot miss
    ground_truth
        .iter()
        .zip(prediction.iter())
        .filter_map(|(a, b)| set.get(a).and_then(|x| set.get(b).map(|y| (*x, *y))))
        .collect()
}

/// Confusion matrix for multi-label evaluation
///
/// A confusion matrix shows predictions in a matrix, where rows correspond to the ground truth
/// and columns to the prediction. The diagonal entries are correct predictions.
#[derive(Clone, PartialEq)]
pub struct ConfusionMatrix<A> {
    matrix: Array2<usize>,
    members: Array1<A>,
}

impl<A> ConfusionMatrix<A> {
    /// Number of correct predictions
    pub fn correct(&self) -> usize {
        self.matrix.diag().sum()
    }

    /// Number of evaluated predictions
    pub fn total(&self) -> usize {
        self.matrix.sum()
    }

    /// Return mean accuracy, zero for an empty evaluation
    pub fn accuracy(&self) -> f32 {
        if self.total() == 0 {
            return 0.0;
        }

        self.correct() as f32 / self.total() as f32
    }

    /// Return accuracy in percent
    pub fn percentage(&self) -> f32 {
        self.accuracy() * 100.0
    }

    /// Calculate precision for every class
    pub fn precision(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(0));

        self.matrix
            .diag()
            .iter()
            .zip(sum.iter())
            .map(|(a, b)| if *b == 0 { 0.0 } else { *a as f32 / *b as f32 })
            .collect()
    }

    /// Calculate recall for every class
    pub fn recall(&self) -> Array1<f32> {
        let sum = self.matrix.sum_axis(Axis(1));

        self.matrix
            .diag()
            .iter()
            .zip(sum.iter())
            .map(|(a, b)| if *b == 0 { 0.0 } else { *a as f32 / *b as f32 })
            .collect()
    }

    /// Classes in the order of the matrix rows and columns
    pub fn members(&self) -> ArrayView1<A> {
        self.members.view()
    }

    /// Raw counts, rows are ground truth and columns are predictions
    pub fn matrix(&self) -> ArrayView2<usize> {
        self.matrix.view()
    }
}

/// Print a confusion matrix
impl<A: fmt::Debug> fmt::Debug for ConfusionMatrix<A> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let len = self.matrix.len_of(Axis(0));
        writeln!(
            f,
            "classes    | {:?}",
            self.members.iter().collect::<Vec<_>>()
        )?;
        for i in 0..len {
            write!(f, "{:<10?} | ", self.members[i])?;

            for j in 0..len {
                write!(f, "{} | ", self.matrix[(i, j)])?;
            }
            writeln!(f)?;
        }

        writeln!(f)?;
        write!(
            f,
            "correct: {}, total: {}, accuracy: {:.2}%",
            self.correct(),
            self.total(),
            self.percentage()
        )
    }
}

/// Classification functions
///
/// Contains only routine for Confusion Matrix, as all other current metrics can be derived from
/// the entries in the matrix.
pub trait ToConfusionMatrix<A, T> {
    fn confusion_matrix(&self, ground_truth: T) -> Result<ConfusionMatrix<A>>;
}

impl<A: Category, S: Data<Elem = A>, T: Data<Elem = A>> ToConfusionMatrix<A, &ArrayBase<T, Ix1>>
    for ArrayBase<S, Ix1>
{
    fn confusion_matrix(&self, ground_truth: &ArrayBase<T, Ix1>) -> Result<ConfusionMatrix<A>> {
        if self.len() != ground_truth.len() {
            return Err(Error::FeatureCountMismatch {
                expected: ground_truth.len(),
                got: self.len(),
            });
        }

        let mut classes = ground_truth
            .iter()
            .chain(self.iter())
            .cloned()
            .collect::<Vec<_>>();
        classes.sort();
        classes.dedup();

        let indices = map_prediction_to_idx(&self.view(), &ground_truth.view(), &classes);

        // count each index tuple in the confusion matrix
        let mut matrix = Array2::zeros((classes.len(), classes.len()));
        for (i1, i2) in indices {
            matrix[(i1, i2)] += 1;
        }

        Ok(ConfusionMatrix {
            matrix,
            members: Array1::from(classes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_confusion_matrix() -> Result<()> {
        let predicted = array!["cat", "dog", "dog", "bird", "cat"];
        let ground_truth = array!["cat", "dog", "cat", "bird", "bird"];

        let cm = predicted.confusion_matrix(&ground_truth)?;

        assert_eq!(cm.members(), array!["bird", "cat", "dog"]);
        assert_eq!(cm.matrix(), array![[1usize, 1, 0], [0, 1, 1], [0, 0, 1]]);
        assert_eq!(cm.correct(), 3);
        assert_eq!(cm.total(), 5);
        assert_abs_diff_eq!(cm.accuracy(), 0.6);
        assert_abs_diff_eq!(cm.percentage(), 60.0, epsilon = 1e-4);
        assert_abs_diff_eq!(cm.precision(), array![1.0f32, 0.5, 0.5]);
        assert_abs_diff_eq!(cm.recall(), array![0.5f32, 0.5, 1.0]);

        Ok(())
    }

    #[test]
    fn test_debug_table() -> Result<()> {
        let predicted = array!["cat", "dog", "dog"];
        let ground_truth = array!["cat", "dog", "cat"];

        let table = format!("{:?}", predicted.confusion_matrix(&ground_truth)?);

        assert!(table.starts_with("classes    | [\"cat\", \"dog\"]\n"));
        assert!(table.contains("1 | 1 | "));
        assert!(table.ends_with("correct: 2, total: 3, accuracy: 66.67%"));

        Ok(())
    }

    #[test]
    fn test_length_mismatch() {
        let predicted = array!["a", "b"];
        let ground_truth = array!["a"];

        assert!(predicted.confusion_matrix(&ground_truth).is_err());
    }

    #[test]
    fn test_empty_evaluation() -> Result<()> {
        let predicted: Array1<String> = Array1::from(Vec::new());
        let cm = predicted.confusion_matrix(&predicted)?;

        assert_eq!(cm.total(), 0);
        assert_abs_diff_eq!(cm.accuracy(), 0.0);

        Ok(())
    }
}
