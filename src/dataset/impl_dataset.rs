use std::collections::{BTreeMap, BTreeSet};

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::{seq::SliceRandom, Rng};

use super::{Category, Dataset, LabeledDataset};
use crate::error::{Error, Result};

impl<V> Dataset<V> {
    /// Number of observations
    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    /// Number of columns, target included
    pub fn ncols(&self) -> usize {
        self.records.ncols()
    }

    /// Number of attribute columns, i.e. all columns except the target
    pub fn nfeatures(&self) -> usize {
        self.ncols() - 1
    }

    /// Index of the target column
    pub fn target_index(&self) -> usize {
        self.target
    }

    pub fn records(&self) -> &Array2<V> {
        &self.records
    }

    /// Returns a view on the observation at `idx`, target included
    pub fn row(&self, idx: usize) -> ArrayView1<V> {
        self.records.row(idx)
    }

    /// Returns a view on the target column
    pub fn targets(&self) -> ArrayView1<V> {
        self.records.column(self.target)
    }

    /// Returns the column names
    ///
    /// Generated names of the form `column-{idx}` are used when none were set.
    pub fn feature_names(&self) -> Vec<String> {
        if !self.feature_names.is_empty() {
            self.feature_names.clone()
        } else {
            (0..self.ncols())
                .map(|idx| format!("column-{}", idx))
                .collect()
        }
    }

    /// Updates the column names
    ///
    /// Names are ignored when their number does not match the number of columns.
    pub fn with_feature_names<I: Into<String>>(mut self, names: Vec<I>) -> Self {
        if names.len() == self.ncols() {
            self.feature_names = names.into_iter().map(|x| x.into()).collect();
        }

        self
    }
}

impl<V: Category> Dataset<V> {
    /// Create a new dataset from a table of records and the index of the target column
    pub fn new(records: Array2<V>, target: usize) -> Result<Self> {
        if target >= records.ncols() {
            return Err(Error::InvalidTarget {
                target,
                ncols: records.ncols(),
            });
        }

        Ok(Dataset {
            records,
            target,
            feature_names: Vec::new(),
        })
    }

    /// Create a new dataset from row vectors
    ///
    /// Fails when no row is given, since the number of columns is unknown in that case, or when
    /// the rows have different lengths.
    pub fn from_rows(rows: Vec<Vec<V>>, target: usize) -> Result<Self> {
        let ncols = rows.first().map(|row| row.len()).ok_or(Error::EmptyDataset)?;
        let nrows = rows.len();

        if let Some((row, got)) = rows
            .iter()
            .map(|row| row.len())
            .enumerate()
            .find(|(_, len)| *len != ncols)
        {
            return Err(Error::RaggedRows {
                row,
                expected: ncols,
                got,
            });
        }

        let flat = rows.into_iter().flatten().collect::<Vec<_>>();
        let records = Array2::from_shape_vec((nrows, ncols), flat)?;

        Dataset::new(records, target)
    }

    /// Distinct values of a column in ascending order
    pub fn unique_values(&self, column: usize) -> Vec<V> {
        self.records
            .column(column)
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of occurences of every distinct value of a column
    pub fn value_counts(&self, column: usize) -> BTreeMap<V, usize> {
        let mut counts = BTreeMap::new();
        for value in self.records.column(column) {
            *counts.entry(value.clone()).or_insert(0) += 1;
        }

        counts
    }

    /// Returns a new dataset with the selected rows in the given order
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        Dataset {
            records: self.records.select(Axis(0), indices),
            target: self.target,
            feature_names: self.feature_names.clone(),
        }
    }

    /// Splits the dataset into one slice for every distinct value of `column`
    ///
    /// The slices are ordered by their value and tagged with it. Every slice keeps the full set
    /// of columns.
    pub fn partition(&self, column: usize) -> Vec<LabeledDataset<V>> {
        let mut groups: BTreeMap<V, Vec<usize>> = BTreeMap::new();
        for (idx, value) in self.records.column(column).iter().enumerate() {
            groups.entry(value.clone()).or_default().push(idx);
        }

        groups
            .into_iter()
            .map(|(label, indices)| LabeledDataset {
                label: Some(label),
                data: self.select_rows(&indices),
            })
            .collect()
    }

    /// Separates the attribute columns from the target column
    pub fn separate_targets(&self) -> (Array2<V>, Array1<V>) {
        let columns = self.feature_columns();

        (
            self.records.select(Axis(1), &columns),
            self.targets().to_owned(),
        )
    }

    /// Returns the attribute values of the observation at `idx`, target excluded
    pub fn feature_row(&self, idx: usize) -> Array1<V> {
        self.without_target(self.records.row(idx))
    }

    /// Drops the value in the target slot of a row with the column layout of this dataset
    pub fn without_target(&self, row: ArrayView1<V>) -> Array1<V> {
        row.iter()
            .enumerate()
            .filter(|(col, _)| *col != self.target)
            .map(|(_, value)| value.clone())
            .collect()
    }

    /// Projects the dataset onto a subset of columns
    ///
    /// The target column has to be part of the projection, its new index is the position at
    /// which it appears in `columns`.
    pub fn project(&self, columns: &[usize]) -> Result<Self> {
        if let Some(idx) = columns.iter().find(|idx| **idx >= self.ncols()) {
            return Err(Error::Parameters(format!(
                "column {} is out of bounds for {} columns",
                idx,
                self.ncols()
            )));
        }

        let target = columns
            .iter()
            .position(|idx| *idx == self.target)
            .ok_or_else(|| {
                Error::Parameters(format!(
                    "projection {:?} does not contain the target column {}",
                    columns, self.target
                ))
            })?;

        let feature_names = if self.feature_names.is_empty() {
            Vec::new()
        } else {
            columns
                .iter()
                .map(|idx| self.feature_names[*idx].clone())
                .collect()
        };

        Ok(Dataset {
            records: self.records.select(Axis(1), columns),
            target,
            feature_names,
        })
    }

    /// Returns a copy of the dataset with its rows in random order
    pub fn shuffle<R: Rng>(&self, rng: &mut R) -> Self {
        let mut indices = (0..self.nsamples()).collect::<Vec<_>>();
        indices.shuffle(rng);

        self.select_rows(&indices)
    }

    /// Splits the dataset into two parts at `ratio`
    ///
    /// The first part holds `ceil(nsamples * ratio)` observations, the second one the rest. The
    /// observations are not shuffled before the split.
    pub fn split_with_ratio(self, ratio: f32) -> (Self, Self) {
        let n = self.nsamples();
        let first = ((n as f32) * ratio).ceil() as usize;
        let first = first.min(n);

        let head = (0..first).collect::<Vec<_>>();
        let tail = (first..n).collect::<Vec<_>>();

        (self.select_rows(&head), self.select_rows(&tail))
    }

    /// Draws `nsamples` observations with replacement
    pub fn bootstrap_rows<R: Rng>(&self, nsamples: usize, rng: &mut R) -> Self {
        let indices = bootstrap_indices(self.nsamples(), nsamples, rng);

        self.select_rows(&indices)
    }

    fn feature_columns(&self) -> Vec<usize> {
        (0..self.ncols()).filter(|idx| *idx != self.target).collect()
    }
}

/// Draws `nsamples` indices in `0..population` with replacement
pub fn bootstrap_indices<R: Rng>(population: usize, nsamples: usize, rng: &mut R) -> Vec<usize> {
    if population == 0 {
        return Vec::new();
    }

    (0..nsamples).map(|_| rng.gen_range(0..population)).collect()
}
