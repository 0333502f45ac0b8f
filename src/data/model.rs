use std::collections::BTreeMap;

use ndarray::{Array1, Array2, Array3};

// ---------------------------------------------------------------------------
// Array aliases
// ---------------------------------------------------------------------------

/// A single-channel image of real-valued intensities, indexed `[row, col]`.
pub type Image = Array2<f64>;

/// Ordered derived images, each with the shape of its source image.
pub type FeatureStack = Vec<Image>;

/// Per-pixel labels: `0` (or anything `<= 0`) is unlabeled, positive values are classes.
pub type Annotation = Array2<i64>;

/// Binary masks stacked along the first axis: `[threshold, row, col]`.
pub type MaskStack = Array3<bool>;

// ---------------------------------------------------------------------------
// TabularData – the (X, y) pair handed to a tabular classifier
// ---------------------------------------------------------------------------

/// Annotated pixels as samples (rows) by features (columns).
#[derive(Debug, Clone, PartialEq)]
pub struct TabularData {
    /// Feature matrix, one row per annotated pixel in raster order.
    pub x: Array2<f64>,
    /// Label per row of `x`, always `> 0`.
    pub y: Array1<i64>,
}

impl TabularData {
    /// Number of samples (annotated pixels).
    pub fn n_samples(&self) -> usize {
        self.y.len()
    }

    /// Number of feature columns.
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Whether no pixel was annotated.
    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Samples per label, sorted by label.
    pub fn class_counts(&self) -> BTreeMap<i64, usize> {
        let mut counts = BTreeMap::new();
        for &label in &self.y {
            *counts.entry(label).or_insert(0) += 1;
        }
        counts
    }
}
