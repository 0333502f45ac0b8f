use ndarray::{Array1, Array2, Axis};

use super::model::{Annotation, Image, TabularData};
use crate::error::{PixelError, Result};

// ---------------------------------------------------------------------------
// Feature stack + annotation → (X, y)
// ---------------------------------------------------------------------------

/// Reshape a feature stack and its annotation into classifier input.
///
/// Every feature is ravelled row-major and stacked into a
/// `features x pixels` matrix, which is transposed so pixels become rows.
/// Only rows whose label is `> 0` survive, in raster order.
///
/// All features must hold as many elements as the annotation.
pub fn format_data(feature_stack: &[Image], annotation: &Annotation) -> Result<TabularData> {
    let n_pixels = annotation.len();
    for feature in feature_stack {
        if feature.len() != n_pixels {
            return Err(PixelError::shape(annotation.shape(), feature.shape()));
        }
    }

    let mut flat = Vec::with_capacity(feature_stack.len() * n_pixels);
    for feature in feature_stack {
        // `iter()` walks logical (row-major) order whatever the memory layout.
        flat.extend(feature.iter().copied());
    }
    let stacked = Array2::from_shape_vec((feature_stack.len(), n_pixels), flat)
        .map_err(|_| PixelError::shape(&[feature_stack.len(), n_pixels], &[]))?;

    let labels: Array1<i64> = annotation.iter().copied().collect();
    let keep: Vec<usize> = labels
        .iter()
        .enumerate()
        .filter(|&(_, &label)| label > 0)
        .map(|(i, _)| i)
        .collect();

    let x = stacked.t().select(Axis(0), &keep);
    let y = labels.select(Axis(0), &keep);

    log::debug!(
        "format_data: {} of {n_pixels} pixels annotated, {} features",
        y.len(),
        x.ncols()
    );

    Ok(TabularData { x, y })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn four_by_four_round_trip() {
        let image = Image::zeros((4, 4));
        let annotation = array![[0, 0, 1, 1], [0, 0, 2, 2], [0, 0, 0, 0], [0, 0, 0, 0]];

        let data = format_data(&[image], &annotation).unwrap();

        assert_eq!(data.x.dim(), (4, 1));
        assert!(data.x.iter().all(|&v| v == 0.0));
        assert_eq!(data.y, array![1i64, 1, 2, 2]);
    }

    #[test]
    fn rows_follow_raster_order_not_label_order() {
        let first = array![[1.0, 2.0], [3.0, 4.0]];
        let second = array![[10.0, 20.0], [30.0, 40.0]];
        let annotation = array![[2, 0], [1, 3]];

        let data = format_data(&[first, second], &annotation).unwrap();

        assert_eq!(data.x, array![[1.0, 10.0], [3.0, 30.0], [4.0, 40.0]]);
        assert_eq!(data.y, array![2i64, 1, 3]);
    }

    #[test]
    fn counts_match_annotated_pixels() {
        let image = Image::from_shape_fn((5, 6), |(r, c)| (r * 6 + c) as f64);
        let stack = vec![image.clone(), image.mapv(|v| v * 2.0), image.mapv(f64::sqrt)];
        let annotation = Annotation::from_shape_fn((5, 6), |(r, c)| ((r + c) % 3) as i64);
        let k = annotation.iter().filter(|&&l| l > 0).count();

        let data = format_data(&stack, &annotation).unwrap();

        assert_eq!(data.n_samples(), k);
        assert_eq!(data.n_features(), 3);
        assert!(data.y.iter().all(|&l| l > 0));
    }

    #[test]
    fn non_positive_labels_are_dropped() {
        let image = array![[1.0, 2.0, 3.0]];
        let annotation = array![[-1, 0, 5]];

        let data = format_data(&[image], &annotation).unwrap();

        assert_eq!(data.x, array![[3.0]]);
        assert_eq!(data.y, array![5i64]);
    }

    #[test]
    fn transposed_feature_is_read_in_logical_order() {
        let feature = array![[1.0, 3.0], [2.0, 4.0]].reversed_axes();
        let annotation = array![[1, 1], [1, 1]];

        let data = format_data(&[feature], &annotation).unwrap();

        assert_eq!(data.x.column(0).to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn mismatched_pixel_count_is_an_error() {
        let image = Image::zeros((3, 3));
        let annotation = Annotation::ones((4, 4));

        let err = format_data(&[image], &annotation).unwrap_err();
        assert!(matches!(err, PixelError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_stack_keeps_rows_without_columns() {
        let annotation = array![[0, 1], [1, 0]];

        let data = format_data(&[], &annotation).unwrap();

        assert_eq!(data.x.dim(), (2, 0));
        assert_eq!(data.y, array![1i64, 1]);
    }

    #[test]
    fn class_counts_group_by_label() {
        let image = Image::zeros((2, 3));
        let annotation = array![[1, 2, 2], [0, 2, 1]];

        let data = format_data(&[image], &annotation).unwrap();
        let counts = data.class_counts();

        assert_eq!(counts.get(&1), Some(&2));
        assert_eq!(counts.get(&2), Some(&3));
        assert!(!data.is_empty());
    }
}
