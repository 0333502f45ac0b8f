use ndarray::Array1;

use crate::data::model::Image;
use crate::error::{PixelError, Result};

/// Side length of the coordinate grid the gradient is sampled on.
pub const BACKGROUND_GRID: usize = 60;

/// Diagonal gradient over a `BACKGROUND_GRID` square spanning [0,1] x [0,1].
///
/// Normalised to `(x + y) / 2` and scaled so the far corner equals `peak`.
pub fn gradient_background(peak: f64) -> Image {
    let axis = Array1::linspace(0.0, 1.0, BACKGROUND_GRID);
    Image::from_shape_fn((BACKGROUND_GRID, BACKGROUND_GRID), |(row, col)| {
        (axis[col] + axis[row]) / 2.0 * peak
    })
}

/// Add a diagonal gradient whose maximum is half the image maximum.
///
/// The gradient is always 60x60; any other input shape is rejected rather
/// than resampled.
pub fn add_background(image: &Image) -> Result<Image> {
    if image.is_empty() {
        return Err(PixelError::EmptyImage);
    }
    if image.dim() != (BACKGROUND_GRID, BACKGROUND_GRID) {
        return Err(PixelError::shape(
            &[BACKGROUND_GRID, BACKGROUND_GRID],
            image.shape(),
        ));
    }

    let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    Ok(image + &gradient_background(max / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Image {
        Image::from_shape_fn((60, 60), |(r, c)| ((r * 7 + c * 3) % 50) as f64)
    }

    #[test]
    fn keeps_shape_and_never_darkens() {
        let image = sample();
        let out = add_background(&image).unwrap();

        assert_eq!(out.dim(), image.dim());
        assert!(out.iter().zip(image.iter()).all(|(o, i)| o >= i));
    }

    #[test]
    fn corner_contribution_is_half_the_maximum() {
        let image = sample();
        let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let out = add_background(&image).unwrap();

        let added = out[[59, 59]] - image[[59, 59]];
        assert!((added - max / 2.0).abs() < 1e-12);
        assert_eq!(out[[0, 0]], image[[0, 0]]);
    }

    #[test]
    fn gradient_is_symmetric_along_the_diagonal() {
        let gradient = gradient_background(10.0);
        assert!((gradient[[3, 17]] - gradient[[17, 3]]).abs() < 1e-12);
        assert!((gradient[[0, 59]] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn other_shapes_are_rejected() {
        let err = add_background(&Image::zeros((32, 32))).unwrap_err();
        assert!(matches!(err, PixelError::ShapeMismatch { .. }));
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = add_background(&Image::zeros((0, 60))).unwrap_err();
        assert!(matches!(err, PixelError::EmptyImage));
    }
}
