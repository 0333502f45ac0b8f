//! Edge and blur filters on single-channel `f64` images.
//!
//! Conventions follow scikit-image: Sobel and Laplace use `reflect`
//! borders, Gaussian uses `nearest` borders and truncates at 4 sigma.

use ndarray::{Axis, Zip};

use crate::data::model::Image;

/// Sobel smoothing taps, `[1, 2, 1] / 4`.
const SOBEL_SMOOTH: [f64; 3] = [0.25, 0.5, 0.25];
/// Sobel derivative taps.
const SOBEL_EDGE: [f64; 3] = [1.0, 0.0, -1.0];

/// Gaussian kernels are cut off at this many standard deviations.
pub const GAUSSIAN_TRUNCATE: f64 = 4.0;

/// How samples outside the image are synthesised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Border {
    /// `d c b a | a b c d | d c b a`
    Reflect,
    /// `a a a a | a b c d | d d d d`
    Nearest,
}

impl Border {
    /// Map a possibly out-of-range index onto `0..size`. `size` must be non-zero.
    #[inline]
    pub fn index(self, i: isize, size: usize) -> usize {
        let s = size as isize;
        match self {
            Border::Nearest => i.clamp(0, s - 1) as usize,
            Border::Reflect => {
                let period = 2 * s;
                let m = i.rem_euclid(period);
                if m < s {
                    m as usize
                } else {
                    (period - 1 - m) as usize
                }
            }
        }
    }
}

/// Correlate every 1-D lane along `axis` with an odd-length, centred kernel.
pub fn correlate_axis(image: &Image, kernel: &[f64], axis: Axis, border: Border) -> Image {
    let mut output = Image::zeros(image.raw_dim());
    if image.is_empty() {
        return output;
    }
    let half = (kernel.len() / 2) as isize;
    let size = image.len_of(axis);

    for (src, mut dst) in image.lanes(axis).into_iter().zip(output.lanes_mut(axis)) {
        for i in 0..size {
            dst[i] = kernel
                .iter()
                .enumerate()
                .map(|(k, &w)| w * src[border.index(i as isize + k as isize - half, size)])
                .sum();
        }
    }
    output
}

/// Sobel edge magnitude, `sqrt((h^2 + v^2) / 2)`.
pub fn sobel(image: &Image) -> Image {
    let horizontal = correlate_axis(
        &correlate_axis(image, &SOBEL_EDGE, Axis(0), Border::Reflect),
        &SOBEL_SMOOTH,
        Axis(1),
        Border::Reflect,
    );
    let vertical = correlate_axis(
        &correlate_axis(image, &SOBEL_SMOOTH, Axis(0), Border::Reflect),
        &SOBEL_EDGE,
        Axis(1),
        Border::Reflect,
    );

    Zip::from(&horizontal)
        .and(&vertical)
        .map_collect(|&h, &v| ((h * h + v * v) / 2.0).sqrt())
}

/// Discrete Laplace operator `[[0,-1,0],[-1,4,-1],[0,-1,0]]`.
pub fn laplace(image: &Image) -> Image {
    let (rows, cols) = image.dim();
    if image.is_empty() {
        return image.clone();
    }
    let at = |r: isize, c: isize| {
        image[[
            Border::Reflect.index(r, rows),
            Border::Reflect.index(c, cols),
        ]]
    };

    Image::from_shape_fn((rows, cols), |(r, c)| {
        let (r, c) = (r as isize, c as isize);
        4.0 * at(r, c) - at(r - 1, c) - at(r + 1, c) - at(r, c - 1) - at(r, c + 1)
    })
}

/// Normalised 1-D Gaussian with radius `int(4 * sigma + 0.5)`.
///
/// Non-positive sigma yields the identity kernel `[1.0]`.
pub fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let radius = (GAUSSIAN_TRUNCATE * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| {
            let x = x as f64;
            (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    for w in kernel.iter_mut() {
        *w /= sum;
    }
    kernel
}

/// Separable Gaussian blur with `nearest` borders.
pub fn gaussian(image: &Image, sigma: f64) -> Image {
    if sigma <= 0.0 {
        return image.clone();
    }
    let kernel = gaussian_kernel(sigma);
    let rows_done = correlate_axis(image, &kernel, Axis(0), Border::Nearest);
    correlate_axis(&rows_done, &kernel, Axis(1), Border::Nearest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn close(a: &Image, b: &Image) -> bool {
        a.dim() == b.dim() && a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 1e-9)
    }

    #[test]
    fn reflect_mirrors_including_edge_sample() {
        let b = Border::Reflect;
        assert_eq!(b.index(-1, 4), 0);
        assert_eq!(b.index(-2, 4), 1);
        assert_eq!(b.index(4, 4), 3);
        assert_eq!(b.index(5, 4), 2);
        assert_eq!(b.index(9, 4), 1);
    }

    #[test]
    fn nearest_clamps() {
        assert_eq!(Border::Nearest.index(-3, 4), 0);
        assert_eq!(Border::Nearest.index(7, 4), 3);
        assert_eq!(Border::Nearest.index(2, 4), 2);
    }

    #[test]
    fn flat_image_has_no_edges() {
        let image = Image::from_elem((6, 5), 3.0);
        assert!(sobel(&image).iter().all(|&v| v.abs() < 1e-12));
        assert!(laplace(&image).iter().all(|&v| v.abs() < 1e-12));
    }

    #[test]
    fn sobel_responds_only_around_a_vertical_step() {
        let image = Image::from_shape_fn((6, 6), |(_, c)| if c < 3 { 0.0 } else { 1.0 });
        let edges = sobel(&image);

        // A unit step gives |v| = 1 on both sides, magnitude 1 / sqrt(2).
        let expected = 1.0 / 2f64.sqrt();
        for r in 0..6 {
            assert!((edges[[r, 2]] - expected).abs() < 1e-12);
            assert!((edges[[r, 3]] - expected).abs() < 1e-12);
            assert_eq!(edges[[r, 0]], 0.0);
            assert_eq!(edges[[r, 5]], 0.0);
        }
    }

    #[test]
    fn laplace_of_impulse() {
        let mut image = Image::zeros((5, 5));
        image[[2, 2]] = 1.0;
        let out = laplace(&image);

        assert_eq!(out[[2, 2]], 4.0);
        assert_eq!(out[[1, 2]], -1.0);
        assert_eq!(out[[2, 3]], -1.0);
        assert_eq!(out[[1, 1]], 0.0);
    }

    #[test]
    fn gaussian_kernel_is_normalised_and_truncated() {
        let kernel = gaussian_kernel(1.0);
        assert_eq!(kernel.len(), 9);
        assert!((kernel.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(gaussian_kernel(0.0), vec![1.0]);
    }

    #[test]
    fn zero_sigma_is_identity() {
        let image = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(gaussian(&image, 0.0), image);
    }

    #[test]
    fn gaussian_keeps_constants_and_smooths_impulses() {
        let flat = Image::from_elem((7, 7), 2.5);
        assert!(close(&gaussian(&flat, 1.5), &flat));

        let mut impulse = Image::zeros((9, 9));
        impulse[[4, 4]] = 1.0;
        let blurred = gaussian(&impulse, 1.0);
        assert!(blurred[[4, 4]] < 1.0);
        assert!(blurred[[4, 5]] > 0.0);
        assert!((blurred.sum() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn empty_images_pass_through() {
        let empty = Image::zeros((0, 3));
        assert_eq!(sobel(&empty).dim(), (0, 3));
        assert_eq!(laplace(&empty).dim(), (0, 3));
        assert_eq!(gaussian(&empty, 1.0).dim(), (0, 3));
    }
}
