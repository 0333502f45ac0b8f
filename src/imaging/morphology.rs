use ndarray::Array2;

use super::filters::Border;
use crate::data::model::Image;

/// Disk-shaped structuring element.
///
/// Offsets span `-floor(radius)..=floor(radius)` on both axes and a cell is
/// set when `dx^2 + dy^2 <= radius^2`. The grid is always centred on whole
/// pixels: a fractional radius only trims the disk, it does not produce the
/// half-offset footprint scikit-image builds from `arange(-r, r + 1)`.
pub fn disk(radius: f64) -> Array2<bool> {
    let extent = radius.max(0.0).floor() as isize;
    let side = (2 * extent + 1) as usize;
    Array2::from_shape_fn((side, side), |(r, c)| {
        let dy = (r as isize - extent) as f64;
        let dx = (c as isize - extent) as f64;
        dx * dx + dy * dy <= radius * radius
    })
}

/// Offsets (row, col) of the set cells of a centred footprint.
fn footprint_offsets(footprint: &Array2<bool>) -> Vec<(isize, isize)> {
    let (rows, cols) = footprint.dim();
    let (half_r, half_c) = ((rows / 2) as isize, (cols / 2) as isize);
    footprint
        .indexed_iter()
        .filter(|&(_, &set)| set)
        .map(|((r, c), _)| (r as isize - half_r, c as isize - half_c))
        .collect()
}

/// Reduce every neighbourhood selected by `footprint` with `pick`.
fn rank_filter(image: &Image, footprint: &Array2<bool>, pick: fn(f64, f64) -> f64, init: f64) -> Image {
    let (rows, cols) = image.dim();
    if image.is_empty() {
        return image.clone();
    }
    let offsets = footprint_offsets(footprint);

    Image::from_shape_fn((rows, cols), |(r, c)| {
        offsets.iter().fold(init, |acc, &(dr, dc)| {
            let rr = Border::Reflect.index(r as isize + dr, rows);
            let cc = Border::Reflect.index(c as isize + dc, cols);
            pick(acc, image[[rr, cc]])
        })
    })
}

/// Grey-level erosion: neighbourhood minimum.
pub fn erosion(image: &Image, footprint: &Array2<bool>) -> Image {
    rank_filter(image, footprint, f64::min, f64::INFINITY)
}

/// Grey-level dilation: neighbourhood maximum.
///
/// The footprint is used as-is; callers pass symmetric elements such as [`disk`].
pub fn dilation(image: &Image, footprint: &Array2<bool>) -> Image {
    rank_filter(image, footprint, f64::max, f64::NEG_INFINITY)
}

/// Erosion followed by dilation.
pub fn opening(image: &Image, footprint: &Array2<bool>) -> Image {
    dilation(&erosion(image, footprint), footprint)
}

/// White top-hat: bright details smaller than the footprint.
pub fn white_tophat(image: &Image, footprint: &Array2<bool>) -> Image {
    image - &opening(image, footprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn disk_of_radius_one_is_a_cross() {
        assert_eq!(
            disk(1.0),
            array![[false, true, false], [true, true, true], [false, true, false]]
        );
    }

    #[test]
    fn disk_of_radius_two_has_thirteen_cells() {
        let d = disk(2.0);
        assert_eq!(d.dim(), (5, 5));
        assert_eq!(d.iter().filter(|&&set| set).count(), 13);
        assert_eq!(disk(0.0), array![[true]]);
    }

    #[test]
    fn erosion_and_dilation_bound_the_image() {
        let image = Image::from_shape_fn((7, 7), |(r, c)| ((r * 5 + c * 3) % 11) as f64);
        let fp = disk(1.0);

        let eroded = erosion(&image, &fp);
        let dilated = dilation(&image, &fp);
        for ((e, d), v) in eroded.iter().zip(dilated.iter()).zip(image.iter()) {
            assert!(e <= v && v <= d);
        }
    }

    #[test]
    fn small_bright_spot_survives_top_hat() {
        let mut image = Image::zeros((7, 7));
        image[[3, 3]] = 5.0;

        let tophat = white_tophat(&image, &disk(1.0));
        assert_eq!(tophat, image);
    }

    #[test]
    fn large_plateau_interior_is_removed() {
        let image = Image::from_shape_fn((15, 15), |(r, c)| {
            if (4..=10).contains(&r) && (4..=10).contains(&c) { 1.0 } else { 0.0 }
        });

        let tophat = white_tophat(&image, &disk(1.0));
        assert_eq!(tophat[[7, 7]], 0.0);
        assert_eq!(tophat[[4, 7]], 0.0);
        assert!(tophat.iter().all(|&v| v >= 0.0));
        assert!(tophat.iter().zip(image.iter()).all(|(t, v)| t <= v));
    }

    #[test]
    fn zero_radius_top_hat_is_zero() {
        let image = Image::from_shape_fn((4, 4), |(r, c)| (r + c) as f64);
        assert!(white_tophat(&image, &disk(0.0)).iter().all(|&v| v == 0.0));
    }
}
