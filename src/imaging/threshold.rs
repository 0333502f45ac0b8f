use ndarray::{Array3, Axis};

use crate::data::model::{Image, MaskStack};
use crate::error::{PixelError, Result};

pub const DEFAULT_THRESHOLD_STEP: usize = 5;

/// Integer threshold levels from `floor(min)` up to `ceil(max)`, every `step`.
///
/// The upper bound is only included when it lands on a step boundary.
pub fn threshold_levels(image: &Image, step: usize) -> Result<Vec<i64>> {
    if step == 0 {
        return Err(PixelError::InvalidStep);
    }
    if image.is_empty() {
        return Err(PixelError::EmptyImage);
    }
    if image.iter().any(|v| !v.is_finite()) {
        return Err(PixelError::NonFiniteImage);
    }

    let min = image.iter().copied().fold(f64::INFINITY, f64::min);
    let max = image.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min_val = min.floor() as i64;
    let max_val = max.ceil() as i64;

    Ok((min_val..=max_val).step_by(step).collect())
}

/// One `image > t` mask per level of [`threshold_levels`], ascending.
pub fn apply_threshold_range(image: &Image, step: usize) -> Result<MaskStack> {
    let levels = threshold_levels(image, step)?;
    let (rows, cols) = image.dim();

    log::debug!(
        "apply_threshold_range: {} levels from {:?} to {:?}",
        levels.len(),
        levels.first(),
        levels.last()
    );

    Ok(Array3::from_shape_fn(
        (levels.len(), rows, cols),
        |(k, r, c)| image[[r, c]] > levels[k] as f64,
    ))
}

/// Number of set pixels in each mask of a stack.
pub fn mask_counts(masks: &MaskStack) -> Vec<usize> {
    masks
        .axis_iter(Axis(0))
        .map(|mask| mask.iter().filter(|&&set| set).count())
        .collect()
}

/// `(level, count of pixels > level)` for every level, without building masks.
pub fn threshold_profile(image: &Image, step: usize) -> Result<Vec<(i64, usize)>> {
    let levels = threshold_levels(image, step)?;
    Ok(levels
        .into_iter()
        .map(|t| (t, image.iter().filter(|&&v| v > t as f64).count()))
        .collect())
}
