use thiserror::Error;

// ---------------------------------------------------------------------------
// Library error type
// ---------------------------------------------------------------------------

/// Errors raised by the imaging, tabular and figure layers.
///
/// Binaries and the viewer wrap these in `anyhow` with context; inside the
/// library the only recoverable case (an unknown feature name) is logged and
/// skipped instead of returned.
#[derive(Debug, Error)]
pub enum PixelError {
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        found: Vec<usize>,
    },

    #[error("image has no pixels")]
    EmptyImage,

    #[error("image list is empty")]
    EmptyImageList,

    #[error("image contains NaN or infinite values")]
    NonFiniteImage,

    #[error("threshold step must be a positive integer")]
    InvalidStep,

    #[error("index {index} out of range for {len} titles")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Feature unknown: {0}")]
    UnknownFeature(String),

    #[error("invalid parameter for {name}: {value}")]
    InvalidParameter { name: String, value: f64 },

    #[error("title font could not be parsed")]
    Font,

    #[error("image encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, PixelError>;

impl PixelError {
    /// Shorthand for a mismatch between two ndarray shapes.
    pub fn shape(expected: &[usize], found: &[usize]) -> Self {
        PixelError::ShapeMismatch {
            expected: expected.to_vec(),
            found: found.to_vec(),
        }
    }
}
