/// Imaging layer: synthetic background, threshold masks and the feature bank.
///
/// Architecture:
/// ```text
///   Image (Array2<f64>)
///        │
///        ├──► background   fixed 60x60 diagonal gradient
///        ├──► threshold    one `image > t` mask per integer level
///        │
///        ▼
///   ┌──────────┐
///   │ features  │  FeatureKind → filters / morphology → FeatureStack
///   └──────────┘
/// ```

pub mod background;
pub mod features;
pub mod filters;
pub mod morphology;
pub mod threshold;

pub use background::add_background;
pub use features::{FeatureKind, generate_feature_stack, generate_feature_stack_by_name};
pub use threshold::{DEFAULT_THRESHOLD_STEP, apply_threshold_range};
