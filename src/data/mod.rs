/// Data layer: array types, file I/O and the tabular reshaping.
///
/// Architecture:
/// ```text
///  .png image      .png / .csv annotation
///        │                 │
///        ▼                 ▼
///   ┌──────────┐
///   │  loader   │  decode → Image / Annotation
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  tabular  │  FeatureStack + Annotation → TabularData (X, y)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  TabularData → .csv for a tabular classifier
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod tabular;

pub use model::{Annotation, FeatureStack, Image, MaskStack, TabularData};
pub use tabular::format_data;
