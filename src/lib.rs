//! Support routines for explaining pixel classifiers with SHAP.
//!
//! ```text
//!   image (.png)            annotation (.png / .csv)
//!        │                          │
//!        ▼                          │
//!   ┌────────────┐                  │
//!   │  imaging    │ background, thresholds, feature stack
//!   └────────────┘                  │
//!        │                          │
//!        ▼                          ▼
//!   ┌──────────────────────────────────┐
//!   │  data::tabular   format_data → (X, y) │
//!   └──────────────────────────────────┘
//!        │
//!        ▼
//!   ┌────────────┐
//!   │  figure     │ titled panels, captured as an RGB array
//!   └────────────┘
//! ```

pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod figure;
pub mod imaging;

pub use error::{PixelError, Result};
