use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::figure::DEFAULT_FIGURE_SIZE;
use crate::imaging::{DEFAULT_THRESHOLD_STEP, FeatureKind};

// ---------------------------------------------------------------------------
// Demo configuration
// ---------------------------------------------------------------------------

/// Canvas size of captured figures, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FigureConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_FIGURE_SIZE.0,
            height: DEFAULT_FIGURE_SIZE.1,
        }
    }
}

/// Everything the viewer and `export_features` need besides the input files.
///
/// Every field is optional in the JSON file:
///
/// ```json
/// {
///   "features": [{"kind": "original"}, {"kind": "gaussian", "parameter": 2.0}],
///   "threshold_step": 5,
///   "add_background": false,
///   "figure": {"width": 1000, "height": 1000}
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub features: Vec<FeatureKind>,
    pub threshold_step: usize,
    pub add_background: bool,
    pub figure: FigureConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            features: default_features(),
            threshold_step: DEFAULT_THRESHOLD_STEP,
            add_background: false,
            figure: FigureConfig::default(),
        }
    }
}

/// The filter bank requested when no configuration is given.
pub fn default_features() -> Vec<FeatureKind> {
    vec![
        FeatureKind::Original,
        FeatureKind::Sobel,
        FeatureKind::Laplace,
        FeatureKind::TopHat(5.0),
        FeatureKind::Gaussian(2.0),
        FeatureKind::GaussianSobel(2.0),
        FeatureKind::GaussianLaplace(2.0),
    ]
}

impl DemoConfig {
    /// Read a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: DemoConfig = serde_json::from_str(&text).context("parsing config JSON")?;
        for feature in &config.features {
            feature
                .validate()
                .with_context(|| format!("config feature {feature}"))?;
        }
        if config.threshold_step == 0 {
            anyhow::bail!("threshold_step must be positive");
        }
        Ok(config)
    }

    /// Write the config as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).context("serialising config")?;
        std::fs::write(path, text).with_context(|| format!("writing config {}", path.display()))
    }
}
