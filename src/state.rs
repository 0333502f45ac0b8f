use std::path::Path;

use anyhow::{Context, Result};
use ndarray::ArrayD;

use pixel_shap::color::LabelColorMap;
use pixel_shap::config::DemoConfig;
use pixel_shap::data::loader;
use pixel_shap::data::{Annotation, Image, TabularData, format_data};
use pixel_shap::figure::{Figure, visualize_image_list};
use pixel_shap::imaging::threshold::threshold_profile;
use pixel_shap::imaging::{FeatureKind, add_background, generate_feature_stack};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded source image (None until user opens a file).
    pub image: Option<Image>,

    /// File name of the source image, for the top bar.
    pub image_name: Option<String>,

    /// Loaded pixel annotation.
    pub annotation: Option<Annotation>,

    /// Colours for the annotation overlay.
    pub label_colors: Option<LabelColorMap>,

    /// Feature bank, threshold step and background switch.
    pub config: DemoConfig,

    /// Canvas holding one panel per computed feature.
    pub figure: Figure,

    /// Threshold levels and the set-pixel count of each mask.
    pub threshold_profile: Vec<(i64, usize)>,

    /// `(X, y)` for the current features and annotation.
    pub tabular: Option<TabularData>,

    /// Column names of `tabular`, in feature order.
    pub feature_names: Vec<String>,

    /// Bumped whenever panels change so textures get re-uploaded.
    pub generation: u64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether to show the annotation as an extra panel.
    pub show_annotation: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            image: None,
            image_name: None,
            annotation: None,
            label_colors: None,
            config: DemoConfig::default(),
            figure: Figure::default(),
            threshold_profile: Vec::new(),
            tabular: None,
            feature_names: Vec::new(),
            generation: 0,
            status_message: None,
            show_annotation: true,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded image and recompute everything derived from it.
    pub fn set_image(&mut self, image: Image, name: String) {
        self.image = Some(image);
        self.image_name = Some(name);
        self.refresh();
    }

    /// Ingest an annotation and rebuild the label colours.
    pub fn set_annotation(&mut self, annotation: Annotation) {
        self.label_colors = Some(LabelColorMap::from_annotation(&annotation));
        self.annotation = Some(annotation);
        self.refresh();
    }

    pub fn set_config(&mut self, config: DemoConfig) {
        self.config = config;
        self.refresh();
    }

    pub fn add_feature(&mut self, feature: FeatureKind) {
        self.config.features.push(feature);
        self.refresh();
    }

    pub fn remove_feature(&mut self, index: usize) {
        if index < self.config.features.len() {
            self.config.features.remove(index);
            self.refresh();
        }
    }

    /// Recompute panels, threshold profile and tabular data, reporting
    /// failures in the status line.
    pub fn refresh(&mut self) {
        match self.recompute() {
            Ok(()) => self.status_message = None,
            Err(e) => {
                log::error!("Failed to update features: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
        self.generation += 1;
    }

    fn recompute(&mut self) -> Result<()> {
        let Some(source) = &self.image else {
            return Ok(());
        };

        let working = if self.config.add_background {
            add_background(source).context("adding background")?
        } else {
            source.clone()
        };

        let stack = generate_feature_stack(&working, &self.config.features)
            .context("computing feature stack")?;
        self.feature_names = self.config.features.iter().map(|f| f.to_string()).collect();

        let images: Vec<ArrayD<f64>> = stack.iter().map(|f| f.clone().into_dyn()).collect();
        self.figure.clear();
        if !images.is_empty() {
            visualize_image_list(&mut self.figure, &images, Some(&self.feature_names[..]))
                .context("laying out panels")?;
        }

        self.threshold_profile =
            threshold_profile(&working, self.config.threshold_step).context("thresholding")?;

        self.tabular = match &self.annotation {
            Some(annotation) => Some(format_data(&stack, annotation).context("formatting data")?),
            None => None,
        };

        log::info!(
            "{} features, {} threshold levels, {} annotated samples",
            stack.len(),
            self.threshold_profile.len(),
            self.tabular.as_ref().map_or(0, |t| t.n_samples())
        );
        Ok(())
    }

    /// Capture the current panels into a PNG file.
    pub fn export_figure(&self, path: &Path) -> Result<()> {
        let mut figure = Figure::new(self.config.figure.width, self.config.figure.height);
        figure.set_panels(self.figure.panels().to_vec());
        let pixels = figure.capture().context("capturing figure")?;
        loader::save_capture_png(path, &pixels)
    }

    /// Write the current `(X, y)` as CSV.
    pub fn export_tabular(&self, path: &Path) -> Result<()> {
        let data = self
            .tabular
            .as_ref()
            .context("load an image and an annotation first")?;
        loader::write_tabular_csv(path, data, &self.feature_names)
    }
}
