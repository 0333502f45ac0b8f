use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use pixel_shap::config::DemoConfig;
use pixel_shap::data::loader;
use pixel_shap::imaging::FeatureKind;

use crate::state::AppState;

/// Kinds offered by the "Add feature" menu, with a starting parameter.
const FEATURE_CHOICES: [FeatureKind; 8] = [
    FeatureKind::Original,
    FeatureKind::Sobel,
    FeatureKind::Laplace,
    FeatureKind::TopHat(3.0),
    FeatureKind::Gaussian(1.0),
    FeatureKind::GaussianSobel(1.0),
    FeatureKind::GaussianLaplace(1.0),
    FeatureKind::Random,
];

// ---------------------------------------------------------------------------
// Left side panel – feature bank
// ---------------------------------------------------------------------------

/// Render the left feature panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Features");
    ui.separator();

    let mut changed = false;
    let mut remove = None;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (i, feature) in state.config.features.iter_mut().enumerate() {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(feature.kind_name());
                    if let Some(parameter) = feature.parameter_mut() {
                        changed |= ui
                            .add(
                                egui::DragValue::new(parameter)
                                    .speed(0.1)
                                    .range(0.0..=50.0),
                            )
                            .changed();
                    }
                    if ui.small_button("✕").clicked() {
                        remove = Some(i);
                    }
                });
            }

            ui.add_space(4.0);
            ui.menu_button("Add feature", |ui: &mut Ui| {
                for choice in FEATURE_CHOICES {
                    if ui.button(choice.to_string()).clicked() {
                        state.add_feature(choice);
                        ui.close_menu();
                    }
                }
            });
            ui.separator();

            // ---- Threshold / background ----
            ui.strong("Thresholds");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("step");
                changed |= ui
                    .add(egui::DragValue::new(&mut state.config.threshold_step).range(1..=255))
                    .changed();
            });
            changed |= ui
                .checkbox(&mut state.config.add_background, "Add 60×60 gradient background")
                .changed();
            ui.checkbox(&mut state.show_annotation, "Show annotation panel");

            // ---- Label legend ----
            if let Some(colors) = &state.label_colors {
                ui.separator();
                ui.strong("Labels");
                for (label, [r, g, b]) in colors.legend_entries() {
                    ui.label(RichText::new(format!("■ {label}")).color(Color32::from_rgb(r, g, b)));
                }
            }
        });

    if let Some(i) = remove {
        state.remove_feature(i);
    } else if changed {
        state.refresh();
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open image…").clicked() {
                open_image_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open annotation…").clicked() {
                open_annotation_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Load config…").clicked() {
                load_config_dialog(state);
                ui.close_menu();
            }
            if ui.button("Save config…").clicked() {
                save_dialog(state, "Save config", "JSON", "json", |s, p| s.config.save(p));
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Export table…").clicked() {
                save_dialog(state, "Export (X, y)", "CSV", "csv", AppState::export_tabular);
                ui.close_menu();
            }
            if ui.button("Export figure…").clicked() {
                save_dialog(state, "Export figure", "PNG", "png", AppState::export_figure);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(image)) = (&state.image_name, &state.image) {
            let (rows, cols) = image.dim();
            ui.label(format!("{name}  {cols}×{rows}, {} features", state.feature_names.len()));
        }

        if let Some(data) = &state.tabular {
            ui.separator();
            ui.label(format!("{} annotated pixels", data.n_samples()));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn report_error(state: &mut AppState, what: &str, e: anyhow::Error) {
    log::error!("Failed to {what}: {e:#}");
    state.status_message = Some(format!("Error: {e:#}"));
}

pub fn open_image_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open image")
        .add_filter("PNG", &["png"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_image(&path) {
            Ok(image) => {
                log::info!("Loaded {:?} image from {}", image.dim(), path.display());
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                state.set_image(image, name);
            }
            Err(e) => report_error(state, "load image", e),
        }
    }
}

pub fn open_annotation_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open annotation")
        .add_filter("Supported files", &["png", "csv"])
        .add_filter("PNG", &["png"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        match loader::load_annotation(&path) {
            Ok(annotation) => {
                log::info!("Loaded {:?} annotation", annotation.dim());
                state.set_annotation(annotation);
            }
            Err(e) => report_error(state, "load annotation", e),
        }
    }
}

pub fn load_config_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Load config")
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        match DemoConfig::load(&path) {
            Ok(config) => state.set_config(config),
            Err(e) => report_error(state, "load config", e),
        }
    }
}

fn save_dialog(
    state: &mut AppState,
    title: &str,
    filter: &str,
    ext: &str,
    write: impl FnOnce(&AppState, &Path) -> anyhow::Result<()>,
) {
    let file = rfd::FileDialog::new()
        .set_title(title)
        .add_filter(filter, &[ext])
        .save_file();

    if let Some(path) = file {
        match write(state, &path) {
            Ok(()) => log::info!("Wrote {}", path.display()),
            Err(e) => report_error(state, title, e),
        }
    }
}
