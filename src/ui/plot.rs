use eframe::egui::{self, ColorImage, Context, ScrollArea, TextureHandle, TextureOptions, Ui, Vec2};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Line, Plot, PlotPoints, Points};

use crate::state::AppState;

/// On-screen edge length of a feature panel.
const PANEL_SIZE: f32 = 180.0;
/// Rows of `(X, y)` shown in the table preview.
const PREVIEW_ROWS: usize = 200;

// ---------------------------------------------------------------------------
// GPU textures for the figure panels
// ---------------------------------------------------------------------------

/// Textures mirroring the panels of `AppState::figure`.
#[derive(Default)]
pub struct PanelTextures {
    generation: Option<u64>,
    panels: Vec<(String, TextureHandle)>,
    annotation: Option<TextureHandle>,
}

impl PanelTextures {
    /// Re-upload textures when the state has produced new panels.
    pub fn sync(&mut self, ctx: &Context, state: &AppState) {
        if self.generation == Some(state.generation) {
            return;
        }
        self.generation = Some(state.generation);

        self.panels = state
            .figure
            .panels()
            .iter()
            .enumerate()
            .map(|(i, panel)| {
                let size = [panel.image.width() as usize, panel.image.height() as usize];
                let image = ColorImage::from_gray(size, panel.image.as_raw());
                let title = panel.title.clone().unwrap_or_else(|| format!("panel {i}"));
                let texture = ctx.load_texture(format!("panel-{i}"), image, TextureOptions::NEAREST);
                (title, texture)
            })
            .collect();

        self.annotation = match (&state.annotation, &state.label_colors) {
            (Some(annotation), Some(colors)) => {
                let painted = colors.paint(annotation);
                let size = [painted.width() as usize, painted.height() as usize];
                let image = ColorImage::from_rgba_unmultiplied(size, painted.as_raw());
                Some(ctx.load_texture("annotation", image, TextureOptions::NEAREST))
            }
            _ => None,
        };
        log::debug!("uploaded {} panel textures", self.panels.len());
    }
}

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render panels, threshold profile and the `(X, y)` preview.
pub fn central_view(ui: &mut Ui, state: &AppState, textures: &PanelTextures) {
    if state.image.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open an image to compute features  (File → Open image…)");
        });
        return;
    }

    ScrollArea::horizontal()
        .id_salt("feature_panels")
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                for (title, texture) in &textures.panels {
                    show_panel(ui, title, texture);
                }
                if state.show_annotation {
                    if let Some(texture) = &textures.annotation {
                        show_panel(ui, "annotation", texture);
                    }
                }
            });
        });

    ui.separator();
    threshold_profile(ui, state);
    ui.separator();
    tabular_preview(ui, state);
}

fn show_panel(ui: &mut Ui, title: &str, texture: &TextureHandle) {
    let [w, h] = texture.size();
    let scale = PANEL_SIZE / w.max(h).max(1) as f32;
    let size = Vec2::new(w as f32 * scale, h as f32 * scale);

    ui.vertical(|ui: &mut Ui| {
        ui.label(title);
        ui.add(egui::Image::new((texture.id(), size)));
    });
}

// ---------------------------------------------------------------------------
// Threshold profile
// ---------------------------------------------------------------------------

fn threshold_profile(ui: &mut Ui, state: &AppState) {
    ui.strong(format!("Threshold masks (step {})", state.config.threshold_step));

    let points: Vec<[f64; 2]> = state
        .threshold_profile
        .iter()
        .map(|&(level, count)| [level as f64, count as f64])
        .collect();

    Plot::new("threshold_profile")
        .height(180.0)
        .x_axis_label("Threshold")
        .y_axis_label("Pixels above")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .name("pixels > t")
                    .width(1.5),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(3.0));
        });
}

// ---------------------------------------------------------------------------
// (X, y) preview
// ---------------------------------------------------------------------------

fn tabular_preview(ui: &mut Ui, state: &AppState) {
    let Some(data) = &state.tabular else {
        ui.label("Open an annotation to build (X, y).");
        return;
    };

    let counts = data
        .class_counts()
        .iter()
        .map(|(label, n)| format!("{label}: {n}"))
        .collect::<Vec<_>>()
        .join(", ");
    ui.strong(format!(
        "{} samples × {} features   [{counts}]",
        data.n_samples(),
        data.n_features()
    ));

    let rows = data.n_samples().min(PREVIEW_ROWS);

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(50.0))
        .columns(Column::auto().at_least(80.0), data.n_features())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("label");
            });
            for j in 0..data.n_features() {
                let name = state
                    .feature_names
                    .get(j)
                    .cloned()
                    .unwrap_or_else(|| format!("feature {j}"));
                header.col(|ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows, |mut row| {
                let i = row.index();
                row.col(|ui| {
                    ui.label(data.y[i].to_string());
                });
                for value in data.x.row(i) {
                    row.col(|ui| {
                        ui.label(format!("{value:.3}"));
                    });
                }
            });
        });
}
