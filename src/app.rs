use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct PixelShapApp {
    pub state: AppState,
    pub textures: plot::PanelTextures,
}

impl eframe::App for PixelShapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.textures.sync(ctx, &self.state);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: feature bank ----
        egui::SidePanel::left("feature_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: feature panels, threshold profile, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::central_view(ui, &self.state, &self.textures);
        });
    }
}
