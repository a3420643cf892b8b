use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct GnvPanelApp {
    pub state: AppState,
}

impl GnvPanelApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for GnvPanelApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: cards, insights, charts, table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            panels::dashboard(ui, &self.state);
        });
    }
}
