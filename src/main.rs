use anyhow::Context;
use eframe::egui;
use gnv_panel::app::GnvPanelApp;
use gnv_panel::config::DashboardConfig;
use gnv_panel::data::loader::DatasetStore;
use gnv_panel::state::AppState;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = DashboardConfig::load().context("loading configuration")?;
    log::info!("Survey data: {}", config.data_path.display());

    // The dataset is read once; a load failure aborts startup.
    let store = DatasetStore::new(config.data_path.clone());
    let dataset = store.get()?;
    let state = AppState::new(dataset, config);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "ZAGAZ – GNV Dashboard",
        options,
        Box::new(|cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            Ok(Box::new(GnvPanelApp::new(state)))
        }),
    )
    .map_err(|e| anyhow::anyhow!("running the dashboard: {e}"))
}
