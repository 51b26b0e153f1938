mod app;
mod config;
mod data;
mod debounce;
mod error;
mod pagination;
mod state;
mod ui;

use std::path::PathBuf;

use app::FacetExplorerApp;
use config::DashboardConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    // Optional first argument: path to a JSON config.
    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match DashboardConfig::load(&path) {
            Ok(config) => {
                log::info!("Using config {}", path.display());
                config
            }
            Err(e) => {
                log::error!("Ignoring config: {e:#}");
                DashboardConfig::default()
            }
        },
        None => DashboardConfig::default(),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Facet Explorer",
        options,
        Box::new(move |_cc| Ok(Box::new(FacetExplorerApp::new(&config)))),
    )
}
