mod analysis;
mod app;
mod color;
mod config;
mod data;
mod report;
mod state;
mod ui;

use app::SettlementApp;
use config::AnalysisConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AnalysisConfig::discover().unwrap_or_else(|e| {
        log::error!("Ignoring settings file: {e:#}");
        AnalysisConfig::default()
    });

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Settlement Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(SettlementApp::new(config)))),
    )
}
