use eframe::egui;

use crate::config::AnalysisConfig;
use crate::state::{AppState, View};
use crate::ui::{panels, plan, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SettlementApp {
    pub state: AppState,
}

impl SettlementApp {
    pub fn new(config: AnalysisConfig) -> Self {
        let mut state = AppState::new(config);
        state.preload();
        Self { state }
    }
}

impl eframe::App for SettlementApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: options ----
        egui::SidePanel::left("options_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: selected view ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Cumulative | View::Change | View::Rate => plot::time_series_plot(ui, &self.state),
            View::PlanDifferential | View::PlanSlope | View::FloorDifferential | View::FloorSlope => {
                plan::plan_view(ui, &self.state)
            }
            View::LugElevation | View::TrussHeight => plan::point_value_view(ui, &self.state),
            View::Station => plan::station_view(ui, &self.state),
            View::BeamTable => table::beam_table(ui, &self.state),
        });
    }
}
