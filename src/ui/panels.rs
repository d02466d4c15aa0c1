use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::report;
use crate::state::{AppState, PlanMoment, StationSurface, View};

// ---------------------------------------------------------------------------
// Left side panel – settings, pod filter, view and date selection
// ---------------------------------------------------------------------------

/// Render the left options panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Options");
    ui.separator();

    let Some(survey) = &state.survey else {
        ui.label("No survey loaded.");
        return;
    };
    let survey_count = survey.survey_count();
    let pods: Vec<String> = survey.pods().into_iter().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Forecast settings ----
            ui.strong("Forecast");
            let mut surveys = state.config.forecast_surveys;
            let mut years = state.config.forecast_years;
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Past surveys used");
                ui.add(egui::DragValue::new(&mut surveys).range(2..=survey_count.max(2)));
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Years forecast");
                ui.add(egui::DragValue::new(&mut years).range(0..=30));
            });
            state.set_forecast(surveys, years);
            ui.separator();

            // ---- View selector ----
            ui.strong("View");
            for view in View::ALL {
                let available = (!view.needs_layout() || state.layout.is_some())
                    && (!view.needs_heights() || state.heights.is_some());
                let selected = state.view == view;
                if ui
                    .add_enabled(available, egui::SelectableLabel::new(selected, view.label()))
                    .clicked()
                {
                    state.view = view;
                }
            }
            ui.separator();

            if state.view.needs_layout() {
                moment_selector(ui, state);
                if state.view == View::Station {
                    let has_floor = state.analysis.as_ref().is_some_and(|a| a.floor.is_some());
                    for surface in StationSurface::ALL {
                        let available = surface != StationSurface::Floor || has_floor;
                        let selected = state.station_surface == surface;
                        if ui
                            .add_enabled(available, egui::SelectableLabel::new(selected, surface.label()))
                            .clicked()
                        {
                            state.station_surface = surface;
                        }
                    }
                    ui.add(
                        egui::Slider::new(&mut state.exaggeration, 1.0..=1000.0)
                            .logarithmic(true)
                            .text("Vertical exaggeration"),
                    );
                }
                ui.separator();
            }

            // ---- Pod filter ----
            let header_text = format!("Pods  ({}/{})", state.pod_filter.len(), pods.len());
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("pods")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all_pods();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_no_pods();
                        }
                    });
                    for pod in &pods {
                        let mut checked = state.pod_filter.contains(pod);
                        if ui.checkbox(&mut checked, pod.as_str()).changed() {
                            state.toggle_pod(pod);
                        }
                    }
                });
        });
}

/// Survey / forecast date picker used by the plan views.
fn moment_selector(ui: &mut Ui, state: &mut AppState) {
    let Some(survey) = &state.survey else {
        return;
    };
    let survey_dates = survey.dates.clone();
    let forecast_dates: Vec<_> = state
        .analysis
        .as_ref()
        .and_then(|a| a.elevation_forecast.as_ref())
        .map(|f| f.future_dates().to_vec())
        .unwrap_or_default();

    let current = state
        .moment_date()
        .map(|d| match state.moment {
            PlanMoment::Survey(_) => d.to_string(),
            PlanMoment::Forecast(_) => format!("{d} (forecast)"),
        })
        .unwrap_or_default();

    ui.strong("Survey date");
    egui::ComboBox::from_id_salt("moment")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for (k, d) in survey_dates.iter().enumerate().rev() {
                ui.selectable_value(&mut state.moment, PlanMoment::Survey(k), d.to_string());
            }
            for (i, d) in forecast_dates.iter().enumerate() {
                ui.selectable_value(
                    &mut state.moment,
                    PlanMoment::Forecast(i),
                    format!("{d} (forecast)"),
                );
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("◀").clicked() {
            state.moment = match state.moment {
                PlanMoment::Survey(k) => PlanMoment::Survey(k.saturating_sub(1)),
                PlanMoment::Forecast(0) => PlanMoment::Survey(survey_dates.len().saturating_sub(1)),
                PlanMoment::Forecast(i) => PlanMoment::Forecast(i - 1),
            };
        }
        if ui.small_button("▶").clicked() {
            state.moment = match state.moment {
                PlanMoment::Survey(k) if k + 1 < survey_dates.len() => PlanMoment::Survey(k + 1),
                PlanMoment::Survey(_) if !forecast_dates.is_empty() => PlanMoment::Forecast(0),
                PlanMoment::Forecast(i) if i + 1 < forecast_dates.len() => PlanMoment::Forecast(i + 1),
                other => other,
            };
        }
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open survey…").clicked() {
                open_survey_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open station layout…").clicked() {
                open_layout_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open lug-to-floor heights…").clicked() {
                open_heights_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui
                .add_enabled(state.analysis.is_some(), egui::Button::new("Export reports…"))
                .clicked()
            {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(survey) = &state.survey {
            ui.label(format!(
                "{} points, {} surveys, {} visible",
                survey.len(),
                survey.survey_count(),
                state.visible_points.len()
            ));
        }
        if let Some(layout) = &state.layout {
            ui.separator();
            ui.label(format!("{} beams", layout.beams.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn table_dialog(title: &str) -> rfd::FileDialog {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
}

pub fn open_survey_dialog(state: &mut AppState) {
    if let Some(path) = table_dialog("Open survey elevations").pick_file() {
        state.load_survey(&path);
    }
}

pub fn open_heights_dialog(state: &mut AppState) {
    if let Some(path) = table_dialog("Open lug-to-floor heights").pick_file() {
        state.load_heights(&path);
    }
}

pub fn open_layout_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open station layout")
        .add_filter("CSV", &["csv"])
        .pick_file();
    if let Some(path) = file {
        state.load_layout(&path);
    }
}

fn export_dialog(state: &mut AppState) {
    let Some(dir) = rfd::FileDialog::new()
        .set_title("Export reports to folder")
        .pick_folder()
    else {
        return;
    };
    let Some(analysis) = &state.analysis else {
        return;
    };
    let beams = state.beam_readings(false);
    if let (Some(date), Some(_)) = (state.moment_date(), beams) {
        log::info!("Exporting beam report for {date}");
    }

    match report::export_reports(
        &dir,
        state.layout.as_ref(),
        beams,
        analysis.settlement_forecast.as_ref(),
    ) {
        Ok(files) => {
            state.status_message = None;
            log::info!("Wrote {files:?}");
        }
        Err(e) => {
            log::error!("Export failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
