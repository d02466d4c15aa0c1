use eframe::egui::{RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::severity_color;
use crate::state::AppState;

/// Tabular beam readings for the current moment.
pub fn beam_table(ui: &mut Ui, state: &AppState) {
    let (Some(layout), Some((table, col))) = (&state.layout, state.beam_readings(false)) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Load a survey and a station layout to tabulate beams");
        });
        return;
    };

    if let Some(date) = state.moment_date() {
        ui.label(format!("Beam differentials at {date}"));
    }

    let neutral = ui.visuals().text_color();
    let row_height = ui.text_style_height(&eframe::egui::TextStyle::Body) + 4.0;

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(60.0))
        .columns(Column::auto().at_least(70.0), 2)
        .column(Column::auto().at_least(70.0))
        .columns(Column::remainder().at_least(90.0), 4)
        .header(20.0, |mut header| {
            for title in ["Beam", "W/S", "E/N", "Length [ft]", "Diff [in]", "Class", "Slope [in/ft]", "Class"] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for (beam, series) in layout.beams.iter().zip(&table.beams) {
                let Some(reading) = series.readings.get(col) else {
                    continue;
                };
                body.row(row_height, |mut row| {
                    row.col(|ui| {
                        ui.label(&beam.name);
                    });
                    row.col(|ui| {
                        ui.label(&beam.west_south);
                    });
                    row.col(|ui| {
                        ui.label(&beam.east_north);
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}", beam.length_ft));
                    });

                    let diff_color = severity_color(reading.diff_severity, neutral);
                    row.col(|ui| {
                        let text = reading.diff_in.map_or_else(|| "–".into(), |d| format!("{d:+.2}"));
                        ui.label(RichText::new(text).color(diff_color));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(reading.diff_severity.label()).color(diff_color));
                    });

                    let slope_color = severity_color(reading.slope_severity, neutral);
                    row.col(|ui| {
                        let text = reading.slope.map_or_else(|| "–".into(), |s| format!("{s:+.4}"));
                        ui.label(RichText::new(text).color(slope_color));
                    });
                    row.col(|ui| {
                        ui.label(RichText::new(reading.slope_severity.label()).color(slope_color));
                    });
                });
            }
        });
}
