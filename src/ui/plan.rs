use eframe::egui::{self, Color32, RichText, Ui};
use egui_plot::{Arrows, Line, MarkerShape, Plot, PlotPoint, PlotPoints, PlotUi, Points, Text};

use crate::analysis::differential::{BeamReading, Marker, Severity};
use crate::color::severity_color;
use crate::config::AnalysisConfig;
use crate::data::model::{PlanPoint, StationLayout};
use crate::state::{AppState, StationSurface, View};

/// Length of a direction arrow in plan units (feet).
const ARROW_LEN: f64 = 4.0;

/// Oblique projection factor for the station view.
const DEPTH: f64 = 0.5;

/// Gap between a point's name and its value in the point plans.
const VALUE_OFFSET: f64 = 2.5;

// ---------------------------------------------------------------------------
// Plan views: differential settlement and slope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantity {
    Differential,
    Slope,
}

/// Render a plan view for `state.view`.
pub fn plan_view(ui: &mut Ui, state: &AppState) {
    let Some(layout) = &state.layout else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a station layout to view the plan  (File → Open station layout…)");
        });
        return;
    };

    let (quantity, floor) = match state.view {
        View::PlanDifferential => (Quantity::Differential, false),
        View::PlanSlope => (Quantity::Slope, false),
        View::FloorDifferential => (Quantity::Differential, true),
        _ => (Quantity::Slope, true),
    };

    let neutral = ui.visuals().text_color();
    legend(ui, quantity, &state.config, neutral);
    plane_summary(ui, state);

    let readings = state.beam_readings(floor);
    if readings.is_none() {
        ui.label("No readings for this date.");
    }

    let mut plot = Plot::new(("plan", state.view.label()))
        .data_aspect(1.0)
        .show_grid(false)
        .show_axes(false)
        .allow_boxed_zoom(true);
    if let Some((lo, hi)) = layout.bounds() {
        plot = plot
            .include_x(lo.x - ARROW_LEN)
            .include_x(hi.x + ARROW_LEN)
            .include_y(lo.y - ARROW_LEN)
            .include_y(hi.y + ARROW_LEN);
    }

    plot.show(ui, |plot_ui| {
        draw_outline(plot_ui, layout, neutral);

        let Some((table, col)) = readings else {
            return;
        };
        for (beam, series) in layout.beams.iter().zip(&table.beams) {
            let Some(reading) = series.readings.get(col) else {
                continue;
            };
            let (value, severity) = match quantity {
                Quantity::Differential => (reading.diff_in, reading.diff_severity),
                Quantity::Slope => (reading.slope, reading.slope_severity),
            };
            let color = severity_color(severity, neutral);
            let text = value.map_or_else(|| "–".to_string(), |v| format!("{:.2}", v.abs()));
            plot_ui.text(Text::new(
                PlotPoint::new(beam.label.x, beam.label.y),
                RichText::new(text).size(12.0).color(color),
            ));
            draw_marker(plot_ui, beam.arrow, reading);
        }
    });
}

/// Beams as lines with grey monitoring point labels.
fn draw_outline(plot_ui: &mut PlotUi, layout: &StationLayout, color: Color32) {
    for beam in &layout.beams {
        let pts: PlotPoints = vec![[beam.start.x, beam.start.y], [beam.end.x, beam.end.y]].into();
        plot_ui.line(Line::new(pts).color(color).width(1.5));
    }
    for label in &layout.labels {
        plot_ui.text(Text::new(
            PlotPoint::new(label.position.x, label.position.y),
            RichText::new(&label.point).size(10.0).color(Color32::GRAY),
        ));
    }
}

/// Arrow toward the lower end, a hollow circle when level, a cross without data.
fn draw_marker(plot_ui: &mut PlotUi, at: PlanPoint, reading: &BeamReading) {
    let red = Color32::RED;
    match (reading.marker, reading.angle_deg) {
        (Marker::Arrow, Some(angle)) => {
            let (dx, dy) = heading(angle);
            let half = ARROW_LEN / 2.0;
            let origin = [at.x - dx * half, at.y - dy * half];
            let tip = [at.x + dx * half, at.y + dy * half];
            plot_ui.arrows(
                Arrows::new(PlotPoints::from(vec![origin]), PlotPoints::from(vec![tip]))
                    .color(red)
                    .tip_length(8.0),
            );
        }
        (Marker::Level, _) => {
            plot_ui.points(
                Points::new(PlotPoints::from(vec![[at.x, at.y]]))
                    .shape(MarkerShape::Circle)
                    .filled(false)
                    .radius(4.0)
                    .color(red),
            );
        }
        _ => {
            plot_ui.points(
                Points::new(PlotPoints::from(vec![[at.x, at.y]]))
                    .shape(MarkerShape::Cross)
                    .radius(4.0)
                    .color(red),
            );
        }
    }
}

/// Unit vector of a heading measured clockwise from east.
pub fn heading(angle_deg: f64) -> (f64, f64) {
    let rad = angle_deg.to_radians();
    (rad.cos(), -rad.sin())
}

fn legend(ui: &mut Ui, quantity: Quantity, config: &AnalysisConfig, neutral: Color32) {
    let entries: Vec<(String, Severity)> = match quantity {
        Quantity::Differential => {
            let l = &config.differential_limits;
            vec![
                (format!("Differential settlement less than {} in", l.warning), Severity::Acceptable),
                (format!("Differential settlement between {} and {} in", l.warning, l.critical), Severity::Warning),
                (format!("Differential settlement greater than {} in", l.critical), Severity::Critical),
            ]
        }
        Quantity::Slope => {
            let l = &config.slope_limits;
            vec![
                (format!("Differential slope less than {} in/ft", fraction(l.elevated)), Severity::Acceptable),
                (
                    format!("Differential slope between {} and {} in/ft", fraction(l.elevated), fraction(l.warning)),
                    Severity::Elevated,
                ),
                (
                    format!("Differential slope between {} and {} in/ft", fraction(l.warning), fraction(l.critical)),
                    Severity::Warning,
                ),
                (format!("Differential slope greater than {} in/ft", fraction(l.critical)), Severity::Critical),
            ]
        }
    };

    ui.horizontal_wrapped(|ui: &mut Ui| {
        for (text, severity) in entries {
            ui.label(RichText::new(text).color(severity_color(severity, neutral)));
            ui.separator();
        }
        ui.label(RichText::new("No data").color(severity_color(Severity::NoData, neutral)));
    });
    ui.label(RichText::new("Arrows point in the direction of increased settlement.").small());
}

/// Render reciprocal limits (`0.03125` → `1/32`) as fractions, anything else as a decimal.
pub fn fraction(v: f64) -> String {
    if v > 0.0 && v < 1.0 {
        let inv = 1.0 / v;
        if (inv - inv.round()).abs() < 1e-9 {
            return format!("1/{}", inv.round() as u64);
        }
    }
    format!("{v}")
}

fn plane_summary(ui: &mut Ui, state: &AppState) {
    let crate::state::PlanMoment::Survey(k) = state.moment else {
        return;
    };
    let Some(planes) = state.analysis.as_ref().and_then(|a| a.planes.get(k)) else {
        return;
    };
    if planes.is_empty() {
        return;
    }
    egui::CollapsingHeader::new("Best-fit pod planes")
        .id_salt("pod_planes")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("pod_planes_grid").striped(true).show(ui, |ui: &mut Ui| {
                ui.strong("Pod");
                ui.strong("Points");
                ui.strong("Mean [ft]");
                ui.strong("Tilt x [in/ft]");
                ui.strong("Tilt y [in/ft]");
                ui.strong("Max residual [in]");
                ui.end_row();
                for p in planes {
                    ui.label(&p.pod);
                    ui.label(p.points.to_string());
                    ui.label(format!("{:.3}", p.mean));
                    ui.label(format!("{:+.4}", p.tilt_x));
                    ui.label(format!("{:+.4}", p.tilt_y));
                    ui.label(format!("{:.2}", p.max_residual_in));
                    ui.end_row();
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Plan views: values at monitoring points
// ---------------------------------------------------------------------------

/// Lug elevation or lug-to-truss height written beside each monitoring point.
pub fn point_value_view(ui: &mut Ui, state: &AppState) {
    let Some(layout) = &state.layout else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a station layout to view the plan  (File → Open station layout…)");
        });
        return;
    };
    if let Some(date) = state.moment_date() {
        ui.label(format!("{} at {date}", state.view.label()));
    }

    let neutral = ui.visuals().text_color();
    let mut plot = Plot::new(("points", state.view.label()))
        .data_aspect(1.0)
        .show_grid(false)
        .show_axes(false)
        .allow_boxed_zoom(true);
    if let Some((lo, hi)) = layout.bounds() {
        plot = plot
            .include_x(lo.x - ARROW_LEN)
            .include_x(hi.x + ARROW_LEN)
            .include_y(lo.y - ARROW_LEN)
            .include_y(hi.y + ARROW_LEN);
    }

    plot.show(ui, |plot_ui| {
        draw_outline(plot_ui, layout, neutral);
        for label in &layout.labels {
            let text = state
                .plan_point_value(&label.point)
                .map_or_else(|| "–".to_string(), |v| format!("{v:.3}"));
            plot_ui.text(Text::new(
                PlotPoint::new(label.position.x, label.position.y - VALUE_OFFSET),
                RichText::new(text).size(11.0).color(neutral),
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// Station view: oblique projection of the settled beam grid
// ---------------------------------------------------------------------------

/// Project a plan position and settlement (feet, positive down) to the view plane.
pub fn oblique(position: PlanPoint, settlement_ft: f64, exaggeration: f64) -> [f64; 2] {
    [
        position.x + DEPTH * position.y,
        DEPTH * position.y - settlement_ft * exaggeration,
    ]
}

pub fn station_view(ui: &mut Ui, state: &AppState) {
    let surface = state.station_surface;
    let (Some(layout), Some((table, col))) = (&state.layout, state.surface_at_moment(surface))
    else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Load a survey and a station layout to view the station");
        });
        return;
    };

    let neutral = ui.visuals().text_color();
    let slopes = state.beam_readings(surface == StationSurface::Floor);
    let datum = state.surface_datum(surface);
    // Drop below the zero line, feet: settlement as is, elevations from the datum.
    let sink = |point: &str| {
        let v = table.value(point, col)?;
        Some(match surface {
            StationSurface::Settlement => v,
            _ => datum - v,
        })
    };

    if let Some(date) = state.moment_date() {
        ui.label(format!(
            "{} at {date}, vertical exaggeration ×{:.0}",
            surface.label(),
            state.exaggeration
        ));
    }

    Plot::new(("station", surface.label()))
        .data_aspect(1.0)
        .show_grid(false)
        .show_axes(false)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| {
            for (i, beam) in layout.beams.iter().enumerate() {
                let (Some(z0), Some(z1)) = (sink(&beam.west_south), sink(&beam.east_north)) else {
                    continue;
                };
                let severity = slopes
                    .and_then(|(t, c)| t.beams.get(i)?.readings.get(c))
                    .map_or(Severity::NoData, |r| r.slope_severity);
                let color = match severity {
                    Severity::NoData => neutral,
                    s => severity_color(s, neutral),
                };

                // Undeformed position, faint.
                let flat: PlotPoints = vec![
                    oblique(beam.start, 0.0, 0.0),
                    oblique(beam.end, 0.0, 0.0),
                ]
                .into();
                plot_ui.line(Line::new(flat).color(Color32::from_gray(90)).width(0.5));

                let settled: PlotPoints = vec![
                    oblique(beam.start, z0, state.exaggeration),
                    oblique(beam.end, z1, state.exaggeration),
                ]
                .into();
                plot_ui.line(Line::new(settled).color(color).width(2.0).name(&beam.name));
            }

            for label in &layout.labels {
                let (Some(value), Some(z)) = (table.value(&label.point, col), sink(&label.point))
                else {
                    continue;
                };
                let [x, y] = oblique(label.position, z, state.exaggeration);
                plot_ui.text(Text::new(
                    PlotPoint::new(x, y),
                    RichText::new(format!("{}\n{:.2} ft", label.point, value))
                        .size(9.0)
                        .color(Color32::GRAY),
                ));
            }
        });
}
