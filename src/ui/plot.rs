use chrono::NaiveDate;
use eframe::egui::Ui;
use egui_plot::{GridMark, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoints, Points};

use crate::analysis::forecast::ordinal;
use crate::data::model::SurveyTable;
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Time-series plots (central panel)
// ---------------------------------------------------------------------------

/// Format a day-ordinal axis value as a calendar date.
pub fn format_date_axis(mark: GridMark, _range: &std::ops::RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Split a series into runs of consecutive present values.
pub fn segments(dates: &[NaiveDate], values: &[Option<f64>]) -> Vec<Vec<[f64; 2]>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for (d, v) in dates.iter().zip(values) {
        match v {
            Some(v) => current.push([ordinal(*d), *v]),
            None if !current.is_empty() => runs.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Render the time-series view selected in `state.view`.
pub fn time_series_plot(ui: &mut Ui, state: &AppState) {
    let Some(analysis) = &state.analysis else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a survey file to view settlement  (File → Open survey…)");
        });
        return;
    };

    let (table, y_label, forecast) = match state.view {
        View::Cumulative => (
            &analysis.settlement,
            "Cumulative Settlement [ft]",
            analysis.settlement_forecast.as_ref().map(|f| &f.table),
        ),
        View::Change => (&analysis.deltas, "Settlement Change [in]", None),
        _ => (&analysis.rates, "Annualized Settlement Rate [in/yr]", None),
    };

    Plot::new(("time_series", state.view.label()))
        .legend(Legend::default())
        .x_axis_label("Survey Date")
        .y_axis_label(y_label)
        .x_axis_formatter(format_date_axis)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for &idx in &state.visible_points {
                let point = &table.points[idx];
                let color = state.point_colors.color_for(point);

                for run in segments(&table.dates, &table.values[idx]) {
                    let markers: PlotPoints = run.iter().copied().collect();
                    plot_ui.line(Line::new(PlotPoints::from(run)).name(point).color(color).width(1.5));
                    plot_ui.points(Points::new(markers).name(point).color(color).radius(2.5));
                }

                if let Some(projection) = forecast {
                    draw_projection(plot_ui, projection, point, color);
                }
            }
        });
}

fn draw_projection(
    plot_ui: &mut egui_plot::PlotUi,
    projection: &SurveyTable,
    point: &str,
    color: eframe::egui::Color32,
) {
    let Some(values) = projection.series(point) else {
        return;
    };
    let name = format!("{point} Projection");
    for run in segments(&projection.dates, values) {
        let markers: PlotPoints = run.iter().copied().collect();
        plot_ui.line(
            Line::new(PlotPoints::from(run))
                .name(&name)
                .color(color)
                .width(1.5)
                .style(LineStyle::dashed_loose()),
        );
        plot_ui.points(
            Points::new(markers)
                .name(&name)
                .color(color)
                .shape(MarkerShape::Asterisk)
                .radius(4.0),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_break_on_gaps() {
        let dates: Vec<NaiveDate> = (1..=5)
            .map(|d| NaiveDate::from_ymd_opt(2020, 1, d).unwrap())
            .collect();
        let values = [Some(1.0), None, Some(2.0), Some(3.0), None];
        let runs = segments(&dates, &values);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 1);
        assert_eq!(runs[1], vec![[ordinal(dates[2]), 2.0], [ordinal(dates[3]), 3.0]]);
        assert!(segments(&dates, &[None; 5]).is_empty());
    }
}
