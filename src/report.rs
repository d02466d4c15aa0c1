use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Serialize;

use crate::analysis::differential::DifferentialTable;
use crate::analysis::forecast::Forecast;
use crate::data::model::StationLayout;

pub const BEAM_REPORT_FILE: &str = "beam_differentials.csv";
pub const FORECAST_REPORT_FILE: &str = "settlement_forecast.csv";

const DAYS_PER_YEAR: f64 = 365.25;

// ---------------------------------------------------------------------------
// Beam report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct BeamRow<'a> {
    beam: &'a str,
    west_south: &'a str,
    east_north: &'a str,
    length_ft: f64,
    direction: String,
    survey_date: String,
    differential_in: Option<f64>,
    slope_in_per_ft: Option<f64>,
    differential_class: &'static str,
    slope_class: &'static str,
    arrow_deg: Option<f64>,
}

/// One row per beam at the given survey index.
pub fn write_beam_report<W: Write>(
    out: W,
    layout: &StationLayout,
    beams: &DifferentialTable,
    survey: usize,
) -> Result<()> {
    let Some(date) = beams.dates.get(survey) else {
        bail!("survey index {survey} out of range ({} surveys)", beams.dates.len());
    };

    let mut writer = csv::Writer::from_writer(out);
    for (beam, (_, reading)) in layout.beams.iter().zip(beams.at(survey)) {
        let Some(reading) = reading else {
            continue;
        };
        writer
            .serialize(BeamRow {
                beam: &beam.name,
                west_south: &beam.west_south,
                east_north: &beam.east_north,
                length_ft: beam.length_ft,
                direction: beam.orientation.to_string(),
                survey_date: date.to_string(),
                differential_in: reading.diff_in.map(round4),
                slope_in_per_ft: reading.slope.map(round4),
                differential_class: reading.diff_severity.label(),
                slope_class: reading.slope_severity.label(),
                arrow_deg: reading.angle_deg,
            })
            .with_context(|| format!("writing beam {}", beam.name))?;
    }
    writer.flush().context("flushing beam report")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Forecast report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ForecastRow<'a> {
    point: &'a str,
    date: String,
    projected_settlement_ft: Option<f64>,
    trend_ft_per_year: Option<f64>,
    r_squared: Option<f64>,
}

/// One row per point per forecast date.
pub fn write_forecast_report<W: Write>(out: W, forecast: &Forecast) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);
    let table = &forecast.table;
    for ((point, row), fit) in table.points.iter().zip(&table.values).zip(&forecast.fits) {
        for (date, value) in table.dates.iter().zip(row) {
            writer
                .serialize(ForecastRow {
                    point,
                    date: date.to_string(),
                    projected_settlement_ft: *value,
                    trend_ft_per_year: fit.map(|f| round4(f.slope * DAYS_PER_YEAR)),
                    r_squared: fit.map(|f| round4(f.r_value * f.r_value)),
                })
                .with_context(|| format!("writing forecast for {point}"))?;
        }
    }
    writer.flush().context("flushing forecast report")?;
    Ok(())
}

/// Write every available report into `dir`, returning the files written.
///
/// `beams` is the beam table and column to report, survey or forecast.
pub fn export_reports(
    dir: &Path,
    layout: Option<&StationLayout>,
    beams: Option<(&DifferentialTable, usize)>,
    forecast: Option<&Forecast>,
) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();

    if let (Some(layout), Some((beams, column))) = (layout, beams) {
        let path = dir.join(BEAM_REPORT_FILE);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_beam_report(file, layout, beams, column)?;
        written.push(path);
    }

    if let Some(forecast) = forecast {
        let path = dir.join(FORECAST_REPORT_FILE);
        let file = std::fs::File::create(&path)
            .with_context(|| format!("creating {}", path.display()))?;
        write_forecast_report(file, forecast)?;
        written.push(path);
    }

    if written.is_empty() {
        bail!("nothing to export: load a layout or a longer survey record first");
    }
    log::info!("Exported {} report(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}
