//! Writes a synthetic station (survey, layout and lug-to-floor heights) for trying the viewer.
//!
//! Usage: `generate_sample [OUTPUT_DIR]`

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Months, NaiveDate};
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const POD_WIDTH: f64 = 90.0;
const POD_DEPTH: f64 = 60.0;
const POD_PITCH: f64 = 100.0;
const ROW_B_Y: f64 = 75.0;
const SURVEYS: u32 = 16;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

struct Point {
    name: String,
    x: f64,
    y: f64,
}

struct SampleBeam {
    name: String,
    ws: usize,
    en: usize,
    dir: &'static str,
}

/// Eight pods in two rows; A2 and B2 carry a middle column of points.
fn station() -> (Vec<Point>, Vec<SampleBeam>) {
    let mut points = Vec::new();
    let mut beams = Vec::new();

    for (row, y0) in [("A", 0.0), ("B", ROW_B_Y)] {
        for pod_no in 1..=4 {
            let pod = format!("{row}{pod_no}");
            let columns = if pod_no == 2 { 3 } else { 2 };
            let x0 = (pod_no - 1) as f64 * POD_PITCH + 5.0;
            let first = points.len();

            // South row west → east, then the north row.
            for (r, y) in [y0, y0 + POD_DEPTH].into_iter().enumerate() {
                for c in 0..columns {
                    let x = x0 + POD_WIDTH * c as f64 / (columns - 1) as f64;
                    points.push(Point {
                        name: format!("{pod}-{}", r * columns + c + 1),
                        x,
                        y,
                    });
                }
            }

            let mut n = 0;
            let mut beam = |ws: usize, en: usize, dir: &'static str| {
                n += 1;
                beams.push(SampleBeam {
                    name: format!("{pod}-G{n}"),
                    ws,
                    en,
                    dir,
                });
            };
            for r in 0..2 {
                for c in 0..columns - 1 {
                    let i = first + r * columns + c;
                    beam(i, i + 1, "h");
                }
            }
            for c in 0..columns {
                beam(first + c, first + columns + c, "v");
            }
        }
    }
    (points, beams)
}

fn survey_dates() -> Vec<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(2010, 11, 2).unwrap_or_default();
    (0..SURVEYS)
        .filter_map(|k| first.checked_add_months(Months::new(6 * k)))
        .collect()
}

/// Lug elevations: a settlement bowl centred on the station with survey noise and gaps.
fn elevations(points: &[Point], dates: &[NaiveDate], rng: &mut SimpleRng) -> Vec<Vec<Option<f64>>> {
    let (cx, cy) = (2.0 * POD_PITCH, (ROW_B_Y + POD_DEPTH) / 2.0);
    points
        .iter()
        .map(|p| {
            let base = 9310.0 + rng.gauss(0.0, 0.05);
            let dist = ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt();
            let rate = 0.015 + 0.06 * (-dist / 150.0).exp();
            dates
                .iter()
                .enumerate()
                .map(|(k, d)| {
                    if k > 0 && rng.next_f64() < 0.03 {
                        return None;
                    }
                    let years = (*d - dates[0]).num_days() as f64 / 365.25;
                    let settled = rate * years.powf(0.8);
                    Some(((base - settled + rng.gauss(0.0, 0.002)) * 1000.0).round() / 1000.0)
                })
                .collect()
        })
        .collect()
}

fn write_wide_csv(
    path: &Path,
    points: &[Point],
    dates: &[NaiveDate],
    values: &[Vec<Option<f64>>],
) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut header = vec!["MONITOR_POINT".to_string()];
    header.extend(dates.iter().map(|d| d.format("%Y-%m-%d").to_string()));
    writer.write_record(&header)?;
    for (p, row) in points.iter().zip(values) {
        let mut record = vec![p.name.clone()];
        record.extend(row.iter().map(|v| v.map(|v| format!("{v:.3}")).unwrap_or_default()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

fn write_survey_parquet(
    path: &Path,
    points: &[Point],
    dates: &[NaiveDate],
    values: &[Vec<Option<f64>>],
) -> Result<()> {
    let mut fields = vec![Field::new("MONITOR_POINT", DataType::Utf8, false)];
    let mut columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(
        points.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(),
    ))];
    for (k, d) in dates.iter().enumerate() {
        fields.push(Field::new(d.format("%Y-%m-%d").to_string(), DataType::Float64, true));
        columns.push(Arc::new(Float64Array::from(
            values.iter().map(|row| row[k]).collect::<Vec<_>>(),
        )));
    }
    let schema = Arc::new(Schema::new(fields));
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

#[derive(Default, Serialize)]
struct LayoutRow {
    #[serde(rename = "MP_W_S")]
    mp_w_s: String,
    #[serde(rename = "MP_E_N")]
    mp_e_n: Option<String>,
    #[serde(rename = "beamName")]
    beam_name: Option<String>,
    #[serde(rename = "beamLength")]
    beam_length: Option<f64>,
    #[serde(rename = "beamDir")]
    beam_dir: Option<&'static str>,
    #[serde(rename = "beamX")]
    beam_x: Option<f64>,
    #[serde(rename = "beamY")]
    beam_y: Option<f64>,
    #[serde(rename = "startX")]
    start_x: Option<f64>,
    #[serde(rename = "startY")]
    start_y: Option<f64>,
    #[serde(rename = "endX")]
    end_x: Option<f64>,
    #[serde(rename = "endY")]
    end_y: Option<f64>,
    #[serde(rename = "labelX")]
    label_x: Option<f64>,
    #[serde(rename = "labelY")]
    label_y: Option<f64>,
    #[serde(rename = "arrowX")]
    arrow_x: Option<f64>,
    #[serde(rename = "arrowY")]
    arrow_y: Option<f64>,
}

fn write_layout(path: &Path, points: &[Point], beams: &[SampleBeam]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for p in points {
        writer.serialize(LayoutRow {
            mp_w_s: p.name.clone(),
            label_x: Some(p.x - 4.0),
            label_y: Some(p.y - 4.0),
            ..Default::default()
        })?;
    }

    for b in beams {
        let (ws, en) = (&points[b.ws], &points[b.en]);
        let (mx, my) = ((ws.x + en.x) / 2.0, (ws.y + en.y) / 2.0);
        // Value above (or right of) the beam, arrow below (or left).
        let (ox, oy) = if b.dir == "h" { (0.0, 3.0) } else { (3.0, 0.0) };
        writer.serialize(LayoutRow {
            mp_w_s: ws.name.clone(),
            mp_e_n: Some(en.name.clone()),
            beam_name: Some(b.name.clone()),
            beam_length: Some(((en.x - ws.x).powi(2) + (en.y - ws.y).powi(2)).sqrt()),
            beam_dir: Some(b.dir),
            beam_x: Some(mx + ox),
            beam_y: Some(my + oy),
            start_x: Some(ws.x),
            start_y: Some(ws.y),
            end_x: Some(en.x),
            end_y: Some(en.y),
            arrow_x: Some(mx - ox),
            arrow_y: Some(my - oy),
            ..Default::default()
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Lug-to-floor heights: an initial setting and a re-shim five years in.
fn truss_heights(points: &[Point], rng: &mut SimpleRng) -> (Vec<NaiveDate>, Vec<Vec<Option<f64>>>) {
    let dates = vec![
        NaiveDate::from_ymd_opt(2010, 11, 2).unwrap_or_default(),
        NaiveDate::from_ymd_opt(2015, 6, 1).unwrap_or_default(),
    ];
    let values = points
        .iter()
        .map(|_| {
            let initial = 3.5 + rng.next_f64() * 0.2;
            let shim = initial + rng.next_f64() * 0.1;
            vec![Some((initial * 1000.0).round() / 1000.0), Some((shim * 1000.0).round() / 1000.0)]
        })
        .collect();
    (dates, values)
}

fn main() -> Result<()> {
    let out_dir = std::env::args().nth(1).map_or_else(|| PathBuf::from("."), PathBuf::from);
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = SimpleRng::new(42);
    let (points, beams) = station();
    let dates = survey_dates();
    let elev = elevations(&points, &dates, &mut rng);

    write_wide_csv(&out_dir.join("sample_survey.csv"), &points, &dates, &elev)?;
    write_survey_parquet(&out_dir.join("sample_survey.parquet"), &points, &dates, &elev)?;
    write_layout(&out_dir.join("sample_layout.csv"), &points, &beams)?;

    let (truss_dates, truss) = truss_heights(&points, &mut rng);
    write_wide_csv(&out_dir.join("sample_truss.csv"), &points, &truss_dates, &truss)?;

    println!(
        "Wrote {} points, {} beams and {} surveys to {}",
        points.len(),
        beams.len(),
        dates.len(),
        out_dir.display()
    );
    Ok(())
}
