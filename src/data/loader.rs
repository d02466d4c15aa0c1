use std::collections::{BTreeMap, BTreeSet};
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray, Float32Array, Float64Array, StringArray};
use arrow::datatypes::DataType;
use chrono::{Days, NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::model::{Beam, BeamOrientation, PlanPoint, PointLabel, StationLayout, SurveyTable};

/// Header names accepted for the monitoring point column, after normalisation.
const POINT_HEADERS: &[&str] = &["MONITOR_POINT", "POINT", "MP"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a survey table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – point column followed by one column per survey date
/// * `.json`    – `[{ "point": "A1-1", "surveys": { "2010-11-02": 9310.2, ... } }, ...]`
/// * `.parquet` – utf8 point column plus one float column per survey date
///
/// The same layout is used for lug elevations and lug-to-floor heights.
pub fn load_survey(path: &Path) -> Result<SurveyTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_survey_csv(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_survey_json(&text)
        }
        "parquet" | "pq" => load_survey_parquet(path),
        other => bail!("Unsupported survey file extension: .{other}"),
    }
    .with_context(|| format!("loading survey {}", path.display()))?;

    log::info!(
        "Loaded {} monitoring points across {} surveys from {}",
        table.len(),
        table.survey_count(),
        path.display()
    );
    Ok(table)
}

/// Load the station layout (beams, labels, arrows) from a CSV file.
pub fn load_layout(path: &Path) -> Result<StationLayout> {
    let file =
        std::fs::File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let layout = read_layout_csv(file).with_context(|| format!("loading layout {}", path.display()))?;
    log::info!(
        "Loaded {} beams and {} point labels from {}",
        layout.beams.len(),
        layout.labels.len(),
        path.display()
    );
    Ok(layout)
}

// ---------------------------------------------------------------------------
// CSV survey loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with a point column and survey date columns.
/// Columns whose header is not a date (descriptions, shim notes, deltas) are skipped.
pub fn read_survey_csv<R: Read>(input: R) -> Result<SurveyTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let point_idx = headers
        .iter()
        .position(|h| is_point_header(h))
        .context("CSV missing monitoring point column")?;

    let mut date_cols: Vec<(usize, NaiveDate)> = Vec::new();
    for (i, header) in headers.iter().enumerate() {
        if i == point_idx {
            continue;
        }
        match parse_survey_date(header) {
            Some(date) => date_cols.push((i, date)),
            None => log::debug!("Skipping non-date column '{}'", header.escape_debug()),
        }
    }
    if date_cols.is_empty() {
        bail!("CSV has no survey date columns");
    }

    let mut points = Vec::new();
    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let point = record.get(point_idx).unwrap_or("").trim();
        if point.is_empty() {
            continue;
        }

        let values = date_cols
            .iter()
            .map(|&(col, _)| {
                parse_cell(record.get(col).unwrap_or(""))
                    .with_context(|| format!("CSV row {row_no}, column '{}'", headers[col]))
            })
            .collect::<Result<Vec<_>>>()?;

        points.push(point.to_string());
        rows.push(values);
    }

    let dates = date_cols.into_iter().map(|(_, d)| d).collect();
    build_table(points, dates, rows)
}

fn is_point_header(header: &str) -> bool {
    let normalised = header
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_uppercase();
    POINT_HEADERS.contains(&normalised.as_str())
}

/// Parse a survey column header into a date.
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` and `MM/DD/YYYY`.  A trailing
/// `.N` suffix (added by spreadsheet exports to repeated headers) is ignored.
pub fn parse_survey_date(header: &str) -> Option<NaiveDate> {
    survey_column(header).map(|(date, _)| date)
}

/// Date of a survey column header plus its repeat number (`.N` suffix, 0 when absent).
fn survey_column(header: &str) -> Option<(NaiveDate, u32)> {
    let s = header.trim();
    if let Some(date) = parse_date_str(s) {
        return Some((date, 0));
    }
    let (head, suffix) = s.rsplit_once('.')?;
    if suffix.is_empty() || !suffix.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some((parse_date_str(head)?, suffix.parse().ok()?))
}

fn parse_date_str(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
        .or_else(|| NaiveDate::parse_from_str(s, "%m/%d/%Y").ok())
}

fn parse_cell(s: &str) -> Result<Option<f64>> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let v = s
        .parse::<f64>()
        .with_context(|| format!("'{s}' is not a number"))?;
    Ok(Some(v))
}

/// Resolve duplicate dates, reject duplicate points, and assemble the table.
fn build_table(
    points: Vec<String>,
    dates: Vec<NaiveDate>,
    rows: Vec<Vec<Option<f64>>>,
) -> Result<SurveyTable> {
    let mut seen_points = BTreeSet::new();
    for p in &points {
        if !seen_points.insert(p.as_str()) {
            bail!("Monitoring point '{p}' appears more than once");
        }
    }
    Ok(SurveyTable::new(points, dedupe_dates(dates), rows))
}

/// A second survey on an already-used date moves to the next day no column uses.
///
/// Every first occurrence keeps its date, so a real survey is never displaced
/// by a repeat that sorts before it.
fn dedupe_dates(dates: Vec<NaiveDate>) -> Vec<NaiveDate> {
    let mut used: BTreeSet<NaiveDate> = dates.iter().copied().collect();
    let mut seen = BTreeSet::new();
    dates
        .into_iter()
        .map(|date| {
            if seen.insert(date) {
                return date;
            }
            let mut d = date + Days::new(1);
            while used.contains(&d) {
                d = d + Days::new(1);
            }
            log::warn!("Duplicate survey date {date}; treating repeat survey as {d}");
            used.insert(d);
            d
        })
        .collect()
}

// ---------------------------------------------------------------------------
// JSON survey loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SurveyRecord {
    point: String,
    surveys: BTreeMap<String, Option<f64>>,
}

/// Expected JSON schema:
///
/// ```json
/// [
///   { "point": "A1-1", "surveys": { "2010-11-02": 9310.21, "2011-12-01": null } },
///   ...
/// ]
/// ```
pub fn parse_survey_json(text: &str) -> Result<SurveyTable> {
    let records: Vec<SurveyRecord> = serde_json::from_str(text).context("parsing JSON")?;

    let mut columns = BTreeSet::new();
    for (i, rec) in records.iter().enumerate() {
        for key in rec.surveys.keys() {
            let column = survey_column(key)
                .with_context(|| format!("Record {i}: '{key}' is not a survey date"))?;
            columns.insert(column);
        }
    }
    let columns: Vec<(NaiveDate, u32)> = columns.into_iter().collect();

    let mut points = Vec::with_capacity(records.len());
    let mut rows = Vec::with_capacity(records.len());
    for rec in records {
        let mut row = vec![None; columns.len()];
        for (key, value) in rec.surveys {
            if let Some(idx) = survey_column(&key).and_then(|c| columns.binary_search(&c).ok()) {
                row[idx] = value;
            }
        }
        points.push(rec.point);
        rows.push(row);
    }

    let dates = columns.into_iter().map(|(date, _)| date).collect();
    build_table(points, dates, rows)
}

// ---------------------------------------------------------------------------
// Parquet survey loader
// ---------------------------------------------------------------------------

/// Load a wide survey table from Parquet.
///
/// Expected schema:
/// - a Utf8 point column (`MONITOR_POINT`, `POINT` or `MP`)
/// - one Float64 or Float32 column per survey, named by its date
fn load_survey_parquet(path: &Path) -> Result<SurveyTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let schema = builder.schema().clone();
    let point_idx = schema
        .fields()
        .iter()
        .position(|f| is_point_header(f.name()))
        .context("Parquet file missing monitoring point column")?;

    let date_cols: Vec<(usize, NaiveDate)> = schema
        .fields()
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != point_idx)
        .filter_map(|(i, f)| parse_survey_date(f.name()).map(|d| (i, d)))
        .collect();
    if date_cols.is_empty() {
        bail!("Parquet file has no survey date columns");
    }

    let reader = builder.build().context("building parquet reader")?;
    let mut points = Vec::new();
    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let point_col = batch.column(point_idx);

        for row in 0..batch.num_rows() {
            let Some(point) = extract_string(point_col, row)? else {
                continue;
            };
            let values = date_cols
                .iter()
                .map(|&(col, _)| extract_f64(batch.column(col), row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("Row {row} ({point})"))?;
            points.push(point);
            rows.push(values);
        }
    }

    let dates = date_cols.into_iter().map(|(_, d)| d).collect();
    build_table(points, dates, rows)
}

fn extract_string(col: &Arc<dyn Array>, row: usize) -> Result<Option<String>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let s = match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .context("expected StringArray")?
            .value(row)
            .to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        other => bail!("Point column must be a string column, got {other:?}"),
    };
    let s = s.trim();
    Ok((!s.is_empty()).then(|| s.to_string()))
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let v = if let Some(arr) = col.as_any().downcast_ref::<Float64Array>() {
        arr.value(row)
    } else if let Some(arr) = col.as_any().downcast_ref::<Float32Array>() {
        arr.value(row) as f64
    } else {
        bail!("Survey column type is {:?}, expected Float64 or Float32", col.data_type())
    };
    Ok((!v.is_nan()).then_some(v))
}

// ---------------------------------------------------------------------------
// Layout CSV loader
// ---------------------------------------------------------------------------

/// One row of the layout file.  A row may describe a point label, a beam, or both.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LayoutRow {
    #[serde(rename = "MP_W_S")]
    mp_w_s: Option<String>,
    #[serde(rename = "MP_E_N")]
    mp_e_n: Option<String>,
    #[serde(rename = "beamName")]
    beam_name: Option<String>,
    #[serde(rename = "beamLength")]
    beam_length: Option<f64>,
    #[serde(rename = "beamDir")]
    beam_dir: Option<String>,
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

fn non_empty(s: &Option<String>) -> Option<&str> {
    s.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn pair(x: Option<f64>, y: Option<f64>) -> Option<PlanPoint> {
    Some(PlanPoint::new(x?, y?))
}

/// Parse the station layout CSV.
pub fn read_layout_csv<R: Read>(input: R) -> Result<StationLayout> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let mut layout = StationLayout::default();

    for (row_no, result) in reader.deserialize::<LayoutRow>().enumerate() {
        let row = result.with_context(|| format!("Layout row {row_no}"))?;
        let label = pair(row.label_x, row.label_y);

        if let (Some(point), Some(position)) = (non_empty(&row.mp_w_s), label) {
            layout.labels.push(PointLabel {
                point: point.to_string(),
                position,
            });
        }

        let Some(name) = non_empty(&row.beam_name) else {
            continue;
        };
        let (Some(ws), Some(en)) = (non_empty(&row.mp_w_s), non_empty(&row.mp_e_n)) else {
            log::debug!("Layout row {row_no}: beam '{name}' has no endpoints, skipped");
            continue;
        };
        let Some(length_ft) = row.beam_length else {
            log::debug!("Layout row {row_no}: beam '{name}' has no length, skipped");
            continue;
        };
        if length_ft <= 0.0 {
            bail!("Layout row {row_no}: beam '{name}' has non-positive length {length_ft}");
        }
        let (Some(start), Some(end)) = (pair(row.start_x, row.start_y), pair(row.end_x, row.end_y))
        else {
            log::debug!("Layout row {row_no}: beam '{name}' has no geometry, skipped");
            continue;
        };

        let beam_label = pair(row.beam_x, row.beam_y).unwrap_or_else(|| start.midpoint(end));
        layout.beams.push(Beam {
            name: name.to_string(),
            west_south: ws.to_string(),
            east_north: en.to_string(),
            length_ft,
            orientation: BeamOrientation::from_code(non_empty(&row.beam_dir).unwrap_or("h")),
            start,
            end,
            label: beam_label,
            arrow: pair(row.arrow_x, row.arrow_y).or(label).unwrap_or(beam_label),
        });
    }

    Ok(layout)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use assert_matches::assert_matches;
    use parquet::arrow::ArrowWriter;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn csv_skips_non_date_columns_and_parses_missing() {
        let text = "\
\"MONITOR\nPOINT\",DESCRIPTION,2010-11-02 00:00:00,2011-12-01,Delta
A1-1,lug,9310.20,9310.05,0.15
A1-2,lug,,9311.00,
";
        let table = read_survey_csv(text.as_bytes()).expect("parse");
        assert_eq!(table.points, vec!["A1-1", "A1-2"]);
        assert_eq!(table.dates, vec![date(2010, 11, 2), date(2011, 12, 1)]);
        assert_eq!(table.values[0], vec![Some(9310.20), Some(9310.05)]);
        assert_eq!(table.values[1], vec![None, Some(9311.00)]);
    }

    #[test]
    fn csv_repeated_date_moves_to_next_day() {
        let text = "\
MONITOR_POINT,2010-11-02 00:00:00,2010-11-02 00:00:00.1,2010-11-03
A1-1,1.0,2.0,3.0
";
        let table = read_survey_csv(text.as_bytes()).expect("parse");
        assert_eq!(
            table.dates,
            vec![date(2010, 11, 2), date(2010, 11, 3), date(2010, 11, 4)]
        );
        // The real 11-03 survey keeps its date; the repeat takes the next free day.
        assert_eq!(table.values[0], vec![Some(1.0), Some(3.0), Some(2.0)]);
    }

    #[test]
    fn repeated_date_without_collision_moves_one_day() {
        let text = "\
MONITOR_POINT,2010-11-02,2010-11-02.1,2010-11-05
A1-1,1.0,2.0,3.0
";
        let table = read_survey_csv(text.as_bytes()).expect("parse");
        assert_eq!(
            table.dates,
            vec![date(2010, 11, 2), date(2010, 11, 3), date(2010, 11, 5)]
        );
        assert_eq!(table.values[0], vec![Some(1.0), Some(2.0), Some(3.0)]);
    }

    #[test]
    fn csv_rejects_bad_numbers_and_duplicate_points() {
        let bad = "POINT,2010-01-01\nA1-1,abc\n";
        let err = read_survey_csv(bad.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("not a number"));

        let dup = "POINT,2010-01-01\nA1-1,1\nA1-1,2\n";
        let err = read_survey_csv(dup.as_bytes()).unwrap_err();
        assert!(format!("{err:#}").contains("more than once"));
    }

    #[test]
    fn csv_requires_point_column() {
        let text = "NAME,2010-01-01\nA1-1,1\n";
        assert_matches!(read_survey_csv(text.as_bytes()), Err(_));
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_survey_date("2014-01-20"), Some(date(2014, 1, 20)));
        assert_eq!(parse_survey_date("01/20/2014"), Some(date(2014, 1, 20)));
        assert_eq!(parse_survey_date("2014-01-20 00:00:00.2"), Some(date(2014, 1, 20)));
        assert_eq!(parse_survey_date("Unnamed: 52"), None);
        assert_eq!(parse_survey_date("Shims\nNote 13"), None);
    }

    #[test]
    fn json_union_of_dates() {
        let text = r#"[
            {"point": "B1-1", "surveys": {"2011-01-01": 2.0, "2010-01-01": 1.0}},
            {"point": "B1-2", "surveys": {"2012-01-01": 3.0, "2010-01-01": null}}
        ]"#;
        let table = parse_survey_json(text).expect("parse");
        assert_eq!(table.survey_count(), 3);
        assert_eq!(table.values[0], vec![Some(1.0), Some(2.0), None]);
        assert_eq!(table.values[1], vec![None, None, Some(3.0)]);
    }

    #[test]
    fn json_keeps_repeated_date_keys() {
        let text = r#"[
            {"point": "A1-1", "surveys": {"2010-11-02 00:00:00": 1.0, "2010-11-02 00:00:00.1": 2.0}},
            {"point": "A1-2", "surveys": {"2010-11-02": 5.0}}
        ]"#;
        let table = parse_survey_json(text).expect("parse");
        assert_eq!(table.dates, vec![date(2010, 11, 2), date(2010, 11, 3)]);
        assert_eq!(table.values[0], vec![Some(1.0), Some(2.0)]);
        assert_eq!(table.values[1], vec![Some(5.0), None]);
    }

    #[test]
    fn parquet_survey_with_nulls_and_float32() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("MONITOR_POINT", DataType::Utf8, false),
            Field::new("2020-01-01", DataType::Float64, true),
            Field::new("2021-01-01", DataType::Float32, true),
            Field::new("Notes", DataType::Utf8, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["A1-1", "A1-2"])),
                Arc::new(Float64Array::from(vec![Some(9310.25), None])),
                Arc::new(Float32Array::from(vec![Some(9310.0f32), Some(9311.5)])),
                Arc::new(StringArray::from(vec![Some("lug"), None])),
            ],
        )
        .expect("batch");

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .expect("create temp file");
        let mut writer =
            ArrowWriter::try_new(file.reopen().expect("reopen"), schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close");

        let table = load_survey(file.path()).expect("load");
        assert_eq!(table.points, vec!["A1-1", "A1-2"]);
        assert_eq!(table.dates, vec![date(2020, 1, 1), date(2021, 1, 1)]);
        assert_eq!(table.values[0], vec![Some(9310.25), Some(9310.0)]);
        assert_eq!(table.values[1], vec![None, Some(9311.5)]);
    }

    #[test]
    fn parquet_rejects_numeric_point_column() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("POINT", DataType::Float64, false),
            Field::new("2020-01-01", DataType::Float64, true),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Float64Array::from(vec![1.0])),
                Arc::new(Float64Array::from(vec![2.0])),
            ],
        )
        .expect("batch");

        let file = tempfile::Builder::new()
            .suffix(".parquet")
            .tempfile()
            .expect("create temp file");
        let mut writer =
            ArrowWriter::try_new(file.reopen().expect("reopen"), schema, None).expect("writer");
        writer.write(&batch).expect("write batch");
        writer.close().expect("close");

        let err = load_survey(file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("string column"));
    }

    #[test]
    fn load_layout_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp file");
        write!(
            file,
            "MP_W_S,MP_E_N,beamName,beamLength,beamDir,startX,startY,endX,endY,labelX,labelY\n\
             A1-1,A1-2,G1,40,h,0,0,40,0,-4,-4\n\
             A1-2,,,,,,,,,36,-4\n"
        )
        .expect("write");

        let layout = load_layout(file.path()).expect("load");
        assert_eq!(layout.beams.len(), 1);
        assert_eq!(layout.beams[0].label, PlanPoint::new(20.0, 0.0));
        assert_eq!(layout.position_of("A1-1"), Some(PlanPoint::new(-4.0, -4.0)));
        assert_eq!(layout.position_of("A1-2"), Some(PlanPoint::new(36.0, -4.0)));

        assert!(load_layout(Path::new("/definitely/not/here.csv")).is_err());
    }

    #[test]
    fn layout_rows_yield_labels_and_beams() {
        let text = "\
MP_W_S,MP_E_N,beamName,beamLength,beamDir,beamX,beamY,startX,startY,endX,endY,labelX,labelY,arrowX,arrowY
A1-1,A1-2,A1-1_A1-2,40,h,20,2,0,0,40,0,0,-3,20,0
A1-2,,,,,,,,,,,40,-3,,
A1-1,A1-3,A1-1_A1-3,30,v,,,0,0,0,30,,,,
";
        let layout = read_layout_csv(text.as_bytes()).expect("parse");
        assert_eq!(layout.labels.len(), 2);
        assert_eq!(layout.position_of("A1-2"), Some(PlanPoint::new(40.0, -3.0)));
        assert_eq!(layout.beams.len(), 2);

        let vertical = &layout.beams[1];
        assert_eq!(vertical.orientation, BeamOrientation::Vertical);
        assert_eq!(vertical.label, PlanPoint::new(0.0, 15.0));
        assert_eq!(vertical.arrow, vertical.label);
    }

    #[test]
    fn layout_rejects_zero_length_beam() {
        let text = "\
MP_W_S,MP_E_N,beamName,beamLength,startX,startY,endX,endY
A1-1,A1-2,bad,0,0,0,1,0
";
        assert!(read_layout_csv(text.as_bytes()).is_err());
    }

    #[test]
    fn load_survey_dispatches_on_extension() {
        let mut file = tempfile::Builder::new()
            .suffix(".csv")
            .tempfile()
            .expect("create temp file");
        write!(file, "POINT,2020-01-01\nA1-1,5.5\n").expect("write");
        let table = load_survey(file.path()).expect("load");
        assert_eq!(table.value("A1-1", 0), Some(5.5));

        let other = tempfile::Builder::new()
            .suffix(".xlsx")
            .tempfile()
            .expect("create temp file");
        let err = load_survey(other.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Unsupported"));
    }
}
