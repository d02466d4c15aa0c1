use chrono::NaiveDate;

use super::error::AnalysisError;
use crate::config::{DifferentialLimits, SlopeLimits};
use crate::data::model::{Beam, BeamOrientation, StationLayout, SurveyTable};

const INCHES_PER_FOOT: f64 = 12.0;

// ---------------------------------------------------------------------------
// Severity classes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Acceptable,
    /// Only slopes use this intermediate class.
    Elevated,
    Warning,
    Critical,
    NoData,
}

impl Severity {
    pub fn label(self) -> &'static str {
        match self {
            Severity::Acceptable => "acceptable",
            Severity::Elevated => "elevated",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
            Severity::NoData => "no data",
        }
    }
}

pub fn classify_differential(diff_in: Option<f64>, limits: &DifferentialLimits) -> Severity {
    match diff_in.map(f64::abs) {
        None => Severity::NoData,
        Some(d) if d >= limits.critical => Severity::Critical,
        Some(d) if d >= limits.warning => Severity::Warning,
        Some(_) => Severity::Acceptable,
    }
}

pub fn classify_slope(slope: Option<f64>, limits: &SlopeLimits) -> Severity {
    match slope.map(f64::abs) {
        None => Severity::NoData,
        Some(s) if s >= limits.critical => Severity::Critical,
        Some(s) if s >= limits.warning => Severity::Warning,
        Some(s) if s >= limits.elevated => Severity::Elevated,
        Some(_) => Severity::Acceptable,
    }
}

// ---------------------------------------------------------------------------
// Per-beam readings
// ---------------------------------------------------------------------------

/// How a beam is marked in plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Ends differ; an arrow points toward the lower end.
    Arrow,
    /// Ends at the same elevation.
    Level,
    NoData,
}

/// Differential state of one beam at one survey.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeamReading {
    /// `(west/south − east/north)` elevation, inches.
    pub diff_in: Option<f64>,
    /// `diff_in / length`, inches per foot.
    pub slope: Option<f64>,
    /// Arrow heading in degrees, clockwise from east.
    pub angle_deg: Option<f64>,
    pub marker: Marker,
    pub diff_severity: Severity,
    pub slope_severity: Severity,
}

impl BeamReading {
    pub fn new(
        west_south: Option<f64>,
        east_north: Option<f64>,
        beam: &Beam,
        diff_limits: &DifferentialLimits,
        slope_limits: &SlopeLimits,
    ) -> Self {
        let diff_in = match (west_south, east_north) {
            (Some(ws), Some(en)) => Some((ws - en) * INCHES_PER_FOOT),
            _ => None,
        };
        let slope = diff_in.map(|d| d / beam.length_ft);
        BeamReading {
            diff_in,
            slope,
            angle_deg: diff_in.map(|d| arrow_angle(d, beam.orientation)),
            marker: match diff_in {
                None => Marker::NoData,
                Some(d) if d.abs() > 0.0 => Marker::Arrow,
                Some(_) => Marker::Level,
            },
            diff_severity: classify_differential(diff_in, diff_limits),
            slope_severity: classify_slope(slope, slope_limits),
        }
    }
}

/// Heading toward the lower end: east/north when the west/south end is
/// higher, west/south otherwise. Vertical beams turn a quarter counterclockwise.
pub fn arrow_angle(diff_in: f64, orientation: BeamOrientation) -> f64 {
    let base = if diff_in >= 0.0 { 0.0 } else { 180.0 };
    match orientation {
        BeamOrientation::Horizontal => base,
        BeamOrientation::Vertical => base - 90.0,
    }
}

/// Readings for one beam across every survey of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamSeries {
    pub beam: String,
    pub readings: Vec<BeamReading>,
}

/// Differential readings for every beam of a layout.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialTable {
    pub dates: Vec<NaiveDate>,
    /// Same order as `StationLayout::beams`.
    pub beams: Vec<BeamSeries>,
}

impl DifferentialTable {
    /// Readings for every beam at one survey index.
    pub fn at(&self, survey: usize) -> impl Iterator<Item = (&str, Option<&BeamReading>)> {
        self.beams
            .iter()
            .map(move |b| (b.beam.as_str(), b.readings.get(survey)))
    }
}

/// Row indices of a beam's two endpoints.
pub fn endpoint_indices(beam: &Beam, table: &SurveyTable) -> Result<(usize, usize), AnalysisError> {
    let lookup = |point: &str| {
        table
            .point_index(point)
            .ok_or_else(|| AnalysisError::UnknownPoint {
                beam: beam.name.clone(),
                point: point.to_string(),
            })
    };
    Ok((lookup(&beam.west_south)?, lookup(&beam.east_north)?))
}

/// Compute differential readings for every beam over an elevation table.
///
/// Beams whose endpoints are missing from the table are reported as
/// [`Marker::NoData`] throughout.
pub fn differentials(
    elevation: &SurveyTable,
    layout: &StationLayout,
    diff_limits: &DifferentialLimits,
    slope_limits: &SlopeLimits,
) -> DifferentialTable {
    let n = elevation.survey_count();
    let beams = layout
        .beams
        .iter()
        .map(|beam| {
            let readings = match endpoint_indices(beam, elevation) {
                Ok((ws, en)) => (0..n)
                    .map(|k| {
                        BeamReading::new(
                            elevation.values[ws][k],
                            elevation.values[en][k],
                            beam,
                            diff_limits,
                            slope_limits,
                        )
                    })
                    .collect(),
                Err(_) => vec![BeamReading::new(None, None, beam, diff_limits, slope_limits); n],
            };
            BeamSeries {
                beam: beam.name.clone(),
                readings,
            }
        })
        .collect();

    DifferentialTable {
        dates: elevation.dates.clone(),
        beams,
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::data::model::PlanPoint;

    fn beam(name: &str, ws: &str, en: &str, orientation: BeamOrientation) -> Beam {
        Beam {
            name: name.into(),
            west_south: ws.into(),
            east_north: en.into(),
            length_ft: 32.0,
            orientation,
            start: PlanPoint::new(0.0, 0.0),
            end: PlanPoint::new(32.0, 0.0),
            label: PlanPoint::new(16.0, 0.0),
            arrow: PlanPoint::new(16.0, 0.0),
        }
    }

    #[test]
    fn differential_classes() {
        let limits = DifferentialLimits::default();
        assert_eq!(classify_differential(Some(1.49), &limits), Severity::Acceptable);
        assert_eq!(classify_differential(Some(-1.5), &limits), Severity::Warning);
        assert_eq!(classify_differential(Some(1.99), &limits), Severity::Warning);
        assert_eq!(classify_differential(Some(2.0), &limits), Severity::Critical);
        assert_eq!(classify_differential(None, &limits), Severity::NoData);
    }

    #[test]
    fn slope_classes() {
        let limits = SlopeLimits::default();
        assert_eq!(classify_slope(Some(0.03), &limits), Severity::Acceptable);
        assert_eq!(classify_slope(Some(1.0 / 32.0), &limits), Severity::Elevated);
        assert_eq!(classify_slope(Some(-0.07), &limits), Severity::Warning);
        assert_eq!(classify_slope(Some(0.125), &limits), Severity::Critical);
        assert_eq!(classify_slope(None, &limits), Severity::NoData);
    }

    #[test]
    fn arrows_point_toward_lower_end() {
        assert_eq!(arrow_angle(0.5, BeamOrientation::Horizontal), 0.0);
        assert_eq!(arrow_angle(-0.5, BeamOrientation::Horizontal), 180.0);
        assert_eq!(arrow_angle(0.5, BeamOrientation::Vertical), -90.0);
        assert_eq!(arrow_angle(-0.5, BeamOrientation::Vertical), 90.0);
    }

    #[test]
    fn reading_from_endpoint_elevations() {
        let b = beam("A1-1_A1-2", "A1-1", "A1-2", BeamOrientation::Horizontal);
        let r = BeamReading::new(
            Some(100.25),
            Some(100.0),
            &b,
            &DifferentialLimits::default(),
            &SlopeLimits::default(),
        );
        assert_eq!(r.diff_in, Some(3.0));
        assert_eq!(r.slope, Some(3.0 / 32.0));
        assert_eq!(r.marker, Marker::Arrow);
        assert_eq!(r.diff_severity, Severity::Critical);
        assert_eq!(r.slope_severity, Severity::Warning);

        let level = BeamReading::new(
            Some(5.0),
            Some(5.0),
            &b,
            &DifferentialLimits::default(),
            &SlopeLimits::default(),
        );
        assert_eq!(level.marker, Marker::Level);
        assert_eq!(level.diff_severity, Severity::Acceptable);
    }

    #[test]
    fn table_over_layout_with_unknown_point() {
        let table = SurveyTable::new(
            vec!["A1-1".into(), "A1-2".into()],
            vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()],
            vec![vec![Some(10.0)], vec![Some(10.125)]],
        );
        let layout = StationLayout {
            beams: vec![
                beam("good", "A1-1", "A1-2", BeamOrientation::Vertical),
                beam("bad", "A1-1", "Z9-9", BeamOrientation::Horizontal),
            ],
            labels: vec![],
        };

        assert_matches!(
            endpoint_indices(&layout.beams[1], &table),
            Err(AnalysisError::UnknownPoint { point, .. }) if point == "Z9-9"
        );

        let diffs = differentials(
            &table,
            &layout,
            &DifferentialLimits::default(),
            &SlopeLimits::default(),
        );
        let readings: Vec<_> = diffs.at(0).collect();
        assert_eq!(readings[0].1.unwrap().diff_in, Some(-1.5));
        assert_eq!(readings[0].1.unwrap().angle_deg, Some(90.0));
        assert_eq!(readings[1].1.unwrap().marker, Marker::NoData);
    }
}
