use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// SurveyTable – one row per monitoring point, one column per survey date
// ---------------------------------------------------------------------------

/// A wide table of surveyed values (lug elevations or lug-to-floor heights).
///
/// `values[point][survey]` lines up with `points[point]` and `dates[survey]`.
/// Dates are strictly increasing once a loader has produced the table.
#[derive(Debug, Clone, PartialEq)]
pub struct SurveyTable {
    /// Monitoring point ids, e.g. `A1-1`.
    pub points: Vec<String>,
    /// Survey dates in ascending order.
    pub dates: Vec<NaiveDate>,
    /// Surveyed value in feet; `None` where the point was not surveyed.
    pub values: Vec<Vec<Option<f64>>>,
}

impl SurveyTable {
    /// Build a table, sorting the survey columns by date.
    pub fn new(points: Vec<String>, dates: Vec<NaiveDate>, values: Vec<Vec<Option<f64>>>) -> Self {
        let mut order: Vec<usize> = (0..dates.len()).collect();
        order.sort_by_key(|&i| dates[i]);

        let dates = order.iter().map(|&i| dates[i]).collect();
        let values = values
            .into_iter()
            .map(|row| order.iter().map(|&i| row.get(i).copied().flatten()).collect())
            .collect();

        SurveyTable {
            points,
            dates,
            values,
        }
    }

    /// Number of monitoring points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the table has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of surveys (date columns).
    pub fn survey_count(&self) -> usize {
        self.dates.len()
    }

    pub fn point_index(&self, point: &str) -> Option<usize> {
        self.points.iter().position(|p| p == point)
    }

    /// The full series of a point, if present.
    pub fn series(&self, point: &str) -> Option<&[Option<f64>]> {
        self.point_index(point).map(|i| self.values[i].as_slice())
    }

    /// Value of a point at a survey index.
    pub fn value(&self, point: &str, survey: usize) -> Option<f64> {
        self.series(point)?.get(survey).copied().flatten()
    }

    /// Most recent non-missing value of a point on or before `date`.
    pub fn value_as_of(&self, point: &str, date: NaiveDate) -> Option<f64> {
        let series = self.series(point)?;
        self.dates
            .iter()
            .zip(series)
            .filter(|(d, _)| **d <= date)
            .filter_map(|(_, v)| *v)
            .last()
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Sorted set of pods present in the table.
    pub fn pods(&self) -> BTreeSet<String> {
        self.points.iter().map(|p| pod_of(p).to_string()).collect()
    }
}

/// The pod a monitoring point belongs to: everything before the first `-`.
pub fn pod_of(point: &str) -> &str {
    point.split_once('-').map(|(pod, _)| pod).unwrap_or(point)
}

// ---------------------------------------------------------------------------
// Station layout – beams and label positions in plan
// ---------------------------------------------------------------------------

/// A position in the plan coordinate system (feet).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanPoint {
    pub x: f64,
    pub y: f64,
}

impl PlanPoint {
    pub fn new(x: f64, y: f64) -> Self {
        PlanPoint { x, y }
    }

    pub fn midpoint(self, other: PlanPoint) -> PlanPoint {
        PlanPoint::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BeamOrientation {
    /// Runs west → east.
    Horizontal,
    /// Runs south → north.
    Vertical,
}

impl BeamOrientation {
    /// Parse the layout file's `beamDir` cell (`h` is horizontal, anything else vertical).
    pub fn from_code(code: &str) -> Self {
        if code.trim().eq_ignore_ascii_case("h") {
            BeamOrientation::Horizontal
        } else {
            BeamOrientation::Vertical
        }
    }
}

/// A grade beam spanning two adjacent monitoring points.
#[derive(Debug, Clone, PartialEq)]
pub struct Beam {
    pub name: String,
    /// Monitoring point at the west (horizontal) or south (vertical) end.
    pub west_south: String,
    /// Monitoring point at the east (horizontal) or north (vertical) end.
    pub east_north: String,
    pub length_ft: f64,
    pub orientation: BeamOrientation,
    pub start: PlanPoint,
    pub end: PlanPoint,
    /// Where the value label is drawn.
    pub label: PlanPoint,
    /// Where the direction arrow is drawn.
    pub arrow: PlanPoint,
}

/// Plan position of a monitoring point label.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLabel {
    pub point: String,
    pub position: PlanPoint,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StationLayout {
    pub beams: Vec<Beam>,
    pub labels: Vec<PointLabel>,
}

impl StationLayout {
    pub fn position_of(&self, point: &str) -> Option<PlanPoint> {
        self.labels
            .iter()
            .find(|l| l.point == point)
            .map(|l| l.position)
    }

    /// Axis-aligned bounds `(min, max)` over all beams and labels.
    pub fn bounds(&self) -> Option<(PlanPoint, PlanPoint)> {
        let points = self
            .beams
            .iter()
            .flat_map(|b| [b.start, b.end])
            .chain(self.labels.iter().map(|l| l.position));

        points.fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((
                PlanPoint::new(lo.x.min(p.x), lo.y.min(p.y)),
                PlanPoint::new(hi.x.max(p.x), hi.y.max(p.y)),
            )),
        })
    }
}

impl fmt::Display for BeamOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeamOrientation::Horizontal => write!(f, "h"),
            BeamOrientation::Vertical => write!(f, "v"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_sorts_columns_by_date() {
        let table = SurveyTable::new(
            vec!["A1-1".into()],
            vec![date(2012, 1, 5), date(2010, 11, 2)],
            vec![vec![Some(2.0), Some(1.0)]],
        );
        assert_eq!(table.dates, vec![date(2010, 11, 2), date(2012, 1, 5)]);
        assert_eq!(table.values[0], vec![Some(1.0), Some(2.0)]);
    }

    #[test]
    fn value_as_of_skips_missing_and_future() {
        let table = SurveyTable::new(
            vec!["B2-3".into()],
            vec![date(2010, 1, 1), date(2011, 1, 1), date(2012, 1, 1)],
            vec![vec![Some(4.0), None, Some(5.0)]],
        );
        assert_eq!(table.value_as_of("B2-3", date(2011, 6, 1)), Some(4.0));
        assert_eq!(table.value_as_of("B2-3", date(2012, 1, 1)), Some(5.0));
        assert_eq!(table.value_as_of("B2-3", date(2009, 1, 1)), None);
        assert_eq!(table.value_as_of("nope", date(2012, 1, 1)), None);
    }

    #[test]
    fn pods_are_prefixes_before_dash() {
        assert_eq!(pod_of("A2-5"), "A2");
        assert_eq!(pod_of("MISC"), "MISC");

        let table = SurveyTable::new(
            vec!["B1-1".into(), "A1-2".into(), "A1-1".into()],
            vec![],
            vec![vec![], vec![], vec![]],
        );
        let pods: Vec<String> = table.pods().into_iter().collect();
        assert_eq!(pods, vec!["A1".to_string(), "B1".to_string()]);
    }

    #[test]
    fn orientation_code_parsing() {
        assert_eq!(BeamOrientation::from_code("h"), BeamOrientation::Horizontal);
        assert_eq!(BeamOrientation::from_code(" H "), BeamOrientation::Horizontal);
        assert_eq!(BeamOrientation::from_code("v"), BeamOrientation::Vertical);
    }
}
