/// Settlement computations over loaded survey tables.
///
/// ```text
///   lug elevations ──► settlement ──► deltas ──► annual rate
///        │                 │
///        │                 └──► forecast (settlement)
///        ├──► forecast (elevation) ──► projected differentials
///        ├──► differentials (per beam, needs layout)
///        └──► floor elevations (needs lug-to-floor heights)
///                 ├──► floor differentials
///                 └──► pod planes
/// ```

pub mod differential;
pub mod error;
pub mod floor;
pub mod forecast;
pub mod settlement;

use crate::config::AnalysisConfig;
use crate::data::model::{StationLayout, SurveyTable};

use differential::{DifferentialTable, differentials};
use error::AnalysisError;
use floor::PodPlane;
use forecast::Forecast;

/// Floor-level results, present when lug-to-floor heights are loaded.
#[derive(Debug, Clone)]
pub struct FloorAnalysis {
    pub elevation: SurveyTable,
    pub beams: Option<DifferentialTable>,
    /// Floor elevations on the forecast dates.
    pub projected: Option<SurveyTable>,
    /// Differentials over projected floor elevations.
    pub projected_beams: Option<DifferentialTable>,
}

/// Every derived table the dashboard shows, computed in one pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub settlement: SurveyTable,
    pub deltas: SurveyTable,
    pub rates: SurveyTable,
    pub settlement_forecast: Option<Forecast>,
    pub elevation_forecast: Option<Forecast>,
    pub beams: Option<DifferentialTable>,
    /// Differentials over projected elevations (forecast dates).
    pub projected_beams: Option<DifferentialTable>,
    pub floor: Option<FloorAnalysis>,
    /// Best-fit planes per survey; floor elevations when known, lug elevations otherwise.
    pub planes: Vec<Vec<PodPlane>>,
    /// Non-fatal problems to surface to the user.
    pub notes: Vec<AnalysisError>,
}

impl Analysis {
    pub fn run(
        survey: &SurveyTable,
        layout: Option<&StationLayout>,
        heights: Option<&SurveyTable>,
        config: &AnalysisConfig,
    ) -> Result<Self, AnalysisError> {
        if survey.is_empty() || survey.survey_count() == 0 {
            return Err(AnalysisError::EmptySurvey);
        }
        let mut notes = Vec::new();

        let settlement = settlement::cumulative(survey);
        let deltas = settlement::deltas(&settlement, &config.delta_skip_dates);
        let rates = settlement::annual_rate(&deltas);

        let mut run_forecast = |table: &SurveyTable| {
            match forecast::forecast(table, config.forecast_surveys, config.forecast_years) {
                Ok(f) => Some(f),
                Err(e) => {
                    if !notes.contains(&e) {
                        log::warn!("Forecast skipped: {e}");
                        notes.push(e);
                    }
                    None
                }
            }
        };
        let settlement_forecast = run_forecast(&settlement);
        let elevation_forecast = run_forecast(survey);

        let diff_limits = &config.differential_limits;
        let slope_limits = &config.slope_limits;

        let beams = layout.map(|l| differentials(survey, l, diff_limits, slope_limits));
        let projected_beams = layout.zip(elevation_forecast.as_ref()).map(|(l, f)| {
            differentials(&f.table, l, diff_limits, slope_limits)
        });
        if let Some(l) = layout {
            for beam in &l.beams {
                if let Err(e) = differential::endpoint_indices(beam, survey) {
                    log::warn!("{e}");
                    notes.push(e);
                }
            }
        }

        let floor = heights.map(|h| {
            let elevation = floor::floor_elevations(survey, h);
            let projected = elevation_forecast
                .as_ref()
                .map(|f| floor::project_floor(&f.table, h));
            FloorAnalysis {
                beams: layout.map(|l| differentials(&elevation, l, diff_limits, slope_limits)),
                projected_beams: layout
                    .zip(projected.as_ref())
                    .map(|(l, p)| differentials(p, l, diff_limits, slope_limits)),
                projected,
                elevation,
            }
        });

        let planes = match layout {
            Some(l) => {
                let source = floor.as_ref().map(|f| &f.elevation).unwrap_or(survey);
                (0..source.survey_count())
                    .map(|k| floor::pod_planes(source, l, k))
                    .collect()
            }
            None => Vec::new(),
        };

        log::debug!(
            "Analysis complete: {} points, {} surveys, {} notes",
            survey.len(),
            survey.survey_count(),
            notes.len()
        );

        Ok(Analysis {
            settlement,
            deltas,
            rates,
            settlement_forecast,
            elevation_forecast,
            beams,
            projected_beams,
            floor,
            planes,
            notes,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;
    use crate::data::model::{Beam, BeamOrientation, PlanPoint, PointLabel};

    fn survey() -> SurveyTable {
        let dates = (2015..2020)
            .map(|y| NaiveDate::from_ymd_opt(y, 1, 1).unwrap())
            .collect();
        SurveyTable::new(
            vec!["A1-1".into(), "A1-2".into(), "A1-3".into()],
            dates,
            vec![
                vec![Some(100.0), Some(99.9), Some(99.8), Some(99.7), Some(99.6)],
                vec![Some(100.0), Some(100.0), Some(99.95), Some(99.9), Some(99.85)],
                vec![Some(100.0), Some(99.95), Some(99.9), Some(99.85), Some(99.8)],
            ],
        )
    }

    fn layout() -> StationLayout {
        let beam = Beam {
            name: "A1-1_A1-2".into(),
            west_south: "A1-1".into(),
            east_north: "A1-2".into(),
            length_ft: 40.0,
            orientation: BeamOrientation::Horizontal,
            start: PlanPoint::new(0.0, 0.0),
            end: PlanPoint::new(40.0, 0.0),
            label: PlanPoint::new(20.0, 0.0),
            arrow: PlanPoint::new(20.0, 0.0),
        };
        let labels = [("A1-1", 0.0, 0.0), ("A1-2", 40.0, 0.0), ("A1-3", 0.0, 30.0)]
            .iter()
            .map(|&(p, x, y)| PointLabel {
                point: p.into(),
                position: PlanPoint::new(x, y),
            })
            .collect();
        StationLayout {
            beams: vec![beam],
            labels,
        }
    }

    #[test]
    fn full_run_with_layout() {
        let mut config = AnalysisConfig::default();
        config.forecast_surveys = 4;
        config.forecast_years = 2;

        let analysis = Analysis::run(&survey(), Some(&layout()), None, &config).expect("run");
        assert!(analysis.notes.is_empty());
        assert_eq!(analysis.settlement.survey_count(), 5);
        assert_eq!(analysis.deltas.values[0][0], None);

        let forecast = analysis.settlement_forecast.as_ref().expect("forecast");
        assert_eq!(forecast.table.survey_count(), 4);

        let beams = analysis.beams.as_ref().expect("beams");
        let last = beams.beams[0].readings.last().unwrap();
        // 99.6 vs 99.85: west end lower, arrow points west.
        assert!((last.diff_in.unwrap() + 3.0).abs() < 1e-9);
        assert_eq!(last.angle_deg, Some(180.0));

        let projected = analysis.projected_beams.as_ref().expect("projected");
        assert_eq!(projected.dates.len(), 4);
        assert_eq!(analysis.planes.len(), 5);
        assert_eq!(analysis.planes[0].len(), 1);
        assert!(analysis.floor.is_none());
    }

    #[test]
    fn short_record_skips_forecast_with_note() {
        let analysis =
            Analysis::run(&survey(), None, None, &AnalysisConfig::default()).expect("run");
        assert!(analysis.settlement_forecast.is_none());
        assert!(analysis.elevation_forecast.is_none());
        assert_eq!(analysis.notes.len(), 1);
        assert_matches!(
            analysis.notes[0],
            AnalysisError::ForecastWindow { requested: 10, available: 5 }
        );
    }

    #[test]
    fn floor_results_with_heights() {
        let s = survey();
        let heights = SurveyTable::new(
            s.points.clone(),
            vec![NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()],
            vec![vec![Some(3.0)], vec![Some(3.25)], vec![Some(3.0)]],
        );
        let mut config = AnalysisConfig::default();
        config.forecast_surveys = 3;

        let analysis = Analysis::run(&s, Some(&layout()), Some(&heights), &config).expect("run");
        let floor = analysis.floor.as_ref().expect("floor");
        assert_eq!(floor.elevation.values[1][0], Some(103.25));
        let beam = &floor.beams.as_ref().expect("floor beams").beams[0];
        assert!((beam.readings[0].diff_in.unwrap() + 3.0).abs() < 1e-9);
        assert!(floor.projected_beams.is_some());
        let projected = floor.projected.as_ref().expect("projected floor");
        assert_eq!(projected.dates, analysis.elevation_forecast.as_ref().unwrap().table.dates);
    }

    #[test]
    fn unknown_endpoint_is_noted_once() {
        let s = survey();
        let mut l = layout();
        l.beams[0].east_north = "A1-9".into();
        let heights = SurveyTable::new(
            s.points.clone(),
            vec![NaiveDate::from_ymd_opt(2014, 1, 1).unwrap()],
            vec![vec![Some(3.0)]; 3],
        );
        let mut config = AnalysisConfig::default();
        config.forecast_surveys = 3;

        let analysis = Analysis::run(&s, Some(&l), Some(&heights), &config).expect("run");
        assert_eq!(analysis.notes.len(), 1);
        assert_matches!(
            &analysis.notes[0],
            AnalysisError::UnknownPoint { point, .. } if point == "A1-9"
        );

        let lug = analysis.beams.as_ref().expect("beams");
        let floor = analysis.floor.as_ref().and_then(|f| f.projected_beams.as_ref()).expect("floor");
        for table in [lug, floor] {
            assert!(table.beams[0]
                .readings
                .iter()
                .all(|r| r.marker == differential::Marker::NoData));
        }
    }

    #[test]
    fn empty_survey_is_an_error() {
        let empty = SurveyTable::new(vec![], vec![], vec![]);
        assert_matches!(
            Analysis::run(&empty, None, None, &AnalysisConfig::default()),
            Err(AnalysisError::EmptySurvey)
        );
    }
}
