use std::path::Path;

use chrono::NaiveDate;

use crate::analysis::Analysis;
use crate::analysis::differential::DifferentialTable;
use crate::color::PointColors;
use crate::config::AnalysisConfig;
use crate::data::filter::{PodFilter, init_pod_filter, visible_points};
use crate::data::loader;
use crate::data::model::{StationLayout, SurveyTable};

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Cumulative,
    Change,
    Rate,
    PlanDifferential,
    PlanSlope,
    FloorDifferential,
    FloorSlope,
    LugElevation,
    TrussHeight,
    Station,
    BeamTable,
}

impl View {
    pub const ALL: [View; 11] = [
        View::Cumulative,
        View::Change,
        View::Rate,
        View::PlanDifferential,
        View::PlanSlope,
        View::FloorDifferential,
        View::FloorSlope,
        View::LugElevation,
        View::TrussHeight,
        View::Station,
        View::BeamTable,
    ];

    pub fn label(self) -> &'static str {
        match self {
            View::Cumulative => "Cumulative Settlement [ft]",
            View::Change => "Settlement Change [in]",
            View::Rate => "Annualized Settlement Rate [in/yr]",
            View::PlanDifferential => "Differential Settlement [in]",
            View::PlanSlope => "Differential Slope [in/ft]",
            View::FloorDifferential => "Differential Floor Elevation [in]",
            View::FloorSlope => "Differential Floor Slope [in/ft]",
            View::LugElevation => "Lug Elevation [ft]",
            View::TrussHeight => "Lug to Truss Height [ft]",
            View::Station => "Station 3D",
            View::BeamTable => "Beam Table",
        }
    }

    /// Plan-type views that need a station layout.
    pub fn needs_layout(self) -> bool {
        !matches!(self, View::Cumulative | View::Change | View::Rate)
    }

    /// Views that need lug-to-floor heights.
    pub fn needs_heights(self) -> bool {
        matches!(self, View::FloorDifferential | View::FloorSlope | View::TrussHeight)
    }
}

/// What the station view draws at each monitoring point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationSurface {
    Settlement,
    GradeBeam,
    Floor,
}

impl StationSurface {
    pub const ALL: [StationSurface; 3] = [
        StationSurface::Settlement,
        StationSurface::GradeBeam,
        StationSurface::Floor,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StationSurface::Settlement => "Cumulative settlement",
            StationSurface::GradeBeam => "Grade beam elevation",
            StationSurface::Floor => "Floor elevation",
        }
    }
}

/// Which moment the plan views show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMoment {
    Survey(usize),
    /// Index into the forecast's future dates.
    Forecast(usize),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AnalysisConfig,

    /// Lug elevations (None until user loads a file).
    pub survey: Option<SurveyTable>,
    pub layout: Option<StationLayout>,
    /// Lug-to-floor heights.
    pub heights: Option<SurveyTable>,

    /// Derived results, rebuilt whenever inputs or settings change.
    pub analysis: Option<Analysis>,

    pub pod_filter: PodFilter,

    /// Indices of points passing the pod filter (cached).
    pub visible_points: Vec<usize>,

    pub point_colors: PointColors,

    pub view: View,
    pub moment: PlanMoment,

    pub station_surface: StationSurface,
    /// Vertical exaggeration of the 3D station view.
    pub exaggeration: f64,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            survey: None,
            layout: None,
            heights: None,
            analysis: None,
            pod_filter: PodFilter::new(),
            visible_points: Vec::new(),
            point_colors: PointColors::default(),
            view: View::Cumulative,
            moment: PlanMoment::Survey(0),
            station_surface: StationSurface::Settlement,
            exaggeration: 100.0,
            status_message: None,
        }
    }

    /// Load every file named in the configuration.
    pub fn preload(&mut self) {
        if let Some(path) = self.config.layout_path.clone() {
            self.load_layout(&path);
        }
        if let Some(path) = self.config.truss_path.clone() {
            self.load_heights(&path);
        }
        if let Some(path) = self.config.survey_path.clone() {
            self.load_survey(&path);
        }
    }

    pub fn load_survey(&mut self, path: &Path) {
        match loader::load_survey(path) {
            Ok(table) => self.set_survey(table),
            Err(e) => self.report_error("Failed to load survey", &e),
        }
    }

    pub fn load_layout(&mut self, path: &Path) {
        match loader::load_layout(path) {
            Ok(layout) => self.set_layout(layout),
            Err(e) => self.report_error("Failed to load layout", &e),
        }
    }

    pub fn load_heights(&mut self, path: &Path) {
        match loader::load_survey(path) {
            Ok(table) => self.set_heights(table),
            Err(e) => self.report_error("Failed to load lug-to-floor heights", &e),
        }
    }

    fn report_error(&mut self, what: &str, e: &anyhow::Error) {
        log::error!("{what}: {e:#}");
        self.status_message = Some(format!("Error: {e:#}"));
    }

    /// Ingest a newly loaded survey, initialise filters and colours.
    pub fn set_survey(&mut self, survey: SurveyTable) {
        self.pod_filter = init_pod_filter(&survey);
        self.visible_points = (0..survey.len()).collect();
        self.point_colors = PointColors::new(&survey);
        self.moment = PlanMoment::Survey(survey.survey_count().saturating_sub(1));

        // Keep the window inside the record so the forecast can run.
        let max_window = survey.survey_count().max(2);
        self.config.forecast_surveys = self.config.forecast_surveys.clamp(2, max_window);

        self.survey = Some(survey);
        self.status_message = None;
        self.recompute();
    }

    pub fn set_layout(&mut self, layout: StationLayout) {
        self.layout = Some(layout);
        self.status_message = None;
        self.recompute();
    }

    pub fn set_heights(&mut self, heights: SurveyTable) {
        self.heights = Some(heights);
        self.status_message = None;
        self.recompute();
    }

    /// Rebuild the cached analysis from the current inputs and settings.
    pub fn recompute(&mut self) {
        let Some(survey) = &self.survey else {
            self.analysis = None;
            return;
        };
        match Analysis::run(
            survey,
            self.layout.as_ref(),
            self.heights.as_ref(),
            &self.config,
        ) {
            Ok(analysis) => {
                if let Some(note) = analysis.notes.first() {
                    self.status_message = Some(note.to_string());
                }
                self.analysis = Some(analysis);
            }
            Err(e) => {
                log::error!("Analysis failed: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.analysis = None;
            }
        }
        self.clamp_moment();
    }

    fn clamp_moment(&mut self) {
        let surveys = self.survey.as_ref().map_or(0, SurveyTable::survey_count);
        let future = self
            .analysis
            .as_ref()
            .and_then(|a| a.elevation_forecast.as_ref())
            .map_or(0, |f| f.future_dates().len());
        self.moment = match self.moment {
            PlanMoment::Forecast(i) if i < future => PlanMoment::Forecast(i),
            PlanMoment::Survey(i) if i < surveys => PlanMoment::Survey(i),
            _ => PlanMoment::Survey(surveys.saturating_sub(1)),
        };
    }

    /// Recompute `visible_points` after filter change.
    pub fn refilter(&mut self) {
        if let Some(survey) = &self.survey {
            self.visible_points = visible_points(survey, &self.pod_filter);
        }
    }

    /// Toggle a single pod in the filter.
    pub fn toggle_pod(&mut self, pod: &str) {
        if !self.pod_filter.remove(pod) {
            self.pod_filter.insert(pod.to_string());
        }
        self.refilter();
    }

    pub fn select_all_pods(&mut self) {
        if let Some(survey) = &self.survey {
            self.pod_filter = init_pod_filter(survey);
            self.refilter();
        }
    }

    pub fn select_no_pods(&mut self) {
        self.pod_filter.clear();
        self.refilter();
    }

    /// Update the forecast settings and rebuild results when they changed.
    pub fn set_forecast(&mut self, surveys: usize, years: u32) {
        if surveys != self.config.forecast_surveys || years != self.config.forecast_years {
            self.config.forecast_surveys = surveys;
            self.config.forecast_years = years;
            self.recompute();
        }
    }
}

impl AppState {
    /// Date shown by the plan views for the current moment.
    pub fn moment_date(&self) -> Option<NaiveDate> {
        match self.moment {
            PlanMoment::Survey(k) => self.survey.as_ref()?.dates.get(k).copied(),
            PlanMoment::Forecast(i) => self
                .analysis
                .as_ref()?
                .elevation_forecast
                .as_ref()?
                .future_dates()
                .get(i)
                .copied(),
        }
    }

    /// Beam readings for the current moment, with the column to read.
    pub fn beam_readings(&self, floor: bool) -> Option<(&DifferentialTable, usize)> {
        let analysis = self.analysis.as_ref()?;
        match (self.moment, floor) {
            (PlanMoment::Survey(k), false) => Some((analysis.beams.as_ref()?, k)),
            (PlanMoment::Survey(k), true) => Some((analysis.floor.as_ref()?.beams.as_ref()?, k)),
            // Forecast tables lead with the two window endpoints.
            (PlanMoment::Forecast(i), false) => Some((analysis.projected_beams.as_ref()?, i + 2)),
            (PlanMoment::Forecast(i), true) => {
                Some((analysis.floor.as_ref()?.projected_beams.as_ref()?, i + 2))
            }
        }
    }

    /// Table and column holding `surface` for the current moment.
    pub fn surface_at_moment(&self, surface: StationSurface) -> Option<(&SurveyTable, usize)> {
        let analysis = self.analysis.as_ref()?;
        match (surface, self.moment) {
            (StationSurface::Settlement, _) => self.settlement_at_moment(),
            (StationSurface::GradeBeam, PlanMoment::Survey(k)) => Some((self.survey.as_ref()?, k)),
            (StationSurface::GradeBeam, PlanMoment::Forecast(i)) => {
                Some((&analysis.elevation_forecast.as_ref()?.table, i + 2))
            }
            (StationSurface::Floor, PlanMoment::Survey(k)) => {
                Some((&analysis.floor.as_ref()?.elevation, k))
            }
            (StationSurface::Floor, PlanMoment::Forecast(i)) => {
                Some((analysis.floor.as_ref()?.projected.as_ref()?, i + 2))
            }
        }
    }

    /// Highest surveyed value of an elevation surface, the station view's zero line.
    pub fn surface_datum(&self, surface: StationSurface) -> f64 {
        let table = match surface {
            StationSurface::Settlement => None,
            StationSurface::GradeBeam => self.survey.as_ref(),
            StationSurface::Floor => self
                .analysis
                .as_ref()
                .and_then(|a| a.floor.as_ref())
                .map(|f| &f.elevation),
        };
        table
            .into_iter()
            .flat_map(|t| t.values.iter().flatten().flatten().copied())
            .reduce(f64::max)
            .unwrap_or(0.0)
    }

    /// Value labelled at a monitoring point by the lug elevation and truss height plans.
    pub fn plan_point_value(&self, point: &str) -> Option<f64> {
        match self.view {
            View::LugElevation => {
                let (table, col) = self.surface_at_moment(StationSurface::GradeBeam)?;
                table.value(point, col)
            }
            View::TrussHeight => self.heights.as_ref()?.value_as_of(point, self.moment_date()?),
            _ => None,
        }
    }

    /// Cumulative settlement per point (feet) for the current moment.
    pub fn settlement_at_moment(&self) -> Option<(&SurveyTable, usize)> {
        let analysis = self.analysis.as_ref()?;
        match self.moment {
            PlanMoment::Survey(k) => Some((&analysis.settlement, k)),
            PlanMoment::Forecast(i) => Some((&analysis.settlement_forecast.as_ref()?.table, i + 2)),
        }
    }
}
