use thiserror::Error;

/// Failures of the settlement computations themselves (input files are
/// already parsed by the time these can occur).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("survey table has no monitoring points or no surveys")]
    EmptySurvey,

    #[error(
        "forecast window of {requested} surveys is invalid: need at least 2 and at most {available}"
    )]
    ForecastWindow { requested: usize, available: usize },

    #[error("beam '{beam}' references monitoring point '{point}' which is not in the survey")]
    UnknownPoint { beam: String, point: String },
}
