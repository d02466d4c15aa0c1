use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Environment variable naming an explicit settings file.
pub const CONFIG_ENV: &str = "SETTLEMENT_VIEWER_CONFIG";

/// Settings file picked up from the working directory when no override is set.
pub const DEFAULT_CONFIG_FILE: &str = "settlement-viewer.json";

// ---------------------------------------------------------------------------
// Severity limits
// ---------------------------------------------------------------------------

/// Differential settlement limits in inches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifferentialLimits {
    pub warning: f64,
    pub critical: f64,
}

impl Default for DifferentialLimits {
    fn default() -> Self {
        Self {
            warning: 1.5,
            critical: 2.0,
        }
    }
}

/// Differential slope limits in inches per foot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlopeLimits {
    pub elevated: f64,
    pub warning: f64,
    pub critical: f64,
}

impl Default for SlopeLimits {
    fn default() -> Self {
        Self {
            elevated: 1.0 / 32.0,
            warning: 1.0 / 16.0,
            critical: 1.0 / 8.0,
        }
    }
}

// ---------------------------------------------------------------------------
// AnalysisConfig
// ---------------------------------------------------------------------------

/// Everything that shapes the computed results, plus optional files to preload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of most recent surveys the forecast regression is fitted over.
    pub forecast_surveys: usize,
    /// Number of whole years projected past the last survey.
    pub forecast_years: u32,
    pub differential_limits: DifferentialLimits,
    pub slope_limits: SlopeLimits,
    /// Surveys left out of the survey-to-survey change series.
    pub delta_skip_dates: Vec<NaiveDate>,
    pub survey_path: Option<PathBuf>,
    pub layout_path: Option<PathBuf>,
    /// Lug-to-floor (truss/shim) heights, same table layout as the survey.
    pub truss_path: Option<PathBuf>,
}

/// The two November 2010 surveys taken one day apart.
fn default_delta_skip_dates() -> Vec<NaiveDate> {
    [(2010, 11, 2), (2010, 11, 3)]
        .into_iter()
        .filter_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
        .collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            forecast_surveys: 10,
            forecast_years: 5,
            differential_limits: DifferentialLimits::default(),
            slope_limits: SlopeLimits::default(),
            delta_skip_dates: default_delta_skip_dates(),
            survey_path: None,
            layout_path: None,
            truss_path: None,
        }
    }
}

impl AnalysisConfig {
    /// Read and validate a JSON settings file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: AnalysisConfig = serde_json::from_str(&text)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the settings file from the environment or the working directory.
    ///
    /// An explicitly named file must load; the implicit one is optional.
    pub fn discover() -> Result<Self> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            log::info!("Using config from ${CONFIG_ENV}: {path}");
            return Self::load_from(Path::new(&path));
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.exists() {
            log::info!("Using config {}", local.display());
            return Self::load_from(local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<()> {
        let d = &self.differential_limits;
        if !(d.warning > 0.0 && d.warning < d.critical) {
            bail!(
                "differential limits must satisfy 0 < warning < critical (got {} / {})",
                d.warning,
                d.critical
            );
        }
        let s = &self.slope_limits;
        if !(s.elevated > 0.0 && s.elevated < s.warning && s.warning < s.critical) {
            bail!(
                "slope limits must satisfy 0 < elevated < warning < critical (got {} / {} / {})",
                s.elevated,
                s.warning,
                s.critical
            );
        }
        if self.forecast_surveys < 2 {
            bail!("forecast_surveys must be at least 2");
        }
        Ok(())
    }
}
