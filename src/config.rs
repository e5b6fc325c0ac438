//! Run configuration: which station to estimate, where to look for donors, and
//! the periods and thresholds the estimate is built from.
//!
//! A configuration is read from a JSON file (every field optional, missing
//! fields take the canonical defaults) or assembled with [`RunConfig::builder`].
//! [`RunConfig::validate`] must pass before any computation starts.

use crate::analysis::coverage::CoverageThresholds;
use crate::types::period::{Period, PeriodError};
use crate::types::unit::TemperatureUnit;
use bon::Builder;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    InvalidPeriod(#[from] PeriodError),

    #[error("Search radius must be positive, got {0} km")]
    NonPositiveRadius(f64),

    #[error("Threshold '{0}' must be positive")]
    NonPositiveThreshold(&'static str),

    #[error("Smoothing window must be at least one month")]
    EmptySmoothingWindow,

    #[error("Target station id is empty")]
    MissingTarget,

    #[error("Failed to read config file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// All options recognised by a run. Read-only once validated.
///
/// # Examples
///
/// ```
/// use baseline_estimator::{RunConfig, TemperatureUnit};
///
/// let config = RunConfig::builder()
///     .target_station("744920")
///     .radius_km(250.0)
///     .unit(TemperatureUnit::Celsius)
///     .build();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.min_overlap_years, 25);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct RunConfig {
    /// Station-year archive (`.parquet`, `.csv` or `.csv.gz`).
    #[builder(into, default = PathBuf::from("DATA/df_temp.parquet"))]
    pub archive: PathBuf,
    /// Station whose normal is estimated.
    #[builder(into, default = String::from("744920"))]
    pub target_station: String,
    /// Donor search radius, kilometres (strict `<`).
    #[builder(default = 312.0)]
    pub radius_km: f64,
    /// Historical period with target and donor overlap.
    #[builder(default = Period::CANONICAL_SEGMENT)]
    pub segment: Period,
    /// Reference climatology window.
    #[builder(default = Period::CANONICAL_NORMAL)]
    pub normal: Period,
    /// A donor needs more than this many normal-period values in every calendar month.
    #[builder(default = 15)]
    pub min_baseline_years: usize,
    /// A donor needs more than this many segment-period overlaps in every calendar month.
    #[builder(default = 25)]
    pub min_overlap_years: usize,
    /// Rolling-mean window for the long-run comparison, months.
    #[builder(default = 60)]
    pub smoothing_window: usize,
    #[builder(default)]
    pub unit: TemperatureUnit,
    /// Where reporters write their files.
    #[builder(into, default = PathBuf::from("."))]
    pub output_dir: PathBuf,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig::builder().build()
    }
}

impl RunConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.to_path_buf(), e))?;
        serde_json::from_str(&text).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// Fails fast on anything that would make a run meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_station.trim().is_empty() {
            return Err(ConfigError::MissingTarget);
        }
        if self.radius_km.is_nan() || self.radius_km <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.radius_km));
        }
        if self.min_baseline_years == 0 {
            return Err(ConfigError::NonPositiveThreshold("min_baseline_years"));
        }
        if self.min_overlap_years == 0 {
            return Err(ConfigError::NonPositiveThreshold("min_overlap_years"));
        }
        if self.smoothing_window == 0 {
            return Err(ConfigError::EmptySmoothingWindow);
        }
        for period in [&self.segment, &self.normal] {
            Period::new(period.start(), period.end())?;
        }
        Ok(())
    }

    pub fn thresholds(&self) -> CoverageThresholds {
        CoverageThresholds {
            min_overlap_years: self.min_overlap_years,
            min_baseline_years: self.min_baseline_years,
        }
    }

    /// Same configuration, different target.
    pub fn for_target(&self, station: impl Into<String>) -> RunConfig {
        RunConfig {
            target_station: station.into(),
            ..self.clone()
        }
    }
}
