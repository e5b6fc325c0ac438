mod analysis;
mod config;
mod error;
mod estimator;
mod reporting;
mod stations;
mod types;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, RunConfig};
pub use error::BaselineError;
pub use estimator::*;

pub use analysis::accuracy::{long_run_comparison, score, truth_normal, LongRunComparison};
pub use analysis::coverage::*;
pub use analysis::ensemble::Ensemble;
pub use analysis::monthly_stats::{monthly_normal, monthly_stats, MonthlyStats};
pub use analysis::normals::{estimate_normals, NormalEstimate};
pub use analysis::smoothing::centered_rolling_mean;

pub use stations::catalog::{CatalogSummary, StationCatalog};
pub use stations::error::CatalogError;
pub use stations::locate_station::*;

pub use types::calendar::{CalendarMonth, InvalidCalendarMonth, ParseYearMonthError, PerMonth, YearMonth};
pub use types::normal::{ErrorReport, MonthlyNormal, NormalEntry};
pub use types::period::{Period, PeriodError};
pub use types::series::MonthlySeries;
pub use types::station::{LatLon, StationPoint, StationSeries};
pub use types::unit::{celsius_to_fahrenheit, fahrenheit_to_celsius, TemperatureUnit};

pub use reporting::csv::CsvReporter;
#[cfg(feature = "plotting")]
pub use reporting::plot::PlotReporter;
pub use reporting::summary::LogReporter;
pub use reporting::{ReportError, Reporter};
