//! Synthetic catalogs shared by unit tests.

use crate::estimator::{BaselineEstimator, StationEvaluation};
use crate::config::RunConfig;
use crate::stations::catalog::StationCatalog;
use crate::types::calendar::YearMonth;
use crate::types::series::MonthlySeries;
use crate::types::station::{LatLon, StationSeries};
use crate::types::unit::TemperatureUnit;

/// 1851..=1990, covering both canonical periods.
pub const YEARS: usize = 140;

pub const TARGET_ID: &str = "744920";
pub const TARGET_LOCATION: LatLon = LatLon(42.2125, -71.1147);

/// Seasonal cycle plus a deterministic year-to-year wobble.
pub fn seasonal(offset: f64) -> Vec<f64> {
    (0..YEARS * 12)
        .map(|i| {
            let month = (i % 12) as f64;
            let year = (i / 12) as f64;
            10.0 + 12.0 * (month / 12.0 * std::f64::consts::TAU).sin() + (year * 1.7).sin() + offset
        })
        .collect()
}

pub fn station(id: &str, location: LatLon, values: Vec<f64>) -> StationSeries {
    let start = YearMonth::new(1851, 1).unwrap();
    StationSeries::new(id, format!("Station {id}"), location, MonthlySeries::new(start, values))
}

/// Target `744920` plus `donors`, in Fahrenheit.
pub fn estimator(donors: Vec<StationSeries>) -> BaselineEstimator {
    let target = station(TARGET_ID, TARGET_LOCATION, seasonal(0.0));
    BaselineEstimator::new(StationCatalog::from_stations(
        std::iter::once(target).chain(donors),
        TemperatureUnit::Fahrenheit,
    ))
}

/// A finished evaluation with two admitted donors and one rejected.
pub fn evaluation() -> StationEvaluation {
    let mut short = seasonal(0.5);
    short.truncate(60 * 12);
    let estimator = estimator(vec![
        station("d1", LatLon(42.3, -71.0), seasonal(1.0)),
        station("d2", LatLon(42.0, -71.5), seasonal(-0.5)),
        station("short", LatLon(42.5, -71.2), short),
    ]);
    estimator
        .evaluate(&RunConfig::default())
        .unwrap()
        .evaluation()
        .cloned()
        .unwrap()
}
