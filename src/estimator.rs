//! The entry point tying the pipeline together: neighbour search, coverage QC,
//! normal estimation and accuracy assessment for one or many target stations.

use crate::analysis::accuracy::{long_run_comparison, score, truth_normal, LongRunComparison};
use crate::analysis::coverage::{assess_donor, DonorAssessment};
use crate::analysis::ensemble::Ensemble;
use crate::analysis::normals::{estimate_normals, NormalEstimate};
use crate::config::RunConfig;
use crate::error::BaselineError;
use crate::stations::catalog::StationCatalog;
use crate::stations::locate_station::{NeighbourSet, StationLocator};
use crate::types::normal::{ErrorReport, MonthlyNormal};
use crate::types::station::StationSeries;
use crate::types::unit::TemperatureUnit;
use bon::bon;
use futures_util::stream::{self, StreamExt};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;
use tokio::task;

/// Default donor search radius for [`BaselineEstimator::find_donors`].
const DEFAULT_RADIUS_KM: f64 = 312.0;

/// Everything computed for a target station that received an estimate.
#[derive(Debug, Clone)]
pub struct StationEvaluation {
    pub station_id: String,
    pub station_name: String,
    /// Unit of every temperature below.
    pub unit: TemperatureUnit,
    pub neighbours: NeighbourSet,
    /// QC verdicts for every neighbour, admitted or not, nearest first.
    pub assessments: Vec<DonorAssessment>,
    pub ensemble_size: usize,
    pub estimate: NormalEstimate,
    /// The target's own normal, when it has normal-period data.
    pub truth: Option<MonthlyNormal>,
    pub report: Option<ErrorReport>,
    pub long_run: LongRunComparison,
}

impl StationEvaluation {
    pub fn admitted(&self) -> impl Iterator<Item = &DonorAssessment> {
        self.assessments.iter().filter(|a| a.admitted)
    }

    pub fn rejected(&self) -> impl Iterator<Item = &DonorAssessment> {
        self.assessments.iter().filter(|a| !a.admitted)
    }
}

/// Result of evaluating one target station.
#[derive(Debug, Clone)]
pub enum Outcome {
    Estimated(Box<StationEvaluation>),
    /// No candidate donor passed coverage QC, so there is nothing to estimate from.
    NoEstimate {
        station_id: String,
        neighbours: NeighbourSet,
        assessments: Vec<DonorAssessment>,
    },
}

impl Outcome {
    pub fn station_id(&self) -> &str {
        match self {
            Outcome::Estimated(evaluation) => &evaluation.station_id,
            Outcome::NoEstimate { station_id, .. } => station_id,
        }
    }

    pub fn evaluation(&self) -> Option<&StationEvaluation> {
        match self {
            Outcome::Estimated(evaluation) => Some(evaluation.as_ref()),
            Outcome::NoEstimate { .. } => None,
        }
    }
}

/// Holds a loaded catalog and its spatial index.
///
/// # Examples
///
/// ```
/// use baseline_estimator::{
///     BaselineEstimator, LatLon, MonthlySeries, Outcome, RunConfig, StationCatalog,
///     StationSeries, TemperatureUnit, YearMonth,
/// };
///
/// let start = YearMonth::new(1851, 1).unwrap();
/// let values: Vec<f64> = (0..140 * 12).map(|i| (i % 12) as f64 + (i / 12 % 7) as f64 * 0.1).collect();
/// let target = StationSeries::new("t", "Target", LatLon(42.0, -71.0), MonthlySeries::new(start, values.clone()));
/// let donor = StationSeries::new("d", "Donor", LatLon(42.1, -71.0), MonthlySeries::new(start, values));
///
/// let estimator = BaselineEstimator::new(StationCatalog::from_stations([target, donor], TemperatureUnit::Celsius));
/// let config = RunConfig::builder().target_station("t").build();
/// match estimator.evaluate(&config).unwrap() {
///     Outcome::Estimated(evaluation) => {
///         let report = evaluation.report.unwrap();
///         assert_eq!(report.error_normal, 0.0);
///     }
///     Outcome::NoEstimate { .. } => unreachable!(),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct BaselineEstimator {
    catalog: StationCatalog,
    locator: StationLocator,
}

#[bon]
impl BaselineEstimator {
    pub fn new(catalog: StationCatalog) -> Self {
        let locator = StationLocator::from_catalog(&catalog);
        Self { catalog, locator }
    }

    /// Loads the archive at `path` and converts it to `unit` once.
    pub async fn from_archive(path: &Path, unit: TemperatureUnit) -> Result<Self, BaselineError> {
        let catalog = StationCatalog::load(path).await?.with_unit(unit);
        Ok(Self::new(catalog))
    }

    pub fn catalog(&self) -> &StationCatalog {
        &self.catalog
    }

    pub fn locator(&self) -> &StationLocator {
        &self.locator
    }

    /// Candidate donors around a catalog station, the station itself excluded.
    #[builder]
    pub fn find_donors(
        &self,
        station: &str,
        max_distance_km: Option<f64>,
    ) -> Result<NeighbourSet, BaselineError> {
        let target = self.station(station)?;
        Ok(self.locator.within_radius(
            target.location,
            max_distance_km.unwrap_or(DEFAULT_RADIUS_KM),
            Some(&target.id),
        ))
    }

    fn station(&self, id: &str) -> Result<&StationSeries, BaselineError> {
        self.catalog
            .get(id)
            .ok_or_else(|| BaselineError::UnknownStation(id.to_string()))
    }

    /// Runs the full pipeline for `config.target_station`.
    pub fn evaluate(&self, config: &RunConfig) -> Result<Outcome, BaselineError> {
        config.validate()?;
        let target = self.station(&config.target_station)?;
        let neighbours = self
            .locator
            .within_radius(target.location, config.radius_km, Some(&target.id));
        debug!(
            "{} candidate donors within {} km of {}",
            neighbours.len(),
            config.radius_km,
            target.id
        );

        let target_segment = target.series.slice(&config.segment);
        let thresholds = config.thresholds();
        let assessments: Vec<DonorAssessment> = neighbours
            .iter()
            .filter_map(|n| {
                let donor = self.catalog.get(&n.station_id)?;
                Some(assess_donor(&target_segment, donor, n.distance_km, &config.normal, thresholds))
            })
            .collect();

        for rejected in assessments.iter().filter(|a| !a.admitted) {
            warn!(
                "Excluding donor {} ({}, {:.1} km): min overlap {} (need > {}), min baseline {} (need > {})",
                rejected.station_id,
                rejected.station_name,
                rejected.distance_km,
                rejected.overlap_counts.values().min().copied().unwrap_or_default(),
                thresholds.min_overlap_years,
                rejected.baseline_counts.values().min().copied().unwrap_or_default(),
                thresholds.min_baseline_years,
            );
        }

        let donors: Vec<&StationSeries> = assessments
            .iter()
            .filter(|a| a.admitted)
            .filter_map(|a| self.catalog.get(&a.station_id))
            .collect();
        let Some(ensemble) = Ensemble::new(donors) else {
            warn!(
                "No estimate available for {}: none of {} candidate donors passed coverage QC",
                target.id,
                assessments.len()
            );
            return Ok(Outcome::NoEstimate {
                station_id: target.id.clone(),
                neighbours,
                assessments,
            });
        };

        let estimate = estimate_normals(
            &target_segment,
            &ensemble.mean_over(&config.segment),
            &ensemble.mean_over(&config.normal),
        );

        let target_normal = target.series.slice(&config.normal);
        let (truth, report) = if target_normal.finite_count() > 0 {
            let truth = truth_normal(&target_normal);
            let report = score(&target.id, &estimate, &truth);
            (Some(truth), Some(report))
        } else {
            debug!("{} has no normal-period data; skipping accuracy scoring", target.id);
            (None, None)
        };

        let long_run = long_run_comparison(
            &target.series,
            &ensemble.mean_series(),
            &estimate,
            &config.normal,
            config.smoothing_window,
        );

        info!(
            "Estimated normals for {} from {} of {} donors",
            target.id,
            ensemble.len(),
            assessments.len()
        );

        Ok(Outcome::Estimated(Box::new(StationEvaluation {
            station_id: target.id.clone(),
            station_name: target.name.clone(),
            unit: self.catalog.unit(),
            ensemble_size: ensemble.len(),
            neighbours,
            assessments,
            estimate,
            truth,
            report,
            long_run,
        })))
    }

    /// Evaluates every station in `targets` with the rest of `config` unchanged.
    ///
    /// Targets run on blocking worker tasks, at most `concurrency` at a time.
    /// Results come back in completion order.
    pub async fn evaluate_many(
        self: Arc<Self>,
        config: &RunConfig,
        targets: impl IntoIterator<Item = String>,
        concurrency: usize,
    ) -> Vec<(String, Result<Outcome, BaselineError>)> {
        let jobs = targets.into_iter().map(|target| {
            let estimator = Arc::clone(&self);
            let config = config.for_target(target.clone());
            async move {
                let result = task::spawn_blocking(move || estimator.evaluate(&config))
                    .await
                    .map_err(BaselineError::from)
                    .and_then(|outcome| outcome);
                (target, result)
            }
        });
        stream::iter(jobs)
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}
