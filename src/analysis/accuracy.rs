//! Scoring an estimate against the target's withheld normal-period record.

use crate::analysis::monthly_stats::{monthly_normal, nan_mean};
use crate::analysis::normals::NormalEstimate;
use crate::analysis::smoothing::centered_rolling_mean;
use crate::types::normal::{ErrorReport, MonthlyNormal};
use crate::types::period::Period;
use crate::types::series::MonthlySeries;

/// The true per-month normal of the target's own normal-period series.
pub fn truth_normal(normal_series: &MonthlySeries) -> MonthlyNormal {
    monthly_normal(normal_series)
}

/// Mean-over-months errors of the estimate relative to the truth.
pub fn score(station_id: &str, estimate: &NormalEstimate, truth: &MonthlyNormal) -> ErrorReport {
    let estimated = estimate.normal.entries();
    let true_entries = truth.entries();
    ErrorReport {
        station_id: station_id.to_string(),
        error_normal: nan_mean(
            estimated
                .iter()
                .map(|(month, e)| e.mean - true_entries[month].mean),
        ),
        error_standard_error: nan_mean(
            estimated
                .iter()
                .map(|(month, e)| e.standard_error - true_entries[month].standard_error),
        ),
        mean_difference_standard_error: nan_mean(estimate.difference_standard_errors.values().copied()),
    }
}

/// Long-timescale comparison of smoothed target and ensemble records.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRunComparison {
    /// Rolling mean of the full target record.
    pub target_smoothed: MonthlySeries,
    /// Rolling mean of the full ensemble-mean record.
    pub ensemble_smoothed: MonthlySeries,
    /// The estimated monthly normals repeated over every month of the normal period.
    pub replicated_estimate: MonthlySeries,
    /// `target_smoothed` restricted to the normal period.
    pub truth_trace: MonthlySeries,
    /// `truth_trace` shifted so its mean level equals the replicated estimate's.
    pub estimate_trace: MonthlySeries,
    /// Mean level of `replicated_estimate`.
    pub estimated_level: f64,
    /// Mean level of `truth_trace`.
    pub true_level: f64,
    /// Estimate minus truth at the first month where the truth trace is finite.
    pub error: f64,
}

pub fn long_run_comparison(
    target: &MonthlySeries,
    ensemble: &MonthlySeries,
    estimate: &NormalEstimate,
    normal: &Period,
    window: usize,
) -> LongRunComparison {
    let target_smoothed = centered_rolling_mean(target, window);
    let ensemble_smoothed = centered_rolling_mean(ensemble, window);
    let replicated_estimate = MonthlySeries::replicate(&estimate.means(), normal);
    let truth_trace = target_smoothed.slice(normal);

    let estimated_level = nan_mean(replicated_estimate.values().iter().copied());
    let true_level = nan_mean(truth_trace.values().iter().copied());
    let offset = estimated_level - true_level;
    let estimate_trace = truth_trace.map(|v| v + offset);

    let error = truth_trace
        .values()
        .iter()
        .zip(estimate_trace.values())
        .find(|(truth, _)| truth.is_finite())
        .map(|(truth, estimated)| estimated - truth)
        .unwrap_or(f64::NAN);

    LongRunComparison {
        target_smoothed,
        ensemble_smoothed,
        replicated_estimate,
        truth_trace,
        estimate_trace,
        estimated_level,
        true_level,
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::normals::estimate_normals;
    use crate::types::calendar::{CalendarMonth, PerMonth, YearMonth};
    use crate::types::normal::NormalEntry;

    fn constant_normal(mean: f64, se: f64) -> MonthlyNormal {
        MonthlyNormal::new(PerMonth::from_fn(|_| NormalEntry {
            mean,
            standard_error: se,
            count: 30,
        }))
    }

    #[test]
    fn test_score_is_plain_mean_of_monthly_errors() {
        let truth = constant_normal(10.0, 0.5);
        let mut entries = *constant_normal(10.0, 0.5).entries().as_array();
        entries[0].mean = 13.0; // +3 in January only
        entries[1].standard_error = 1.7; // +1.2 in February only
        let estimate = NormalEstimate {
            normal: MonthlyNormal::new(PerMonth::from_array(entries)),
            difference_standard_errors: PerMonth::from_fn(|m| m.number() as f64),
        };

        let report = score("744920", &estimate, &truth);
        assert_eq!(report.station_id, "744920");
        assert!((report.error_normal - 0.25).abs() < 1e-12);
        assert!((report.error_standard_error - 0.1).abs() < 1e-12);
        assert_eq!(report.mean_difference_standard_error, 6.5);
    }

    #[test]
    fn test_score_skips_months_without_estimate() {
        let truth = constant_normal(10.0, 0.5);
        let mut entries = *constant_normal(11.0, 0.5).entries().as_array();
        entries[6] = NormalEntry::MISSING;
        let estimate = NormalEstimate {
            normal: MonthlyNormal::new(PerMonth::from_array(entries)),
            difference_standard_errors: PerMonth::from_fn(|_| 0.2),
        };
        let report = score("x", &estimate, &truth);
        assert_eq!(report.error_normal, 1.0);
    }

    #[test]
    fn test_truth_normal_matches_reducer() {
        let series = MonthlySeries::new(YearMonth::new(1961, 1).unwrap(), vec![4.0; 360]);
        let truth = truth_normal(&series);
        let july = truth.entry(CalendarMonth::ALL[6]);
        assert_eq!(july.mean, 4.0);
        assert_eq!(july.standard_error, 0.0);
        assert_eq!(july.count, 30);
    }

    #[test]
    fn test_long_run_error_is_level_offset_at_first_valid_index() {
        let normal = Period::CANONICAL_NORMAL;
        let start = YearMonth::new(1931, 1).unwrap();
        let target = MonthlySeries::new(start, vec![50.0; 12 * 90]);
        let ensemble = target.map(|v| v + 1.0);
        let estimate = estimate_normals(
            &target.slice(&Period::parse("1931-01", "1960-12").unwrap()),
            &ensemble.slice(&Period::parse("1931-01", "1960-12").unwrap()),
            &ensemble.slice(&normal).map(|v| v + 0.5),
        );

        let comparison = long_run_comparison(&target, &ensemble, &estimate, &normal, 60);
        assert_eq!(comparison.replicated_estimate.len(), 360);
        assert!((comparison.estimated_level - 50.5).abs() < 1e-9);
        assert!((comparison.true_level - 50.0).abs() < 1e-9);
        assert!((comparison.error - 0.5).abs() < 1e-9);
        assert!(comparison.estimate_trace.values().iter().all(|v| (v - 50.5).abs() < 1e-9));
        assert!((comparison.ensemble_smoothed.values()[100] - 51.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_run_error_is_nan_without_truth() {
        let normal = Period::CANONICAL_NORMAL;
        let target = MonthlySeries::new(YearMonth::new(1851, 1).unwrap(), vec![50.0; 600]);
        let estimate = NormalEstimate {
            normal: constant_normal(50.0, 0.1),
            difference_standard_errors: PerMonth::from_fn(|_| 0.0),
        };
        let comparison = long_run_comparison(&target, &target, &estimate, &normal, 60);
        assert!(comparison.error.is_nan());
        assert!(comparison.true_level.is_nan());
    }
}
