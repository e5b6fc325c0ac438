//! Temporal-coverage quality control for candidate donor stations.

use crate::types::calendar::PerMonth;
use crate::types::period::Period;
use crate::types::series::MonthlySeries;
use crate::types::station::StationSeries;
use serde::{Deserialize, Serialize};

/// Minimum finite-sample counts a donor must exceed in every calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageThresholds {
    /// Years of target/donor overlap required in the segment period.
    pub min_overlap_years: usize,
    /// Years of donor data required in the normal period.
    pub min_baseline_years: usize,
}

/// Per calendar month, the number of timestamps at which both series are finite.
///
/// Counting runs over the timestamps of `a`; `b` is looked up at the same month.
pub fn monthly_overlap_counts(a: &MonthlySeries, b: &MonthlySeries) -> PerMonth<usize> {
    let mut counts = [0usize; 12];
    for (at, value) in a.iter() {
        if value.is_finite() && b.get(at).is_finite() {
            counts[at.calendar_month().index()] += 1;
        }
    }
    PerMonth::from_array(counts)
}

/// Per calendar month, the number of finite values.
pub fn monthly_valid_counts(series: &MonthlySeries) -> PerMonth<usize> {
    let mut counts = [0usize; 12];
    for (at, value) in series.iter() {
        if value.is_finite() {
            counts[at.calendar_month().index()] += 1;
        }
    }
    PerMonth::from_array(counts)
}

/// `true` iff every overlap count is `> overlap_min` and every baseline count is `> baseline_min`.
pub fn passes_thresholds(
    overlap_counts: &PerMonth<usize>,
    baseline_counts: &PerMonth<usize>,
    overlap_min: usize,
    baseline_min: usize,
) -> bool {
    overlap_counts.values().all(|&n| n > overlap_min)
        && baseline_counts.values().all(|&n| n > baseline_min)
}

/// The QC verdict for one candidate donor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DonorAssessment {
    pub station_id: String,
    pub station_name: String,
    pub distance_km: f64,
    pub overlap_counts: PerMonth<usize>,
    pub baseline_counts: PerMonth<usize>,
    pub admitted: bool,
}

/// Runs the coverage gate for `donor` against the target's segment-period record.
pub fn assess_donor(
    target_segment: &MonthlySeries,
    donor: &StationSeries,
    distance_km: f64,
    normal: &Period,
    thresholds: CoverageThresholds,
) -> DonorAssessment {
    let overlap_counts = monthly_overlap_counts(target_segment, &donor.series);
    let baseline_counts = monthly_valid_counts(&donor.series.slice(normal));
    let admitted = passes_thresholds(
        &overlap_counts,
        &baseline_counts,
        thresholds.min_overlap_years,
        thresholds.min_baseline_years,
    );
    DonorAssessment {
        station_id: donor.id.clone(),
        station_name: donor.name.clone(),
        distance_km,
        overlap_counts,
        baseline_counts,
        admitted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::calendar::{CalendarMonth, YearMonth};
    use crate::types::station::LatLon;

    fn ym(year: i32, month: u32) -> YearMonth {
        YearMonth::new(year, month).unwrap()
    }

    fn full(start: YearMonth, years: usize, value: f64) -> MonthlySeries {
        MonthlySeries::new(start, vec![value; years * 12])
    }

    #[test]
    fn test_overlap_requires_both_finite() {
        let mut a_values = vec![1.0; 24];
        a_values[0] = f64::NAN; // Jan, year 1
        let a = MonthlySeries::new(ym(1900, 1), a_values);
        let mut b_values = vec![2.0; 24];
        b_values[13] = f64::NAN; // Feb, year 2
        let b = MonthlySeries::new(ym(1900, 1), b_values);

        let counts = monthly_overlap_counts(&a, &b);
        assert_eq!(counts[CalendarMonth::ALL[0]], 1);
        assert_eq!(counts[CalendarMonth::ALL[1]], 1);
        assert_eq!(counts[CalendarMonth::ALL[2]], 2);
    }

    #[test]
    fn test_counts_bounded_by_period_years() {
        let period = Period::parse("1900-01", "1909-12").unwrap();
        let a = full(ym(1890, 1), 30, 1.0).slice(&period);
        let b = full(ym(1880, 1), 50, 1.0);
        let counts = monthly_overlap_counts(&a, &b);
        assert_eq!(counts.values().count(), 12);
        assert!(counts.values().all(|&n| n <= period.years()));
        assert!(counts.values().all(|&n| n == 10));
    }

    #[test]
    fn test_valid_counts() {
        let mut values = vec![1.0; 36];
        values[6] = f64::NAN;
        values[18] = f64::NAN;
        let counts = monthly_valid_counts(&MonthlySeries::new(ym(1961, 1), values));
        assert_eq!(counts[CalendarMonth::ALL[6]], 1);
        assert_eq!(counts[CalendarMonth::ALL[7]], 3);
    }

    #[test]
    fn test_thresholds_are_strict_and_all_months() {
        let ok = PerMonth::from_array([26; 12]);
        assert!(passes_thresholds(&ok, &ok, 25, 15));

        let mut one_at_threshold = [26; 12];
        one_at_threshold[4] = 25;
        let one_at_threshold = PerMonth::from_array(one_at_threshold);
        assert!(!passes_thresholds(&one_at_threshold, &ok, 25, 15));

        let mut baseline_short = [16; 12];
        baseline_short[11] = 15;
        assert!(!passes_thresholds(&ok, &PerMonth::from_array(baseline_short), 25, 15));
    }

    #[test]
    fn test_assess_donor() {
        let segment = Period::parse("1851-01", "1900-12").unwrap();
        let normal = Period::CANONICAL_NORMAL;
        let target = full(ym(1851, 1), 50, 10.0).slice(&segment);
        let donor = StationSeries::new(
            "d1",
            "Donor",
            LatLon(42.0, -71.0),
            full(ym(1851, 1), 140, 11.0),
        );
        let thresholds = CoverageThresholds {
            min_overlap_years: 25,
            min_baseline_years: 15,
        };
        let verdict = assess_donor(&target, &donor, 12.5, &normal, thresholds);
        assert!(verdict.admitted);
        assert_eq!(verdict.baseline_counts[CalendarMonth::ALL[0]], 30);

        let strict = CoverageThresholds {
            min_overlap_years: 50,
            min_baseline_years: 15,
        };
        assert!(!assess_donor(&target, &donor, 12.5, &normal, strict).admitted);
    }
}
