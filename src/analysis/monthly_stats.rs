//! The per-calendar-month reducer every other component builds on.

use crate::types::calendar::PerMonth;
use crate::types::normal::{MonthlyNormal, NormalEntry};
use crate::types::series::MonthlySeries;

/// NaN-aware summary of the finite values that fall in one calendar month.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthlyStats {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation (divisor `count`).
    pub std_dev: f64,
}

impl MonthlyStats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Self {
        let finite: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return MonthlyStats {
                count: 0,
                mean: f64::NAN,
                std_dev: f64::NAN,
            };
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let variance = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        MonthlyStats {
            count: finite.len(),
            mean,
            std_dev: variance.sqrt(),
        }
    }

    /// `std_dev / sqrt(count)`, `NaN` when there are no samples.
    pub fn standard_error(&self) -> f64 {
        if self.count == 0 {
            return f64::NAN;
        }
        self.std_dev / (self.count as f64).sqrt()
    }

    pub fn to_entry(self) -> NormalEntry {
        NormalEntry {
            mean: self.mean,
            standard_error: self.standard_error(),
            count: self.count,
        }
    }
}

/// Groups `series` by calendar month and reduces each group.
pub fn monthly_stats(series: &MonthlySeries) -> PerMonth<MonthlyStats> {
    let mut groups: [Vec<f64>; 12] = Default::default();
    for (at, value) in series.iter() {
        groups[at.calendar_month().index()].push(value);
    }
    PerMonth::from_fn(|month| MonthlyStats::from_values(groups[month.index()].iter().copied()))
}

/// Mean, SE and count per calendar month, packaged as a normal.
pub fn monthly_normal(series: &MonthlySeries) -> MonthlyNormal {
    MonthlyNormal::new(monthly_stats(series).map(|s| s.to_entry()))
}

/// Mean of the finite values, `NaN` if there are none.
pub fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    MonthlyStats::from_values(values).mean
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::calendar::{CalendarMonth, YearMonth};

    #[test]
    fn test_stats_ignore_nan() {
        let stats = MonthlyStats::from_values([1.0, f64::NAN, 3.0]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.std_dev, 1.0);
        assert!((stats.standard_error() - 1.0 / 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_group_is_nan_not_error() {
        let stats = MonthlyStats::from_values([f64::NAN, f64::NAN]);
        assert_eq!(stats.count, 0);
        assert!(stats.mean.is_nan());
        assert!(stats.standard_error().is_nan());
    }

    #[test]
    fn test_single_sample_has_zero_se() {
        let stats = MonthlyStats::from_values([4.5]);
        assert_eq!(stats.standard_error(), 0.0);
    }

    #[test]
    fn test_monthly_stats_groups_by_calendar_month() {
        // Two years: January is 1.0 then 3.0, every other month is its own number.
        let mut values: Vec<f64> = (1..=24).map(|i| ((i - 1) % 12 + 1) as f64).collect();
        values[0] = 1.0;
        values[12] = 3.0;
        let series = MonthlySeries::new(YearMonth::new(1900, 1).unwrap(), values);
        let stats = monthly_stats(&series);
        let january = stats[CalendarMonth::ALL[0]];
        assert_eq!(january.count, 2);
        assert_eq!(january.mean, 2.0);
        let june = stats[CalendarMonth::ALL[5]];
        assert_eq!(june.mean, 6.0);
        assert_eq!(june.std_dev, 0.0);
    }

    #[test]
    fn test_nan_mean() {
        assert_eq!(nan_mean([1.0, f64::NAN, 2.0]), 1.5);
        assert!(nan_mean([f64::NAN]).is_nan());
    }
}
