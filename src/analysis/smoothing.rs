use crate::types::series::MonthlySeries;

/// Centred rolling mean over the finite observations of `series`.
///
/// Missing months are dropped before rolling, so a window spans `window`
/// consecutive *observations*, not calendar months. Each result is written back
/// at its observation's timestamp; dropped months and positions where the window
/// does not fit are `NaN`. For an even window the centre sits just left of the
/// midpoint: position `i` averages observations `i - window/2 ..= i + (window-1)/2`.
pub fn centered_rolling_mean(series: &MonthlySeries, window: usize) -> MonthlySeries {
    let mut smoothed = vec![f64::NAN; series.len()];
    if window == 0 {
        return MonthlySeries::new(series.start(), smoothed);
    }

    let observed: Vec<(usize, f64)> = series
        .values()
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .collect();
    if observed.len() < window {
        return MonthlySeries::new(series.start(), smoothed);
    }

    let lead = (window - 1) / 2;
    let mut sum: f64 = observed[..window].iter().map(|(_, v)| v).sum();
    // The window ending at observation `last` is centred on `last - lead`.
    for last in (window - 1)..observed.len() {
        if last >= window {
            sum += observed[last].1 - observed[last - window].1;
        }
        let (position, _) = observed[last - lead];
        smoothed[position] = sum / window as f64;
    }
    MonthlySeries::new(series.start(), smoothed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::calendar::YearMonth;

    fn series(values: Vec<f64>) -> MonthlySeries {
        MonthlySeries::new(YearMonth::new(1900, 1).unwrap(), values)
    }

    #[test]
    fn test_even_window_alignment() {
        let out = centered_rolling_mean(&series((0..10).map(|v| v as f64).collect()), 4);
        let v = out.values();
        assert!(v[0].is_nan() && v[1].is_nan());
        assert_eq!(v[2], 1.5);
        assert_eq!(v[8], 7.5);
        assert!(v[9].is_nan());
    }

    #[test]
    fn test_odd_window_alignment() {
        let out = centered_rolling_mean(&series(vec![1.0, 2.0, 3.0, 4.0, 5.0]), 3);
        let v = out.values();
        assert!(v[0].is_nan());
        assert_eq!(&v[1..4], &[2.0, 3.0, 4.0]);
        assert!(v[4].is_nan());
    }

    #[test]
    fn test_missing_months_are_skipped_not_zeroed() {
        let out = centered_rolling_mean(&series(vec![1.0, f64::NAN, 3.0, 5.0]), 3);
        let v = out.values();
        assert!(v[1].is_nan());
        // Observations 1, 3, 5 -> the centre (month index 2) gets their mean.
        assert_eq!(v[2], 3.0);
        assert!(v[0].is_nan() && v[3].is_nan());
    }

    #[test]
    fn test_window_longer_than_record() {
        let out = centered_rolling_mean(&series(vec![1.0, 2.0]), 60);
        assert!(out.values().iter().all(|v| v.is_nan()));
    }
}
