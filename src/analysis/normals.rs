//! Estimation of a target station's monthly normals from a donor ensemble.
//!
//! For each calendar month the estimate is the ensemble's normal-period mean
//! plus the mean target-minus-ensemble offset observed in the segment period:
//!
//! ```text
//! x1r = x2r + x12
//! SE1r = sqrt(SE2r^2 + SE12^2)
//! ```
//!
//! Months without samples in either component produce `NaN`. Minimum sample
//! sizes are enforced upstream by coverage QC, not here.

use crate::analysis::monthly_stats::monthly_stats;
use crate::types::calendar::PerMonth;
use crate::types::normal::{MonthlyNormal, NormalEntry};
use crate::types::series::MonthlySeries;
use serde::{Deserialize, Serialize};

/// Result of [`estimate_normals`], aligned by calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalEstimate {
    /// Estimated normal (`x1r`), propagated SE (`SE1r`) and overlap count (`n12`).
    pub normal: MonthlyNormal,
    /// Standard error of the segment-period difference series (`SE12`).
    pub difference_standard_errors: PerMonth<f64>,
}

impl NormalEstimate {
    pub fn means(&self) -> PerMonth<f64> {
        self.normal.means()
    }

    pub fn standard_errors(&self) -> PerMonth<f64> {
        self.normal.standard_errors()
    }

    pub fn overlap_counts(&self) -> PerMonth<usize> {
        self.normal.counts()
    }
}

/// Estimates the target's normals.
///
/// * `a1` - target station, segment period.
/// * `a2` - ensemble mean, segment period, index-aligned with `a1`.
/// * `r2` - ensemble mean, normal period.
pub fn estimate_normals(a1: &MonthlySeries, a2: &MonthlySeries, r2: &MonthlySeries) -> NormalEstimate {
    let reference = monthly_stats(r2);
    let offsets = monthly_stats(&a1.difference(a2));

    let entries = PerMonth::from_fn(|month| {
        let r = reference[month];
        let d = offsets[month];
        NormalEntry {
            mean: r.mean + d.mean,
            standard_error: (r.standard_error().powi(2) + d.standard_error().powi(2)).sqrt(),
            count: d.count,
        }
    });

    NormalEstimate {
        normal: MonthlyNormal::new(entries),
        difference_standard_errors: offsets.map(|d| d.standard_error()),
    }
}
