use crate::types::calendar::{CalendarMonth, PerMonth};
use serde::{Deserialize, Serialize};

/// Mean, standard error and finite sample count for one calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalEntry {
    pub mean: f64,
    pub standard_error: f64,
    pub count: usize,
}

impl NormalEntry {
    pub const MISSING: NormalEntry = NormalEntry {
        mean: f64::NAN,
        standard_error: f64::NAN,
        count: 0,
    };

    /// `false` when the month has no estimate (its mean is `NaN`).
    pub fn is_estimated(&self) -> bool {
        self.mean.is_finite()
    }
}

/// Twelve monthly climatological normals, one per calendar month.
///
/// Entries for months without data hold `NaN`, the length never changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyNormal(PerMonth<NormalEntry>);

impl MonthlyNormal {
    pub fn new(entries: PerMonth<NormalEntry>) -> Self {
        Self(entries)
    }

    pub fn entry(&self, month: CalendarMonth) -> NormalEntry {
        self.0[month]
    }

    pub fn entries(&self) -> &PerMonth<NormalEntry> {
        &self.0
    }

    pub fn means(&self) -> PerMonth<f64> {
        self.0.map(|e| e.mean)
    }

    pub fn standard_errors(&self) -> PerMonth<f64> {
        self.0.map(|e| e.standard_error)
    }

    pub fn counts(&self) -> PerMonth<usize> {
        self.0.map(|e| e.count)
    }
}

/// Accuracy of one estimate against the withheld truth.
///
/// All three metrics are plain means over the twelve months, months
/// without a value are skipped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    pub station_id: String,
    /// Mean of (estimated normal - true normal).
    pub error_normal: f64,
    /// Mean of (propagated SE - true SE).
    pub error_standard_error: f64,
    /// Mean of the target-minus-ensemble difference series SE.
    pub mean_difference_standard_error: f64,
}
