use crate::types::calendar::{ParseYearMonthError, YearMonth};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PeriodError {
    #[error("Invalid period: start {start} must be before end {end}")]
    Inverted { start: YearMonth, end: YearMonth },

    #[error(transparent)]
    InvalidDate(#[from] ParseYearMonthError),
}

/// A closed range of months, `start..=end`.
///
/// Two instances drive a run: the *segment* period (historical overlap between
/// target and donors) and the *normal* period (the reference climatology window).
/// A `Period` can only be built with `start < end`, so holding one is proof that
/// the bounds were validated.
///
/// # Examples
///
/// ```
/// use baseline_estimator::Period;
///
/// let normal = Period::parse("1961-01-01", "1990-12-01").unwrap();
/// assert_eq!(normal, Period::CANONICAL_NORMAL);
/// assert_eq!(normal.len_months(), 360);
/// assert_eq!(normal.years(), 30);
///
/// assert!(Period::parse("1990-12", "1961-01").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds", into = "PeriodBounds")]
pub struct Period {
    start: YearMonth,
    end: YearMonth,
}

/// Unvalidated serde form of a [`Period`].
#[doc(hidden)]
#[derive(Serialize, Deserialize)]
pub struct PeriodBounds {
    pub start: YearMonth,
    pub end: YearMonth,
}

impl Period {
    /// The historical overlap window, 1851-01 to 1900-12.
    pub const CANONICAL_SEGMENT: Period = Period {
        start: YearMonth(1851, 1),
        end: YearMonth(1900, 12),
    };

    /// The 1961-1990 climatological normal window.
    pub const CANONICAL_NORMAL: Period = Period {
        start: YearMonth(1961, 1),
        end: YearMonth(1990, 12),
    };

    pub fn new(start: YearMonth, end: YearMonth) -> Result<Self, PeriodError> {
        if start >= end {
            return Err(PeriodError::Inverted { start, end });
        }
        Ok(Self { start, end })
    }

    /// Parses both bounds from `YYYY-MM` or `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> Result<Self, PeriodError> {
        let start = start.parse::<YearMonth>()?;
        let end = end.parse::<YearMonth>()?;
        Self::new(start, end)
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    pub fn end(&self) -> YearMonth {
        self.end
    }

    pub fn len_months(&self) -> usize {
        (self.start.months_until(self.end) + 1) as usize
    }

    /// Number of (possibly partial) years the period touches month-wise.
    pub fn years(&self) -> usize {
        self.len_months().div_ceil(12)
    }

    pub fn contains(&self, at: YearMonth) -> bool {
        self.start <= at && at <= self.end
    }

    pub fn months(&self) -> impl Iterator<Item = YearMonth> {
        let start = self.start;
        (0..self.len_months() as i64).map(move |offset| start.add_months(offset))
    }
}

impl Display for Period {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

impl TryFrom<PeriodBounds> for Period {
    type Error = PeriodError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Period::new(bounds.start, bounds.end)
    }
}

impl From<Period> for PeriodBounds {
    fn from(period: Period) -> Self {
        PeriodBounds {
            start: period.start,
            end: period.end,
        }
    }
}
