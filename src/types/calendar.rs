//! Calendar primitives shared by every component.
//!
//! [`YearMonth`] is a point on the monthly time axis (one observation per month).
//! [`CalendarMonth`] is the fixed twelve-slot key (January..December) and
//! [`PerMonth`] is a value stored once per calendar month. All per-month
//! statistics in the crate are expressed as `PerMonth<T>`, so every result is
//! exactly twelve entries long by construction.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::ops::Index;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Could not parse '{0}' as a year-month (expected YYYY-MM or YYYY-MM-DD)")]
pub struct ParseYearMonthError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Calendar month must be in 1..=12, got {0}")]
pub struct InvalidCalendarMonth(pub u8);

/// A calendar month of a specific year, e.g. `1961-01`.
///
/// # Examples
///
/// ```
/// use baseline_estimator::YearMonth;
///
/// let ym: YearMonth = "1961-01-01".parse().unwrap();
/// assert_eq!(ym.year(), 1961);
/// assert_eq!(ym.month(), 1);
/// assert_eq!(ym.to_string(), "1961-01");
/// ```
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth(pub(crate) i32, pub(crate) u32);

impl YearMonth {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(year, month))
    }

    pub fn year(self) -> i32 {
        self.0
    }

    pub fn month(self) -> u32 {
        self.1
    }

    pub fn calendar_month(self) -> CalendarMonth {
        CalendarMonth(self.1 as u8)
    }

    /// Months elapsed since year 0, January. Used for offset arithmetic.
    pub(crate) fn ordinal(self) -> i64 {
        self.0 as i64 * 12 + (self.1 as i64 - 1)
    }

    pub(crate) fn from_ordinal(ordinal: i64) -> Self {
        Self(ordinal.div_euclid(12) as i32, ordinal.rem_euclid(12) as u32 + 1)
    }

    /// Shifts by `months` (may be negative).
    pub fn add_months(self, months: i64) -> Self {
        Self::from_ordinal(self.ordinal() + months)
    }

    /// Signed number of months from `self` to `other`.
    pub fn months_until(self, other: YearMonth) -> i64 {
        other.ordinal() - self.ordinal()
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0, self.1)
    }
}

impl From<NaiveDate> for YearMonth {
    fn from(date: NaiveDate) -> Self {
        Self(date.year(), date.month())
    }
}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .or_else(|_| NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d"))
            .map(YearMonth::from)
            .map_err(|_| ParseYearMonthError(s.to_string()))
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ParseYearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

/// One of the twelve calendar months, numbered 1 (January) to 12 (December).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CalendarMonth(u8);

impl CalendarMonth {
    pub const ALL: [CalendarMonth; 12] = [
        CalendarMonth(1),
        CalendarMonth(2),
        CalendarMonth(3),
        CalendarMonth(4),
        CalendarMonth(5),
        CalendarMonth(6),
        CalendarMonth(7),
        CalendarMonth(8),
        CalendarMonth(9),
        CalendarMonth(10),
        CalendarMonth(11),
        CalendarMonth(12),
    ];

    pub fn new(number: u32) -> Option<Self> {
        (1..=12).contains(&number).then_some(Self(number as u8))
    }

    /// 1-based month number.
    pub fn number(self) -> u32 {
        self.0 as u32
    }

    /// 0-based slot in a [`PerMonth`].
    pub fn index(self) -> usize {
        self.0 as usize - 1
    }
}

impl TryFrom<u8> for CalendarMonth {
    type Error = InvalidCalendarMonth;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as u32).ok_or(InvalidCalendarMonth(value))
    }
}

impl From<CalendarMonth> for u8 {
    fn from(value: CalendarMonth) -> Self {
        value.0
    }
}

impl Display for CalendarMonth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// A value per calendar month, always exactly twelve entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerMonth<T>([T; 12]);

impl<T> PerMonth<T> {
    pub fn from_fn(mut f: impl FnMut(CalendarMonth) -> T) -> Self {
        Self(std::array::from_fn(|i| f(CalendarMonth::ALL[i])))
    }

    pub fn from_array(values: [T; 12]) -> Self {
        Self(values)
    }

    pub fn iter(&self) -> impl Iterator<Item = (CalendarMonth, &T)> {
        CalendarMonth::ALL.into_iter().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PerMonth<U> {
        PerMonth::from_fn(|month| f(&self[month]))
    }

    pub fn as_array(&self) -> &[T; 12] {
        &self.0
    }

    pub fn into_array(self) -> [T; 12] {
        self.0
    }
}

impl<T> Index<CalendarMonth> for PerMonth<T> {
    type Output = T;

    fn index(&self, month: CalendarMonth) -> &Self::Output {
        &self.0[month.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_month_formats() {
        assert_eq!("1851-01-01".parse::<YearMonth>(), Ok(YearMonth(1851, 1)));
        assert_eq!("1990-12".parse::<YearMonth>(), Ok(YearMonth(1990, 12)));
        assert!("1990-13".parse::<YearMonth>().is_err());
        assert!("not a date".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_month_arithmetic_crosses_years() {
        let ym = YearMonth(1900, 11);
        assert_eq!(ym.add_months(2), YearMonth(1901, 1));
        assert_eq!(ym.add_months(-11), YearMonth(1899, 12));
        assert_eq!(YearMonth(1961, 1).months_until(YearMonth(1990, 12)), 359);
    }

    #[test]
    fn test_per_month_is_indexed_by_calendar_month() {
        let numbers = PerMonth::from_fn(|m| m.number());
        assert_eq!(numbers[CalendarMonth::ALL[6]], 7);
        assert_eq!(numbers.values().count(), 12);
        let doubled = numbers.map(|n| n * 2);
        assert_eq!(doubled.as_array()[11], 24);
    }

    #[test]
    fn test_year_month_serde_as_string() {
        let json = serde_json::to_string(&YearMonth(1961, 3)).unwrap();
        assert_eq!(json, "\"1961-03\"");
        let back: YearMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, YearMonth(1961, 3));
    }

    #[test]
    fn test_calendar_month_deserialize_rejects_out_of_range() {
        assert!(serde_json::from_str::<CalendarMonth>("0").is_err());
        assert!(serde_json::from_str::<CalendarMonth>("13").is_err());
        let july: CalendarMonth = serde_json::from_str("7").unwrap();
        assert_eq!(july.index(), 6);
        assert_eq!(serde_json::to_string(&july).unwrap(), "7");
        // A table keyed by a bad month must not reach the indexing code.
        assert!(serde_json::from_str::<Vec<CalendarMonth>>("[1, 12, 0]").is_err());
    }
}
