use crate::types::calendar::{PerMonth, YearMonth};
use crate::types::period::Period;
use crate::types::unit::TemperatureUnit;

/// A contiguous monthly time series starting at `start`, one value per month.
///
/// Missing observations are `NaN`. Lookups outside the stored span also
/// yield `NaN`, which is what lets series with different spans be aligned
/// on a common [`Period`] without special casing.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlySeries {
    start: YearMonth,
    values: Vec<f64>,
}

impl MonthlySeries {
    pub fn new(start: YearMonth, values: Vec<f64>) -> Self {
        Self { start, values }
    }

    pub fn start(&self) -> YearMonth {
        self.start
    }

    /// Last month covered, or `None` for an empty series.
    pub fn end(&self) -> Option<YearMonth> {
        (!self.values.is_empty()).then(|| self.start.add_months(self.values.len() as i64 - 1))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, at: YearMonth) -> f64 {
        let offset = self.start.months_until(at);
        if offset < 0 {
            return f64::NAN;
        }
        self.values.get(offset as usize).copied().unwrap_or(f64::NAN)
    }

    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, f64)> + '_ {
        let start = self.start;
        self.values
            .iter()
            .enumerate()
            .map(move |(offset, value)| (start.add_months(offset as i64), *value))
    }

    pub fn finite_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_finite()).count()
    }

    /// Restricts (or pads with `NaN`) to exactly the months of `period`.
    pub fn slice(&self, period: &Period) -> MonthlySeries {
        MonthlySeries::new(period.start(), period.months().map(|m| self.get(m)).collect())
    }

    pub fn map(&self, f: impl Fn(f64) -> f64) -> MonthlySeries {
        MonthlySeries::new(self.start, self.values.iter().map(|v| f(*v)).collect())
    }

    /// `self - other`, aligned on the timestamps of `self`.
    pub fn difference(&self, other: &MonthlySeries) -> MonthlySeries {
        MonthlySeries::new(self.start, self.iter().map(|(at, v)| v - other.get(at)).collect())
    }

    pub fn convert(&self, from: TemperatureUnit, to: TemperatureUnit) -> MonthlySeries {
        self.map(|v| from.convert(v, to))
    }

    /// The span from the earliest start to the latest end of `members`.
    pub fn union_span<'a>(members: impl IntoIterator<Item = &'a MonthlySeries>) -> Option<(YearMonth, YearMonth)> {
        members
            .into_iter()
            .filter_map(|s| s.end().map(|end| (s.start, end)))
            .reduce(|(a_start, a_end), (b_start, b_end)| (a_start.min(b_start), a_end.max(b_end)))
    }

    /// Per-timestamp mean over `members`, skipping missing values.
    ///
    /// A timestamp at which no member has a finite value is `NaN`.
    pub fn mean_of(members: &[&MonthlySeries], start: YearMonth, len: usize) -> MonthlySeries {
        let values = (0..len as i64)
            .map(|offset| {
                let at = start.add_months(offset);
                let (sum, count) = members
                    .iter()
                    .map(|s| s.get(at))
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
                if count == 0 {
                    f64::NAN
                } else {
                    sum / count as f64
                }
            })
            .collect();
        MonthlySeries::new(start, values)
    }

    /// Repeats a twelve-month cycle over every month of `period`.
    pub fn replicate(cycle: &PerMonth<f64>, period: &Period) -> MonthlySeries {
        MonthlySeries::new(
            period.start(),
            period.months().map(|m| cycle[m.calendar_month()]).collect(),
        )
    }
}
