use crate::types::period::Period;
use crate::types::series::MonthlySeries;
use crate::types::station::StationSeries;

/// The donor stations admitted by coverage QC.
///
/// Never empty: [`Ensemble::new`] returns `None` for an empty donor list, so
/// callers have to handle the "no estimate available" case before any
/// ensemble statistics can be computed.
#[derive(Debug, Clone)]
pub struct Ensemble<'a> {
    donors: Vec<&'a StationSeries>,
}

impl<'a> Ensemble<'a> {
    pub fn new(donors: Vec<&'a StationSeries>) -> Option<Self> {
        (!donors.is_empty()).then_some(Self { donors })
    }

    pub fn len(&self) -> usize {
        self.donors.len()
    }

    pub fn is_empty(&self) -> bool {
        // Construction guarantees at least one donor.
        false
    }

    pub fn donors(&self) -> &[&'a StationSeries] {
        &self.donors
    }

    fn members(&self) -> Vec<&'a MonthlySeries> {
        self.donors.iter().map(|d| &d.series).collect()
    }

    /// Per-timestamp donor mean over exactly the months of `period`.
    pub fn mean_over(&self, period: &Period) -> MonthlySeries {
        MonthlySeries::mean_of(&self.members(), period.start(), period.len_months())
    }

    /// Per-timestamp donor mean over the union of all donor records.
    pub fn mean_series(&self) -> MonthlySeries {
        let members = self.members();
        match MonthlySeries::union_span(members.iter().copied()) {
            Some((start, end)) => {
                MonthlySeries::mean_of(&members, start, (start.months_until(end) + 1) as usize)
            }
            None => MonthlySeries::new(self.donors[0].series.start(), Vec::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::calendar::YearMonth;
    use crate::types::station::LatLon;

    fn station(id: &str, start: YearMonth, values: Vec<f64>) -> StationSeries {
        StationSeries::new(id, id, LatLon(0.0, 0.0), MonthlySeries::new(start, values))
    }

    #[test]
    fn test_empty_ensemble_is_rejected() {
        assert!(Ensemble::new(Vec::new()).is_none());
    }

    #[test]
    fn test_means_cover_union_and_period() {
        let a = station("a", YearMonth::new(1900, 1).unwrap(), vec![1.0; 12]);
        let b = station("b", YearMonth::new(1900, 7).unwrap(), vec![3.0; 12]);
        let ensemble = Ensemble::new(vec![&a, &b]).unwrap();
        assert_eq!(ensemble.len(), 2);

        let full = ensemble.mean_series();
        assert_eq!(full.len(), 18);
        assert_eq!(full.values()[0], 1.0);
        assert_eq!(full.values()[6], 2.0);
        assert_eq!(full.values()[17], 3.0);

        let period = Period::parse("1899-12", "1900-01").unwrap();
        let sliced = ensemble.mean_over(&period);
        assert!(sliced.values()[0].is_nan());
        assert_eq!(sliced.values()[1], 1.0);
    }
}
