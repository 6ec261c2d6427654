use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::Transaction;
use crate::error::DataError;

// ---------------------------------------------------------------------------
// City selection result
// ---------------------------------------------------------------------------

/// Outcome of filtering by city.
///
/// An empty selection is its own variant so callers can show a
/// "select at least one city" state instead of an empty chart.
#[derive(Debug, Clone, PartialEq)]
pub enum CitySelection<'a> {
    NoneSelected,
    Selected(Vec<&'a Transaction>),
}

impl<'a> CitySelection<'a> {
    /// The filtered view, or `None` when no city was selected.
    pub fn records(&self) -> Option<&[&'a Transaction]> {
        match self {
            CitySelection::NoneSelected => None,
            CitySelection::Selected(view) => Some(view.as_slice()),
        }
    }

    pub fn is_none_selected(&self) -> bool {
        matches!(self, CitySelection::NoneSelected)
    }
}

// ---------------------------------------------------------------------------
// Single predicates
// ---------------------------------------------------------------------------

/// Keep records whose derived month lies in `[min, max]`.
///
/// Bounds outside `1..=12` or `min > max` are rejected. Records with a missing
/// date have no month and are dropped.
pub fn filter_by_month_range<'a>(
    records: &[&'a Transaction],
    min: u32,
    max: u32,
) -> Result<Vec<&'a Transaction>, DataError> {
    if !(1..=12).contains(&min) || !(1..=12).contains(&max) || min > max {
        return Err(DataError::InvalidMonthRange { min, max });
    }
    Ok(records
        .iter()
        .copied()
        .filter(|r| r.month.is_some_and(|m| (min..=max).contains(&m)))
        .collect())
}

/// Keep records dated within `[start, end]`. Missing dates are excluded.
pub fn filter_by_date_range<'a>(
    records: &[&'a Transaction],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<&'a Transaction> {
    records
        .iter()
        .copied()
        .filter(|r| r.date.is_some_and(|d| d >= start && d <= end))
        .collect()
}

/// Keep records whose city is in `cities`.
pub fn filter_by_cities<'a>(
    records: &[&'a Transaction],
    cities: &BTreeSet<String>,
) -> CitySelection<'a> {
    if cities.is_empty() {
        log::debug!("city filter applied with an empty selection");
        return CitySelection::NoneSelected;
    }
    CitySelection::Selected(
        records
            .iter()
            .copied()
            .filter(|r| cities.contains(&r.city))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Combined criteria
// ---------------------------------------------------------------------------

/// The three predicates combined by AND. `None` means "not filtered".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    pub months: Option<(u32, u32)>,
    pub dates: Option<(NaiveDate, NaiveDate)>,
    pub cities: Option<BTreeSet<String>>,
}

impl FilterCriteria {
    pub fn months(mut self, min: u32, max: u32) -> Self {
        self.months = Some((min, max));
        self
    }

    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.dates = Some((start, end));
        self
    }

    pub fn cities(mut self, cities: BTreeSet<String>) -> Self {
        self.cities = Some(cities);
        self
    }

    /// Run every active predicate over `records`.
    ///
    /// An empty city set yields [`CitySelection::NoneSelected`] regardless of
    /// the other predicates.
    pub fn apply<'a>(&self, records: &[&'a Transaction]) -> Result<CitySelection<'a>, DataError> {
        let mut view = match self.months {
            Some((min, max)) => filter_by_month_range(records, min, max)?,
            None => records.to_vec(),
        };
        if let Some((start, end)) = self.dates {
            view = filter_by_date_range(&view, start, end);
        }
        Ok(match &self.cities {
            Some(cities) => filter_by_cities(&view, cities),
            None => CitySelection::Selected(view),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::txn;

    fn fixture() -> Vec<Transaction> {
        vec![
            txn("1/5/2019", "Yangon", "Sports", 10.0),
            txn("1/20/2019", "Mandalay", "Sports", 20.0),
            txn("2/3/2019", "Yangon", "Food", 30.0),
            txn("3/15/2019", "Naypyitaw", "Food", 40.0),
            txn("garbage", "Yangon", "Food", 50.0),
        ]
    }

    fn set(cities: &[&str]) -> BTreeSet<String> {
        cities.iter().map(|c| c.to_string()).collect()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%m/%d/%Y").unwrap()
    }

    #[test]
    fn month_range_is_inclusive() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let out = filter_by_month_range(&view, 1, 2).unwrap();
        let totals: Vec<f64> = out.iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn narrowing_month_range_never_grows_result() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let mut previous = usize::MAX;
        for max in (1..=12).rev() {
            let n = filter_by_month_range(&view, 1, max).unwrap().len();
            assert!(n <= previous);
            previous = n;
        }
        for min in 1..=12 {
            let out = filter_by_month_range(&view, min, 12).unwrap();
            assert!(out.iter().all(|r| r.month.unwrap() >= min));
        }
    }

    #[test]
    fn invalid_month_range_is_rejected() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        assert_eq!(
            filter_by_month_range(&view, 3, 1),
            Err(DataError::InvalidMonthRange { min: 3, max: 1 })
        );
        assert!(filter_by_month_range(&view, 0, 4).is_err());
        assert!(filter_by_month_range(&view, 1, 13).is_err());
    }

    #[test]
    fn date_range_excludes_missing_dates() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let out = filter_by_date_range(&view, date("1/1/2019"), date("12/31/2019"));
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|r| r.date.is_some()));

        let out = filter_by_date_range(&view, date("1/20/2019"), date("2/3/2019"));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn reversed_date_range_is_empty() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        assert!(filter_by_date_range(&view, date("3/1/2019"), date("1/1/2019")).is_empty());
    }

    #[test]
    fn empty_city_set_is_distinct_from_full_set() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();

        let none = filter_by_cities(&view, &BTreeSet::new());
        assert!(none.is_none_selected());
        assert_eq!(none.records(), None);

        let all = filter_by_cities(&view, &set(&["Yangon", "Mandalay", "Naypyitaw"]));
        assert_eq!(all.records().map(|r| r.len()), Some(data.len()));
    }

    #[test]
    fn unknown_city_yields_empty_selection_not_marker() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let out = filter_by_cities(&view, &set(&["Bago"]));
        assert_eq!(out, CitySelection::Selected(Vec::new()));
    }

    #[test]
    fn criteria_combine_with_and() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let criteria = FilterCriteria::default()
            .months(1, 2)
            .cities(set(&["Yangon"]));
        let out = criteria.apply(&view).unwrap();
        let totals: Vec<f64> = out.records().unwrap().iter().map(|r| r.total).collect();
        assert_eq!(totals, vec![10.0, 30.0]);
    }

    #[test]
    fn no_criteria_keeps_everything() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let out = FilterCriteria::default().apply(&view).unwrap();
        assert_eq!(out.records().unwrap().len(), data.len());
    }

    #[test]
    fn filtering_leaves_input_untouched() {
        let data = fixture();
        let view: Vec<_> = data.iter().collect();
        let _ = filter_by_month_range(&view, 2, 2).unwrap();
        assert_eq!(view.len(), 5);
        assert_eq!(data, fixture());
    }
}
