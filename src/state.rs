use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::data::filter::{CitySelection, FilterCriteria};
use crate::data::model::SalesDataset;
use crate::error::DataError;

/// Month range selected when the dashboard opens.
pub const DEFAULT_MONTH_RANGE: (u32, u32) = (1, 3);

// ---------------------------------------------------------------------------
// Dashboard state
// ---------------------------------------------------------------------------

/// The user's filter selection over a loaded dataset, independent of rendering.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// Loaded once at startup, shared read-only.
    pub dataset: Arc<SalesDataset>,

    /// Inclusive month range for the headline metrics and monthly chart.
    pub month_range: (u32, u32),

    /// Inclusive date range for the daily chart; `None` when no date parsed.
    pub date_range: Option<(NaiveDate, NaiveDate)>,

    /// Selected cities, applied to every panel.
    pub cities: BTreeSet<String>,
}

impl DashboardState {
    /// Start with every city selected, the full date range, and the default
    /// month range clamped to the months present in the data.
    pub fn new(dataset: Arc<SalesDataset>) -> Self {
        let month_range = match dataset.month_bounds {
            Some((lo, hi)) => {
                let min = DEFAULT_MONTH_RANGE.0.clamp(lo, hi);
                let max = DEFAULT_MONTH_RANGE.1.clamp(lo, hi);
                (min, max)
            }
            None => DEFAULT_MONTH_RANGE,
        };
        let date_range = dataset.date_bounds;
        let cities = dataset.cities.iter().cloned().collect();

        Self {
            dataset,
            month_range,
            date_range,
            cities,
        }
    }

    /// Change the month range; rejected unless `1 <= min <= max <= 12`.
    pub fn set_month_range(&mut self, min: u32, max: u32) -> Result<(), DataError> {
        if !(1..=12).contains(&min) || !(1..=12).contains(&max) || min > max {
            return Err(DataError::InvalidMonthRange { min, max });
        }
        self.month_range = (min, max);
        Ok(())
    }

    pub fn set_date_range(&mut self, start: NaiveDate, end: NaiveDate) {
        self.date_range = Some((start, end));
    }

    /// Toggle a single city in the selection.
    pub fn toggle_city(&mut self, city: &str) {
        if !self.cities.remove(city) {
            self.cities.insert(city.to_string());
        }
    }

    /// Select every city present in the dataset.
    pub fn select_all_cities(&mut self) {
        self.cities = self.dataset.cities.iter().cloned().collect();
    }

    /// Deselect all cities.
    pub fn select_no_cities(&mut self) {
        self.cities.clear();
    }

    fn city_criteria(&self) -> FilterCriteria {
        FilterCriteria::default().cities(self.cities.clone())
    }

    /// Records in the month range and selected cities.
    pub fn month_view(&self) -> Result<CitySelection<'_>, DataError> {
        let (min, max) = self.month_range;
        self.city_criteria()
            .months(min, max)
            .apply(&self.dataset.view())
    }

    /// Records in the date range and selected cities.
    pub fn date_view(&self) -> Result<CitySelection<'_>, DataError> {
        let mut criteria = self.city_criteria();
        if let Some((start, end)) = self.date_range {
            criteria = criteria.dates(start, end);
        }
        criteria.apply(&self.dataset.view())
    }

    /// Records in the selected cities, all dates.
    pub fn city_view(&self) -> CitySelection<'_> {
        crate::data::filter::filter_by_cities(&self.dataset.view(), &self.cities)
    }
}
