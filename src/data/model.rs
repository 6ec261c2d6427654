use std::collections::HashSet;
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Field names – the fixed CSV schema
// ---------------------------------------------------------------------------

/// Categorical columns records can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryField {
    City,
    Branch,
    CustomerType,
    ProductLine,
    Payment,
    Date,
    /// Derived from `Date`.
    Year,
    /// Derived from `Date`.
    Month,
}

impl CategoryField {
    /// Column header (or derived field name) as it appears in the source.
    pub fn name(self) -> &'static str {
        match self {
            CategoryField::City => "City",
            CategoryField::Branch => "Branch",
            CategoryField::CustomerType => "Customer type",
            CategoryField::ProductLine => "Product line",
            CategoryField::Payment => "Payment",
            CategoryField::Date => "Date",
            CategoryField::Year => "Year",
            CategoryField::Month => "Month",
        }
    }
}

impl fmt::Display for CategoryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Numeric columns that can be summed, averaged or correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NumericField {
    #[serde(rename = "Unit price")]
    UnitPrice,
    Quantity,
    #[serde(rename = "Tax 5%")]
    Tax,
    Total,
    #[serde(rename = "cogs")]
    Cogs,
    #[serde(rename = "gross income")]
    GrossIncome,
    Rating,
}

impl NumericField {
    /// Every numeric column, in the order the heatmap lays them out.
    pub const ALL: [NumericField; 7] = [
        NumericField::UnitPrice,
        NumericField::Quantity,
        NumericField::Tax,
        NumericField::Total,
        NumericField::Cogs,
        NumericField::GrossIncome,
        NumericField::Rating,
    ];

    pub fn name(self) -> &'static str {
        match self {
            NumericField::UnitPrice => "Unit price",
            NumericField::Quantity => "Quantity",
            NumericField::Tax => "Tax 5%",
            NumericField::Total => "Total",
            NumericField::Cogs => "cogs",
            NumericField::GrossIncome => "gross income",
            NumericField::Rating => "Rating",
        }
    }
}

impl fmt::Display for NumericField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// GroupKey – a single categorical value
// ---------------------------------------------------------------------------

/// The value a record takes for a [`CategoryField`].
///
/// Variants sort text < date < integer; within a variant the natural order
/// applies, so dates and months sort chronologically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum GroupKey {
    Text(String),
    Date(NaiveDate),
    Int(i64),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` so callers can align keys in columns.
        match self {
            GroupKey::Text(s) => f.pad(s),
            GroupKey::Date(d) => f.pad(&d.format("%Y-%m-%d").to_string()),
            GroupKey::Int(i) => f.pad(&i.to_string()),
        }
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Transaction – one row of the CSV
// ---------------------------------------------------------------------------

/// A single sale. `year` and `month` are derived from `date` at load time.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// `None` when the source cell did not parse as `month/day/year`.
    pub date: Option<NaiveDate>,
    pub city: String,
    pub branch: String,
    pub customer_type: String,
    pub product_line: String,
    pub payment: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub tax: f64,
    pub total: f64,
    pub cogs: f64,
    pub gross_income: f64,
    pub rating: f64,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

impl Transaction {
    /// Attach a (possibly missing) date and derive `year`/`month` from it.
    pub fn with_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self.year = date.map(|d| d.year());
        self.month = date.map(|d| d.month());
        self
    }

    /// Value of a categorical field; `None` for date-derived fields when the
    /// date is missing.
    pub fn key(&self, field: CategoryField) -> Option<GroupKey> {
        match field {
            CategoryField::City => Some(GroupKey::Text(self.city.clone())),
            CategoryField::Branch => Some(GroupKey::Text(self.branch.clone())),
            CategoryField::CustomerType => Some(GroupKey::Text(self.customer_type.clone())),
            CategoryField::ProductLine => Some(GroupKey::Text(self.product_line.clone())),
            CategoryField::Payment => Some(GroupKey::Text(self.payment.clone())),
            CategoryField::Date => self.date.map(GroupKey::Date),
            CategoryField::Year => self.year.map(|y| GroupKey::Int(i64::from(y))),
            CategoryField::Month => self.month.map(|m| GroupKey::Int(i64::from(m))),
        }
    }

    pub fn value(&self, field: NumericField) -> f64 {
        match field {
            NumericField::UnitPrice => self.unit_price,
            NumericField::Quantity => self.quantity,
            NumericField::Tax => self.tax,
            NumericField::Total => self.total,
            NumericField::Cogs => self.cogs,
            NumericField::GrossIncome => self.gross_income,
            NumericField::Rating => self.rating,
        }
    }
}

// ---------------------------------------------------------------------------
// SalesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full normalized record set with a few pre-computed bounds.
#[derive(Debug, Clone)]
pub struct SalesDataset {
    /// All records in file order.
    pub records: Vec<Transaction>,
    /// Distinct cities in first-appearance order.
    pub cities: Vec<String>,
    /// Smallest and largest derived month, if any date parsed.
    pub month_bounds: Option<(u32, u32)>,
    /// Earliest and latest parsed date.
    pub date_bounds: Option<(NaiveDate, NaiveDate)>,
}

impl SalesDataset {
    /// Build the dataset indices from the loaded records.
    pub fn from_records(records: Vec<Transaction>) -> Self {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut cities = Vec::new();
        for rec in &records {
            if seen.insert(rec.city.as_str()) {
                cities.push(rec.city.clone());
            }
        }

        let month_bounds = bounds(records.iter().filter_map(|r| r.month));
        let date_bounds = bounds(records.iter().filter_map(|r| r.date));

        SalesDataset {
            records,
            cities,
            month_bounds,
            date_bounds,
        }
    }

    /// Borrowed view over every record, the starting point of each filter chain.
    pub fn view(&self) -> Vec<&Transaction> {
        self.records.iter().collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn bounds<T: Ord + Copy>(values: impl Iterator<Item = T>) -> Option<(T, T)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Build a record with the fields most tests care about.
    pub(crate) fn txn(date: &str, city: &str, product_line: &str, total: f64) -> Transaction {
        Transaction {
            date: None,
            city: city.to_string(),
            branch: "A".to_string(),
            customer_type: "Member".to_string(),
            product_line: product_line.to_string(),
            payment: "Cash".to_string(),
            unit_price: total,
            quantity: 1.0,
            tax: total * 0.05,
            total,
            cogs: total,
            gross_income: total * 0.05,
            rating: 7.0,
            year: None,
            month: None,
        }
        .with_date(NaiveDate::parse_from_str(date, "%m/%d/%Y").ok())
    }

    #[test]
    fn derives_year_and_month_from_date() {
        let t = txn("3/8/2019", "Yangon", "Health and beauty", 10.0);
        assert_eq!(t.year, Some(2019));
        assert_eq!(t.month, Some(3));
        assert_eq!(t.key(CategoryField::Month), Some(GroupKey::Int(3)));
    }

    #[test]
    fn missing_date_has_no_derived_keys() {
        let t = txn("not a date", "Yangon", "Health and beauty", 10.0);
        assert_eq!(t.date, None);
        assert_eq!(t.key(CategoryField::Year), None);
        assert_eq!(t.key(CategoryField::Date), None);
        assert_eq!(t.key(CategoryField::City), Some(GroupKey::from("Yangon")));
    }

    #[test]
    fn dataset_tracks_cities_and_bounds() {
        let ds = SalesDataset::from_records(vec![
            txn("2/1/2019", "Yangon", "A", 1.0),
            txn("1/5/2019", "Mandalay", "A", 1.0),
            txn("bad", "Yangon", "A", 1.0),
            txn("3/30/2019", "Naypyitaw", "A", 1.0),
        ]);
        assert_eq!(ds.cities, vec!["Yangon", "Mandalay", "Naypyitaw"]);
        assert_eq!(ds.month_bounds, Some((1, 3)));
        assert_eq!(
            ds.date_bounds,
            Some((
                NaiveDate::from_ymd_opt(2019, 1, 5).unwrap(),
                NaiveDate::from_ymd_opt(2019, 3, 30).unwrap()
            ))
        );
    }
}
