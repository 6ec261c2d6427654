use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::StringRecord;

use super::model::{SalesDataset, Transaction};
use crate::error::DataError;

/// Format of the `Date` column, e.g. `1/5/2019`.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load the sales dataset from a CSV file.
///
/// The header must contain every column of the fixed schema (in any order);
/// additional columns such as `Invoice ID` or `Gender` are ignored.
pub fn load_file(path: &Path) -> Result<SalesDataset> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("opening CSV {}", path.display()))?;
    let dataset = load_reader(file).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} transactions across {} cities from {}",
        dataset.len(),
        dataset.cities.len(),
        path.display()
    );
    Ok(dataset)
}

/// Load the sales dataset from any CSV byte source.
pub fn load_reader<R: Read>(source: R) -> Result<SalesDataset> {
    let mut reader = csv::Reader::from_reader(source);
    let headers = reader.headers().context("reading CSV headers")?.clone();
    let columns = Columns::locate(&headers)?;

    let mut records = Vec::new();
    let mut missing_dates = 0usize;

    for (index, result) in reader.records().enumerate() {
        // The header is line 1, so the n-th record (0-based) sits on line n + 2.
        let row = result.with_context(|| format!("CSV record {}", index + 1))?;
        let line = row.position().map_or(index as u64 + 2, |p| p.line());
        let txn = columns.parse_row(&row, line)?;
        if txn.date.is_none() {
            missing_dates += 1;
        }
        records.push(txn);
    }

    if missing_dates > 0 {
        log::warn!(
            "{missing_dates} rows have an unparseable date and will be excluded from date filters"
        );
    }

    Ok(SalesDataset::from_records(records))
}

/// Parse a `month/day/year` cell. Anything else becomes `None`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

// ---------------------------------------------------------------------------
// Column lookup
// ---------------------------------------------------------------------------

/// Header positions of every required column.
struct Columns {
    date: usize,
    city: usize,
    branch: usize,
    customer_type: usize,
    product_line: usize,
    payment: usize,
    unit_price: usize,
    quantity: usize,
    tax: usize,
    total: usize,
    cogs: usize,
    gross_income: usize,
    rating: usize,
}

impl Columns {
    fn locate(headers: &StringRecord) -> Result<Self, DataError> {
        let find = |name: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or(DataError::MissingColumn(name))
        };

        Ok(Columns {
            date: find("Date")?,
            city: find("City")?,
            branch: find("Branch")?,
            customer_type: find("Customer type")?,
            product_line: find("Product line")?,
            payment: find("Payment")?,
            unit_price: find("Unit price")?,
            quantity: find("Quantity")?,
            tax: find("Tax 5%")?,
            total: find("Total")?,
            cogs: find("cogs")?,
            gross_income: find("gross income")?,
            rating: find("Rating")?,
        })
    }

    fn parse_row(&self, row: &StringRecord, line: u64) -> Result<Transaction, DataError> {
        let text = |idx: usize| row.get(idx).unwrap_or("").trim().to_string();
        let number = |idx: usize, column: &'static str| {
            let raw = row.get(idx).unwrap_or("").trim();
            raw.parse::<f64>().map_err(|_| DataError::InvalidNumber {
                line,
                column,
                value: raw.to_string(),
            })
        };

        let raw_date = row.get(self.date).unwrap_or("");
        let date = parse_date(raw_date);
        if date.is_none() {
            log::debug!("line {line}: date '{raw_date}' coerced to missing");
        }

        let txn = Transaction {
            date: None,
            city: text(self.city),
            branch: text(self.branch),
            customer_type: text(self.customer_type),
            product_line: text(self.product_line),
            payment: text(self.payment),
            unit_price: number(self.unit_price, "Unit price")?,
            quantity: number(self.quantity, "Quantity")?,
            tax: number(self.tax, "Tax 5%")?,
            total: number(self.total, "Total")?,
            cogs: number(self.cogs, "cogs")?,
            gross_income: number(self.gross_income, "gross income")?,
            rating: number(self.rating, "Rating")?,
            year: None,
            month: None,
        };
        Ok(txn.with_date(date))
    }
}
