use std::fmt;

use serde::Serialize;

use crate::data::aggregate::{self, CorrelationMatrix, Distribution};
use crate::data::filter::CitySelection;
use crate::data::model::{CategoryField, GroupKey, NumericField, Transaction};
use crate::error::DataError;
use crate::state::DashboardState;

// ---------------------------------------------------------------------------
// Panel – one chart's input, or the empty-selection state
// ---------------------------------------------------------------------------

/// What a chart receives: its data, or the "no cities selected" state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    NoCitySelected,
    Ready(T),
}

impl<T> Panel<T> {
    fn from_selection(
        selection: &CitySelection<'_>,
        build: impl FnOnce(&[&Transaction]) -> T,
    ) -> Self {
        match selection.records() {
            Some(view) => Panel::Ready(build(view)),
            None => Panel::NoCitySelected,
        }
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Panel::Ready(data) => Some(data),
            Panel::NoCitySelected => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Report contents
// ---------------------------------------------------------------------------

/// Headline figures over the month-range view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeadlineMetrics {
    pub total_sales: f64,
    /// NaN when the view is empty.
    pub mean_rating: f64,
    /// Product line with the most units sold, with its quantity.
    pub best_seller: Option<(GroupKey, f64)>,
}

pub type Series = Vec<(GroupKey, f64)>;

/// Inputs for every chart on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardReport {
    pub metrics: Panel<HeadlineMetrics>,
    /// Total per day within the date range, chronological.
    pub daily_sales: Panel<Series>,
    /// Total per month within the month range, chronological.
    pub monthly_sales: Panel<Series>,
    /// Total per product line, smallest first.
    pub product_line_sales: Panel<Series>,
    pub rating_by_city: Panel<Vec<(GroupKey, Distribution)>>,
    pub customer_type_sales: Panel<Series>,
    /// `(cogs, gross income)` per transaction.
    pub cogs_vs_gross_income: Panel<Vec<(f64, f64)>>,
    pub payment_counts: Panel<Series>,
    pub correlation: Panel<CorrelationMatrix>,
    /// Mean gross income per branch and product line.
    pub branch_product_line: Panel<Vec<((GroupKey, GroupKey), f64)>>,
}

impl DashboardReport {
    /// Compute every panel from the current selection.
    pub fn build(state: &DashboardState) -> Result<Self, DataError> {
        let by_month = state.month_view()?;
        let by_date = state.date_view()?;
        let by_city = state.city_view();

        if by_city.is_none_selected() {
            log::warn!("no cities selected; every panel is empty");
        }

        Ok(DashboardReport {
            metrics: Panel::from_selection(&by_month, |view| HeadlineMetrics {
                total_sales: aggregate::total(view, NumericField::Total),
                mean_rating: aggregate::mean(view, NumericField::Rating),
                best_seller: aggregate::top_by(
                    view,
                    CategoryField::ProductLine,
                    NumericField::Quantity,
                    1,
                )
                .into_iter()
                .next(),
            }),
            daily_sales: Panel::from_selection(&by_date, |view| {
                aggregate::sum_by(view, CategoryField::Date, NumericField::Total).sorted_by_key()
            }),
            monthly_sales: Panel::from_selection(&by_month, |view| {
                aggregate::sum_by(view, CategoryField::Month, NumericField::Total).sorted_by_key()
            }),
            product_line_sales: Panel::from_selection(&by_city, |view| {
                aggregate::sum_by(view, CategoryField::ProductLine, NumericField::Total)
                    .sorted_by_value_asc()
            }),
            rating_by_city: Panel::from_selection(&by_city, |view| {
                aggregate::distribution_by(view, CategoryField::City, NumericField::Rating)
            }),
            customer_type_sales: Panel::from_selection(&by_city, |view| {
                aggregate::sum_by(view, CategoryField::CustomerType, NumericField::Total)
                    .sorted_by_key()
            }),
            cogs_vs_gross_income: Panel::from_selection(&by_city, |view| {
                aggregate::points(view, NumericField::Cogs, NumericField::GrossIncome)
            }),
            payment_counts: Panel::from_selection(&by_city, |view| {
                aggregate::count_by(view, CategoryField::Payment).sorted_by_key()
            }),
            correlation: Panel::from_selection(&by_city, |view| {
                aggregate::correlation_matrix(view, &NumericField::ALL)
            }),
            branch_product_line: Panel::from_selection(&by_city, |view| {
                aggregate::mean_by_pair(
                    view,
                    CategoryField::Branch,
                    CategoryField::ProductLine,
                    NumericField::GrossIncome,
                )
                .sorted_by_key()
            }),
        })
    }
}

// ---------------------------------------------------------------------------
// Plain-text rendering
// ---------------------------------------------------------------------------

const NO_CITY: &str = "  Select at least one city.";

fn write_panel<T>(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    panel: &Panel<T>,
    body: impl FnOnce(&mut fmt::Formatter<'_>, &T) -> fmt::Result,
) -> fmt::Result {
    writeln!(f, "== {title} ==")?;
    match panel {
        Panel::NoCitySelected => writeln!(f, "{NO_CITY}")?,
        Panel::Ready(data) => body(f, data)?,
    }
    writeln!(f)
}

fn write_series(f: &mut fmt::Formatter<'_>, series: &Series) -> fmt::Result {
    if series.is_empty() {
        return writeln!(f, "  (no data)");
    }
    for (k, v) in series {
        writeln!(f, "  {k:<24} {v:>12.2}")?;
    }
    Ok(())
}

impl fmt::Display for DashboardReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_panel(f, "Headline metrics", &self.metrics, |f, m| {
            writeln!(f, "  Total sales      {:.0}", m.total_sales)?;
            writeln!(f, "  Average rating   {:.1}", m.mean_rating)?;
            match &m.best_seller {
                Some((line, qty)) => writeln!(f, "  Best seller      {line} with {qty:.0} units"),
                None => writeln!(f, "  Best seller      -"),
            }
        })?;
        write_panel(f, "Daily sales", &self.daily_sales, write_series)?;
        write_panel(f, "Monthly sales", &self.monthly_sales, write_series)?;
        write_panel(f, "Sales by product line", &self.product_line_sales, write_series)?;
        write_panel(f, "Rating by city", &self.rating_by_city, |f, rows| {
            for (city, d) in rows {
                writeln!(
                    f,
                    "  {city:<24} min {:.1}  q1 {:.1}  median {:.1}  q3 {:.1}  max {:.1}  (n={})",
                    d.min, d.q1, d.median, d.q3, d.max, d.count
                )?;
            }
            Ok(())
        })?;
        write_panel(f, "Sales by customer type", &self.customer_type_sales, write_series)?;
        write_panel(f, "cogs vs gross income", &self.cogs_vs_gross_income, |f, points| {
            writeln!(f, "  {} points", points.len())
        })?;
        write_panel(f, "Transactions by payment method", &self.payment_counts, write_series)?;
        write_panel(f, "Correlation", &self.correlation, |f, m| {
            write!(f, "  {:<14}", "")?;
            for field in &m.fields {
                write!(f, "{:>14}", field.name())?;
            }
            writeln!(f)?;
            for (field, row) in m.fields.iter().zip(&m.values) {
                write!(f, "  {:<14}", field.name())?;
                for v in row {
                    write!(f, "{v:>14.2}")?;
                }
                writeln!(f)?;
            }
            Ok(())
        })?;
        write_panel(
            f,
            "Gross income by branch and product line",
            &self.branch_product_line,
            |f, rows| {
                for ((branch, line), v) in rows {
                    writeln!(f, "  {branch:<4} {line:<24} {v:>10.2}")?;
                }
                Ok(())
            },
        )
    }
}
