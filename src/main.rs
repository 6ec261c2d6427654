use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Parser;

use sales_dash::data::loader;
use sales_dash::data::source::DatasetSource;
use sales_dash::report::DashboardReport;
use sales_dash::state::DashboardState;

/// Print the sales dashboard for a transaction CSV.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Sales CSV to load.
    #[arg(long, default_value = "data.csv")]
    data: PathBuf,

    /// Month range for the headline metrics and monthly chart, e.g. `1-3`.
    #[arg(long, value_parser = parse_month_range)]
    months: Option<(u32, u32)>,

    /// First day of the daily chart (month/day/year).
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Last day of the daily chart (month/day/year).
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Restrict to these cities (repeatable). Defaults to every city.
    #[arg(long = "city", conflicts_with = "no_cities")]
    cities: Vec<String>,

    /// Deselect every city.
    #[arg(long)]
    no_cities: bool,

    /// Emit the report as JSON instead of text.
    #[arg(long)]
    json: bool,
}

fn parse_month_range(s: &str) -> Result<(u32, u32), String> {
    let (lo, hi) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{s}'"))?;
    let lo = lo.trim().parse().map_err(|_| format!("'{lo}' is not a month"))?;
    let hi = hi.trim().parse().map_err(|_| format!("'{hi}' is not a month"))?;
    Ok((lo, hi))
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    loader::parse_date(s).ok_or_else(|| format!("'{s}' is not a month/day/year date"))
}

/// Merge `--from`/`--to` with the data's own date bounds.
///
/// `None` leaves the state's range untouched. A missing flag falls back to the
/// matching bound, which only exists when at least one date parsed.
fn resolve_date_range(
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    bounds: Option<(NaiveDate, NaiveDate)>,
) -> Result<Option<(NaiveDate, NaiveDate)>> {
    Ok(match (from, to, bounds) {
        (None, None, _) => None,
        (from, to, Some((start, end))) => Some((from.unwrap_or(start), to.unwrap_or(end))),
        (Some(from), Some(to), None) => Some((from, to)),
        (_, _, None) => {
            bail!("--from and --to must both be given when the data has no valid dates")
        }
    })
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let source = DatasetSource::new(&cli.data);
    let dataset = source.get()?;
    let mut state = DashboardState::new(dataset);

    if let Some((min, max)) = cli.months {
        state.set_month_range(min, max).context("--months")?;
    }

    if let Some((start, end)) = resolve_date_range(cli.from, cli.to, state.date_range)? {
        state.set_date_range(start, end);
    }

    if cli.no_cities {
        state.select_no_cities();
    } else if !cli.cities.is_empty() {
        state.select_no_cities();
        for city in &cli.cities {
            if !state.dataset.cities.contains(city) {
                log::warn!("city '{city}' does not appear in {}", source.path().display());
            }
            state.cities.insert(city.clone());
        }
    }

    let report = DashboardReport::build(&state)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}
