use std::collections::BTreeSet;
use std::io::Write;

use sales_dash::data::aggregate::{count_by, sum_by};
use sales_dash::data::filter::{filter_by_cities, filter_by_date_range, filter_by_month_range};
use sales_dash::data::model::{CategoryField, GroupKey, NumericField};
use sales_dash::data::source::DatasetSource;
use sales_dash::report::{DashboardReport, Panel};
use sales_dash::state::DashboardState;

const FIXTURE: &str = "\
Invoice ID,Branch,City,Customer type,Gender,Product line,Unit price,Quantity,Tax 5%,Total,Date,Time,Payment,cogs,gross margin percentage,gross income,Rating
101,A,Yangon,Member,Female,Health and beauty,74.69,7,26.14,548.97,1/5/2019,13:08,Ewallet,522.83,4.76,26.14,9.1
102,A,Yangon,Normal,Male,Sports and travel,46.33,7,16.22,340.53,1/27/2019,20:33,Cash,324.31,4.76,16.22,7.4
103,B,Mandalay,Normal,Male,Home and lifestyle,58.22,8,23.29,489.05,1/8/2019,10:29,Cash,465.76,4.76,23.29,8.4
104,A,Yangon,Member,Female,Health and beauty,15.28,5,3.82,80.22,2/8/2019,10:37,Ewallet,76.40,4.76,3.82,9.6
";

fn source() -> (tempfile::NamedTempFile, DatasetSource) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FIXTURE.as_bytes()).unwrap();
    let source = DatasetSource::new(file.path());
    (file, source)
}

#[test]
fn yangon_in_january_sums_by_payment() {
    let (_file, source) = source();
    let ds = source.get().unwrap();
    let view = ds.view();

    let january = filter_by_month_range(&view, 1, 1).unwrap();
    let cities: BTreeSet<String> = ["Yangon".to_string()].into_iter().collect();
    let selection = filter_by_cities(&january, &cities);
    let rows = selection.records().unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.city == "Yangon" && r.month == Some(1)));

    let by_payment = sum_by(rows, CategoryField::Payment, NumericField::Total);
    assert_eq!(by_payment.get(&GroupKey::from("Ewallet")), Some(548.97));
    assert_eq!(by_payment.get(&GroupKey::from("Cash")), Some(340.53));
    assert_eq!(by_payment.len(), 2);
}

#[test]
fn full_date_range_round_trips() {
    let (_file, source) = source();
    let ds = source.get().unwrap();
    let view = ds.view();
    let (start, end) = ds.date_bounds.unwrap();

    let all = filter_by_date_range(&view, start, end);
    assert_eq!(all.len(), view.len());
    assert_eq!(
        sum_by(&all, CategoryField::City, NumericField::Total),
        sum_by(&view, CategoryField::City, NumericField::Total)
    );
    assert_eq!(count_by(&all, CategoryField::Branch).get(&GroupKey::from("A")), Some(3.0));
}

#[test]
fn report_follows_selection() {
    let (_file, source) = source();
    let mut state = DashboardState::new(source.get().unwrap());

    state.select_no_cities();
    state.toggle_city("Mandalay");
    let report = DashboardReport::build(&state).unwrap();
    let metrics = report.metrics.ready().unwrap();
    assert_eq!(metrics.total_sales, 489.05);
    assert_eq!(metrics.best_seller, Some((GroupKey::from("Home and lifestyle"), 8.0)));

    state.select_no_cities();
    let report = DashboardReport::build(&state).unwrap();
    assert_eq!(report.product_line_sales, Panel::NoCitySelected);
}
