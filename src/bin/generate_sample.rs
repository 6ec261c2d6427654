use anyhow::{Context, Result};
use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

/// One output row, headers matching the sales schema.
#[derive(Serialize)]
struct Row<'a> {
    #[serde(rename = "Invoice ID")]
    invoice_id: String,
    #[serde(rename = "Branch")]
    branch: &'a str,
    #[serde(rename = "City")]
    city: &'a str,
    #[serde(rename = "Customer type")]
    customer_type: &'a str,
    #[serde(rename = "Product line")]
    product_line: &'a str,
    #[serde(rename = "Unit price")]
    unit_price: f64,
    #[serde(rename = "Quantity")]
    quantity: u32,
    #[serde(rename = "Tax 5%")]
    tax: f64,
    #[serde(rename = "Total")]
    total: f64,
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Payment")]
    payment: &'a str,
    cogs: f64,
    #[serde(rename = "gross income")]
    gross_income: f64,
    #[serde(rename = "Rating")]
    rating: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[(self.next_u64() % items.len() as u64) as usize]
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let branches = [("A", "Yangon"), ("B", "Mandalay"), ("C", "Naypyitaw")];
    let customer_types = ["Member", "Normal"];
    let product_lines = [
        "Health and beauty",
        "Electronic accessories",
        "Home and lifestyle",
        "Sports and travel",
        "Food and beverages",
        "Fashion accessories",
    ];
    let payments = ["Ewallet", "Cash", "Credit card"];

    let first_day = NaiveDate::from_ymd_opt(2019, 1, 1).context("invalid start date")?;
    let n_rows = 1000;

    let output_path = std::env::args().nth(1).unwrap_or_else(|| "data.csv".to_string());
    let mut writer = csv::Writer::from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    for i in 0..n_rows {
        let (branch, city) = *rng.pick(&branches);
        let unit_price = round2(rng.uniform(10.0, 100.0));
        let quantity = 1 + (rng.next_u64() % 10) as u32;
        let cogs = round2(unit_price * f64::from(quantity));
        let tax = round2(cogs * 0.05);
        let date = first_day + Duration::days((rng.next_u64() % 90) as i64);

        writer.serialize(Row {
            invoice_id: format!("{:03}-{:02}-{:04}", i % 1000, (i * 7) % 100, i),
            branch,
            city,
            customer_type: *rng.pick(&customer_types),
            product_line: *rng.pick(&product_lines),
            unit_price,
            quantity,
            tax,
            total: round2(cogs + tax),
            date: format!("{}/{}/{}", date.month(), date.day(), date.year()),
            payment: *rng.pick(&payments),
            cogs,
            gross_income: tax,
            rating: (rng.uniform(4.0, 10.0) * 10.0).round() / 10.0,
        })?;
    }
    writer.flush()?;

    println!("Wrote {n_rows} transactions to {output_path}");
    Ok(())
}
