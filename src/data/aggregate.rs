use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;

use super::model::{CategoryField, GroupKey, NumericField, Transaction};

// ---------------------------------------------------------------------------
// Aggregate – ordered mapping group → scalar
// ---------------------------------------------------------------------------

/// Per-group scalars in first-appearance order of the group in the input.
///
/// Sorted views are produced on demand and never change the natural order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Aggregate<K> {
    entries: Vec<(K, f64)>,
}

impl<K: Clone + Eq + Ord> Aggregate<K> {
    /// Look up a group's value.
    pub fn get(&self, key: &K) -> Option<f64> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in natural (first-appearance) order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Entries ordered by group key (chronological for dates and months).
    pub fn sorted_by_key(&self) -> Vec<(K, f64)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Largest value first; ties keep first-appearance order.
    pub fn sorted_by_value_desc(&self) -> Vec<(K, f64)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| b.1.total_cmp(&a.1));
        out
    }

    /// Smallest value first; ties keep first-appearance order.
    pub fn sorted_by_value_asc(&self) -> Vec<(K, f64)> {
        let mut out = self.entries.clone();
        out.sort_by(|a, b| a.1.total_cmp(&b.1));
        out
    }

    pub fn into_entries(self) -> Vec<(K, f64)> {
        self.entries
    }
}

/// Collect values per group, preserving first-appearance order of groups.
/// Records without a key (missing date) are skipped.
fn grouped_values<K, F>(
    records: &[&Transaction],
    key_of: F,
    value: NumericField,
) -> Vec<(K, Vec<f64>)>
where
    K: Clone + Eq + Hash,
    F: Fn(&Transaction) -> Option<K>,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<f64>)> = Vec::new();

    for &rec in records {
        let Some(key) = key_of(rec) else {
            continue;
        };
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(rec.value(value));
    }
    groups
}

fn reduce<K>(groups: Vec<(K, Vec<f64>)>, f: impl Fn(&[f64]) -> f64) -> Aggregate<K> {
    Aggregate {
        entries: groups.into_iter().map(|(k, vals)| (k, f(&vals))).collect(),
    }
}

fn pair_key(
    a: CategoryField,
    b: CategoryField,
) -> impl Fn(&Transaction) -> Option<(GroupKey, GroupKey)> {
    move |r| Some((r.key(a)?, r.key(b)?))
}

fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

fn arithmetic_mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        sum(values) / values.len() as f64
    }
}

// ---------------------------------------------------------------------------
// Grouped aggregations
// ---------------------------------------------------------------------------

/// Sum of `value` per group.
pub fn sum_by(
    records: &[&Transaction],
    group: CategoryField,
    value: NumericField,
) -> Aggregate<GroupKey> {
    reduce(grouped_values(records, |r| r.key(group), value), sum)
}

/// Mean of `value` per group.
pub fn mean_by(
    records: &[&Transaction],
    group: CategoryField,
    value: NumericField,
) -> Aggregate<GroupKey> {
    reduce(grouped_values(records, |r| r.key(group), value), arithmetic_mean)
}

/// Number of records per group.
pub fn count_by(records: &[&Transaction], group: CategoryField) -> Aggregate<GroupKey> {
    // The value column is irrelevant for counting.
    reduce(
        grouped_values(records, |r| r.key(group), NumericField::Total),
        |vals| vals.len() as f64,
    )
}

/// Sum of `value` per `(a, b)` pair.
pub fn sum_by_pair(
    records: &[&Transaction],
    a: CategoryField,
    b: CategoryField,
    value: NumericField,
) -> Aggregate<(GroupKey, GroupKey)> {
    reduce(grouped_values(records, pair_key(a, b), value), sum)
}

/// Mean of `value` per `(a, b)` pair.
pub fn mean_by_pair(
    records: &[&Transaction],
    a: CategoryField,
    b: CategoryField,
    value: NumericField,
) -> Aggregate<(GroupKey, GroupKey)> {
    reduce(grouped_values(records, pair_key(a, b), value), arithmetic_mean)
}

/// The `n` groups with the largest summed `value`, largest first.
///
/// Ties keep the order in which the groups first appear in `records`.
pub fn top_by(
    records: &[&Transaction],
    group: CategoryField,
    value: NumericField,
    n: usize,
) -> Vec<(GroupKey, f64)> {
    let mut ranked = sum_by(records, group, value).sorted_by_value_desc();
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Scalars
// ---------------------------------------------------------------------------

/// Sum of a numeric field over the whole view.
pub fn total(records: &[&Transaction], field: NumericField) -> f64 {
    records.iter().map(|r| r.value(field)).sum()
}

/// Mean of a numeric field over the whole view; NaN when empty.
pub fn mean(records: &[&Transaction], field: NumericField) -> f64 {
    if records.is_empty() {
        return f64::NAN;
    }
    total(records, field) / records.len() as f64
}

/// `(x, y)` pairs for a scatter plot, in record order.
pub fn points(records: &[&Transaction], x: NumericField, y: NumericField) -> Vec<(f64, f64)> {
    records.iter().map(|r| (r.value(x), r.value(y))).collect()
}

// ---------------------------------------------------------------------------
// Distribution – box plot summary
// ---------------------------------------------------------------------------

/// Five-number summary of a group's values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Distribution {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

impl Distribution {
    /// Summarise `values`; `None` when there are none.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        Some(Distribution {
            count: sorted.len(),
            min: sorted[0],
            q1: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            q3: quantile(&sorted, 0.75),
            max: sorted[sorted.len() - 1],
        })
    }

    /// Interquartile range.
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Distribution of `value` per group, in first-appearance order.
pub fn distribution_by(
    records: &[&Transaction],
    group: CategoryField,
    value: NumericField,
) -> Vec<(GroupKey, Distribution)> {
    grouped_values(records, |r| r.key(group), value)
        .into_iter()
        .filter_map(|(k, vals)| Distribution::from_values(&vals).map(|d| (k, d)))
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Pearson correlation coefficients between numeric fields.
///
/// Cells involving a zero-variance field, or computed from fewer than two
/// records, are NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub fields: Vec<NumericField>,
    /// Row-major, `fields.len()` × `fields.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient for a pair of fields; `None` if either is not in the matrix.
    pub fn get(&self, x: NumericField, y: NumericField) -> Option<f64> {
        let i = self.fields.iter().position(|f| *f == x)?;
        let j = self.fields.iter().position(|f| *f == y)?;
        Some(self.values[i][j])
    }
}

pub fn correlation_matrix(records: &[&Transaction], fields: &[NumericField]) -> CorrelationMatrix {
    let columns: Vec<Vec<f64>> = fields
        .iter()
        .map(|f| records.iter().map(|r| r.value(*f)).collect())
        .collect();
    let stats: Vec<(f64, f64)> = columns.iter().map(|c| centred_moments(c)).collect();

    let n = fields.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                if stats[i].1 > 0.0 { 1.0 } else { f64::NAN }
            } else {
                pearson(&columns[i], &columns[j], stats[i], stats[j])
            };
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        fields: fields.to_vec(),
        values,
    }
}

/// Mean and sum of squared deviations; NaN mean for fewer than two values.
///
/// A constant column has exactly zero spread even when its computed mean is
/// off by an ulp.
fn centred_moments(values: &[f64]) -> (f64, f64) {
    if values.len() < 2 {
        return (f64::NAN, 0.0);
    }
    if values.iter().all(|v| *v == values[0]) {
        return (values[0], 0.0);
    }
    let m = arithmetic_mean(values);
    let ss = values.iter().map(|v| (v - m).powi(2)).sum();
    (m, ss)
}

fn pearson(x: &[f64], y: &[f64], (mx, ssx): (f64, f64), (my, ssy): (f64, f64)) -> f64 {
    if ssx <= 0.0 || ssy <= 0.0 {
        return f64::NAN;
    }
    let cov: f64 = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum();
    (cov / (ssx * ssy).sqrt()).clamp(-1.0, 1.0)
}
