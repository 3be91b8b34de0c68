//! Group-by helpers over typed records. Keys are kept in a `BTreeMap` so
//! every ranking and aggregate comes out in a stable order.

use crate::data::GameRecord;
use crate::stats::calculator::StatsCalculator;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Records grouped by a string key.
pub fn group_records<'a, K>(
    records: impl IntoIterator<Item = &'a GameRecord>,
    key: K,
) -> BTreeMap<String, Vec<&'a GameRecord>>
where
    K: Fn(&GameRecord) -> String,
{
    let mut groups: BTreeMap<String, Vec<&'a GameRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }
    groups
}

/// Sort `(label, value)` pairs by value descending, then label ascending.
pub fn rank_desc(mut pairs: Vec<(String, f64)>) -> Vec<(String, f64)> {
    pairs.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    pairs
}

/// Sort `(label, value)` pairs by value ascending, then label ascending.
pub fn rank_asc(mut pairs: Vec<(String, f64)>) -> Vec<(String, f64)> {
    pairs.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    pairs
}

/// Reduce every group to one value.
pub fn aggregate_by<'a, K, F>(
    records: impl IntoIterator<Item = &'a GameRecord>,
    key: K,
    reduce: F,
) -> Vec<(String, f64)>
where
    K: Fn(&GameRecord) -> String,
    F: Fn(&[&GameRecord]) -> f64,
{
    group_records(records, key)
        .into_iter()
        .map(|(label, rows)| {
            let value = reduce(&rows);
            (label, value)
        })
        .collect()
}

pub fn total_sales(rows: &[&GameRecord]) -> f64 {
    rows.iter().map(|r| r.global_sales).sum()
}

pub fn mean_sales(rows: &[&GameRecord]) -> f64 {
    let values: Vec<f64> = rows.iter().map(|r| r.global_sales).collect();
    StatsCalculator::mean(&values)
}

pub fn median_sales(rows: &[&GameRecord]) -> f64 {
    let values: Vec<f64> = rows.iter().map(|r| r.global_sales).collect();
    StatsCalculator::median(&values)
}

/// Mean critic score, ignoring rows without one.
pub fn mean_critic(rows: &[&GameRecord]) -> f64 {
    let values: Vec<f64> = rows.iter().filter_map(|r| r.critic_score).collect();
    StatsCalculator::mean(&values)
}

/// Share of successful rows in percent.
pub fn success_rate(rows: &[&GameRecord]) -> f64 {
    if rows.is_empty() {
        return f64::NAN;
    }
    rows.iter().filter(|r| r.is_successful).count() as f64 / rows.len() as f64 * 100.0
}

pub fn count(rows: &[&GameRecord]) -> f64 {
    rows.len() as f64
}

pub fn by_genre(record: &GameRecord) -> String {
    record.genre.clone()
}

pub fn by_publisher(record: &GameRecord) -> String {
    record.publisher.clone()
}

pub fn by_platform(record: &GameRecord) -> String {
    record.platform.clone()
}

pub fn by_year(record: &GameRecord) -> String {
    record.year.to_string()
}

/// The `n` labels with the highest total global sales.
pub fn top_by_total_sales<'a, K>(
    records: impl IntoIterator<Item = &'a GameRecord>,
    key: K,
    n: usize,
) -> Vec<(String, f64)>
where
    K: Fn(&GameRecord) -> String,
{
    let mut ranked = rank_desc(aggregate_by(records, key, total_sales));
    ranked.truncate(n);
    ranked
}

/// The `n` labels with the most records.
pub fn top_by_count<'a, K>(
    records: impl IntoIterator<Item = &'a GameRecord>,
    key: K,
    n: usize,
) -> Vec<(String, f64)>
where
    K: Fn(&GameRecord) -> String,
{
    let mut ranked = rank_desc(aggregate_by(records, key, count));
    ranked.truncate(n);
    ranked
}
