//! Group/reduce aggregation
//!
//! Pure functions over borrowed record slices. Grouping uses an insertion
//! ordered map, so the output order is the order of first occurrence in the
//! input and never depends on hashing.

use crate::error::AggregateError;
use crate::record::Record;
use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::warn;

/// Reduction applied to each partition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reducer {
    /// Number of records in the partition
    Count,
    /// Arithmetic mean of a numeric field
    Mean(String),
    /// Sum of a numeric field
    Sum(String),
}

impl Reducer {
    #[inline]
    #[must_use]
    pub fn mean(field: &str) -> Self {
        Self::Mean(field.to_string())
    }

    #[inline]
    #[must_use]
    pub fn sum(field: &str) -> Self {
        Self::Sum(field.to_string())
    }

    /// Field the reducer reads, if any
    #[inline]
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Count => None,
            Self::Mean(f) | Self::Sum(f) => Some(f),
        }
    }
}

/// One `key -> value` entry of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub key: String,
    pub value: f64,
}

/// Sort applied to a series after aggregation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeriesOrder {
    /// Order of first occurrence in the input
    #[default]
    Insertion,
    ValueDescending,
    ValueAscending,
    KeyAscending,
}

/// Ordered `key -> value` pairs with unique keys
///
/// A series is never edited in place; [`sorted`](Self::sorted) and
/// [`top`](Self::top) return new series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedSeries {
    points: Vec<SeriesPoint>,
}

impl AggregatedSeries {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs, keeping the first value seen for a repeated key
    #[must_use]
    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, f64)>) -> Self {
        let mut map: IndexMap<String, f64> = IndexMap::new();
        for (k, v) in pairs {
            map.entry(k.into()).or_insert(v);
        }
        Self {
            points: map
                .into_iter()
                .map(|(key, value)| SeriesPoint { key, value })
                .collect(),
        }
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeriesPoint> {
        self.points.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.points.iter().map(|p| p.key.as_str())
    }

    /// Value for a key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<f64> {
        self.points.iter().find(|p| p.key == key).map(|p| p.value)
    }

    /// Sum of all values
    #[must_use]
    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.value).sum()
    }

    /// Copy of the series in the requested order
    ///
    /// Ties keep their relative order.
    #[must_use]
    pub fn sorted(&self, order: SeriesOrder) -> Self {
        let mut points = self.points.clone();
        let by_value = |a: &SeriesPoint, b: &SeriesPoint| {
            a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal)
        };
        match order {
            SeriesOrder::Insertion => {}
            SeriesOrder::ValueDescending => points.sort_by(|a, b| by_value(b, a)),
            SeriesOrder::ValueAscending => points.sort_by(by_value),
            SeriesOrder::KeyAscending => points.sort_by(|a, b| a.key.cmp(&b.key)),
        }
        Self { points }
    }

    /// Copy holding the first `n` entries
    #[must_use]
    pub fn top(&self, n: usize) -> Self {
        Self {
            points: self.points.iter().take(n).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AggregatedSeries {
    type Item = &'a SeriesPoint;
    type IntoIter = std::slice::Iter<'a, SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[derive(Default)]
struct Acc {
    count: usize,
    sum: f64,
}

/// Partition `records` by `key_fn` and reduce each partition
///
/// Returns one entry per distinct key in first-occurrence order. An empty input
/// yields an empty series.
///
/// # Errors
/// [`AggregateError::InvalidField`] when a `Mean`/`Sum` field is missing or not
/// numeric for any record.
pub fn group_reduce<R, K>(
    records: &[R],
    key_fn: K,
    reducer: &Reducer,
) -> Result<AggregatedSeries, AggregateError>
where
    R: Record,
    K: Fn(&R) -> String,
{
    let mut groups: IndexMap<String, Acc> = IndexMap::new();

    for record in records {
        let key = key_fn(record);
        let value = match reducer.field() {
            None => 0.0,
            Some(field) => record
                .field(field)
                .and_then(|v| v.as_number())
                .ok_or_else(|| AggregateError::InvalidField {
                    field: field.to_string(),
                    key: key.clone(),
                })?,
        };
        let acc = groups.entry(key).or_default();
        acc.count += 1;
        acc.sum += value;
    }

    let points = groups
        .into_iter()
        .map(|(key, acc)| {
            let value = match reducer {
                Reducer::Count => acc.count as f64,
                Reducer::Sum(_) => acc.sum,
                Reducer::Mean(_) => acc.sum / acc.count as f64,
            };
            SeriesPoint { key, value }
        })
        .collect();

    Ok(AggregatedSeries { points })
}

/// [`group_reduce`] with `InvalidField` turned into an empty series
///
/// A single malformed row must not blank the whole narrative, so the failure is
/// logged as a diagnostic instead of propagated.
pub fn group_reduce_or_empty<R, K>(records: &[R], key_fn: K, reducer: &Reducer) -> AggregatedSeries
where
    R: Record,
    K: Fn(&R) -> String,
{
    match group_reduce(records, key_fn, reducer) {
        Ok(series) => series,
        Err(error) => {
            warn!(%error, kind = %R::KIND, ?reducer, "aggregation failed, using empty series");
            AggregatedSeries::default()
        }
    }
}

/// Records satisfying `predicate`, in their original relative order
pub fn filter<R, P>(records: &[R], predicate: P) -> Vec<R>
where
    R: Clone,
    P: Fn(&R) -> bool,
{
    records.iter().filter(|r| predicate(r)).cloned().collect()
}

/// Key extractor projecting a named field to text
///
/// Records lacking the field group under the empty key.
pub fn by_field<R: Record>(name: &str) -> impl Fn(&R) -> String + '_ {
    move |r: &R| r.field(name).map(|v| v.to_key()).unwrap_or_default()
}

/// Calendar bucket for time series keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateBucket {
    /// `YYYY-MM`
    #[default]
    Month,
    /// `YYYY`
    Year,
}

impl DateBucket {
    /// Bucket key for a date; keys sort chronologically as text
    #[must_use]
    pub fn key(self, date: NaiveDate) -> String {
        match self {
            Self::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Self::Year => format!("{:04}", date.year()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{Listing, Review};
    use pretty_assertions::assert_eq;

    fn listings() -> Vec<Listing> {
        vec![
            Listing::new(1, "X", 100.0),
            Listing::new(2, "X", 200.0),
            Listing::new(3, "Y", 300.0),
        ]
    }

    #[test]
    fn mean_price_by_neighbourhood() {
        let series = group_reduce(
            &listings(),
            |l: &Listing| l.neighbourhood.clone(),
            &Reducer::mean("price"),
        )
        .unwrap();
        assert_eq!(series, AggregatedSeries::from_pairs([("X", 150.0), ("Y", 300.0)]));
    }

    #[test]
    fn count_and_sum() {
        let data = listings();
        let count = group_reduce(&data, by_field::<Listing>("neighbourhood"), &Reducer::Count).unwrap();
        let sum = group_reduce(&data, by_field::<Listing>("neighbourhood"), &Reducer::sum("price")).unwrap();
        assert_eq!(count.get("X"), Some(2.0));
        assert_eq!(sum.get("X"), Some(300.0));
        assert_eq!(count.total(), 3.0);
    }

    #[test]
    fn empty_input_is_empty_series() {
        let series = group_reduce(&Vec::<Listing>::new(), by_field::<Listing>("room_type"), &Reducer::mean("price"))
            .unwrap();
        assert!(series.is_empty());
    }

    #[test]
    fn non_numeric_field_is_invalid() {
        let err = group_reduce(&listings(), by_field::<Listing>("neighbourhood"), &Reducer::mean("room_type"))
            .unwrap_err();
        assert_eq!(
            err,
            AggregateError::InvalidField {
                field: "room_type".into(),
                key: "X".into()
            }
        );
    }

    #[test]
    fn invalid_field_degrades_to_empty_at_boundary() {
        let series =
            group_reduce_or_empty(&listings(), by_field::<Listing>("neighbourhood"), &Reducer::sum("reviews_per_month"));
        assert!(series.is_empty());
    }

    #[test]
    fn filter_preserves_order() {
        let kept = filter(&listings(), |l| l.price >= 200.0);
        let ids: Vec<u64> = kept.iter().map(|l| l.id.0).collect();
        assert_eq!(ids, vec![2, 3]);
        assert!(filter(&listings(), |_| false).is_empty());
    }

    #[test]
    fn series_sorting_returns_new_series() {
        let series = AggregatedSeries::from_pairs([("b", 1.0), ("a", 3.0), ("c", 2.0)]);
        let desc = series.sorted(SeriesOrder::ValueDescending);
        assert_eq!(desc.keys().collect::<Vec<_>>(), vec!["a", "c", "b"]);
        assert_eq!(series.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(
            series.sorted(SeriesOrder::KeyAscending).keys().collect::<Vec<_>>(),
            vec!["a", "b", "c"]
        );
        assert_eq!(desc.top(2).len(), 2);
    }

    #[test]
    fn from_pairs_deduplicates_keys() {
        let series = AggregatedSeries::from_pairs([("a", 1.0), ("a", 9.0)]);
        assert_eq!(series.len(), 1);
        assert_eq!(series.get("a"), Some(1.0));
    }

    #[test]
    fn reviews_bucket_by_month() {
        let d = |m, day| NaiveDate::from_ymd_opt(2019, m, day).unwrap();
        let reviews = vec![Review::new(1, d(1, 3)), Review::new(1, d(1, 20)), Review::new(1, d(3, 1))];
        let series = group_reduce(&reviews, |r: &Review| DateBucket::Month.key(r.date), &Reducer::Count)
            .unwrap();
        assert_eq!(series, AggregatedSeries::from_pairs([("2019-01", 2.0), ("2019-03", 1.0)]));
        assert_eq!(DateBucket::Year.key(d(3, 1)), "2019");
    }
}
