//! Time-bucketed series types for charting

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of buckets every resolved series carries
pub const SERIES_LEN: usize = 12;

/// Label format for a monthly bucket (e.g. "Jan 2024")
pub const PERIOD_LABEL_FORMAT: &str = "%b %Y";

/// One bucket of resolved data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Display label of the bucket; selection matches on this exact string
    pub time_period: String,
    /// First day covered by the bucket
    pub period_start: NaiveDate,
    /// One value per resolved y-variable
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl SeriesPoint {
    pub fn new(period_start: NaiveDate) -> Self {
        Self {
            time_period: period_label(period_start),
            period_start,
            values: BTreeMap::new(),
        }
    }

    pub fn with_value(mut self, var: impl Into<String>, value: f64) -> Self {
        self.values.insert(var.into(), value);
        self
    }

    pub fn value(&self, var: &str) -> Option<f64> {
        self.values.get(var).copied()
    }

    /// Variable keys carried by this point
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

/// Display label for the bucket starting at `date`
pub fn period_label(date: NaiveDate) -> String {
    date.format(PERIOD_LABEL_FORMAT).to_string()
}

/// Ordered series, oldest bucket first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Series {
    pub points: Vec<SeriesPoint>,
}

impl Series {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SeriesPoint> {
        self.points.iter()
    }

    pub fn first(&self) -> Option<&SeriesPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }

    /// Bucket labels in order
    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.time_period.as_str()).collect()
    }

    /// Values of one variable in order (missing buckets are skipped)
    pub fn values_of(&self, var: &str) -> Vec<f64> {
        self.points.iter().filter_map(|p| p.value(var)).collect()
    }

    /// Variable keys plotted by this series (taken from the first bucket)
    pub fn data_keys(&self) -> Vec<&str> {
        self.points.first().map_or_else(Vec::new, |p| p.keys().collect())
    }

    /// Value range of one variable (min, max)
    pub fn value_range(&self, var: &str) -> Option<(f64, f64)> {
        let mut values = self.points.iter().filter_map(|p| p.value(var));
        let first = values.next()?;

        let (min, max) = values.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
        Some((min, max))
    }

    /// True when buckets are in strictly increasing chronological order
    pub fn is_chronological(&self) -> bool {
        self.points
            .windows(2)
            .all(|w| w[0].period_start < w[1].period_start)
    }

    pub fn find(&self, time_period: &str) -> Option<&SeriesPoint> {
        self.points.iter().find(|p| p.time_period == time_period)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a SeriesPoint;
    type IntoIter = std::slice::Iter<'a, SeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
