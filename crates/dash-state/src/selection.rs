//! Cross-chart selection of time buckets.
//!
//! Membership is by exact match on the bucket label produced by the resolver.

use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionStore {
    selected: HashSet<String>,
}

impl SelectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the period was not already selected
    pub fn add(&mut self, time_period: impl Into<String>) -> bool {
        self.selected.insert(time_period.into())
    }

    /// Returns true if the period was selected
    pub fn remove(&mut self, time_period: &str) -> bool {
        self.selected.remove(time_period)
    }

    pub fn contains(&self, time_period: &str) -> bool {
        self.selected.contains(time_period)
    }

    /// Point-click gesture: select if absent, deselect if present.
    /// Returns the new membership.
    pub fn toggle(&mut self, time_period: &str) -> bool {
        if self.selected.remove(time_period) {
            false
        } else {
            self.selected.insert(time_period.to_string());
            true
        }
    }

    /// Selected periods, sorted for stable output
    pub fn selected_time_periods(&self) -> Vec<&str> {
        let mut periods: Vec<&str> = self.selected.iter().map(String::as_str).collect();
        periods.sort_unstable();
        periods
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// Returns true if anything was cleared
    pub fn clear(&mut self) -> bool {
        let had_any = !self.selected.is_empty();
        self.selected.clear();
        had_any
    }
}

impl FromIterator<String> for SelectionStore {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            selected: iter.into_iter().collect(),
        }
    }
}
