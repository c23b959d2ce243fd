//! Series cache keyed by (aggregation, variable, grain).
//!
//! Entries are replaced whole, never patched. The cache is bounded: once it
//! grows past capacity the least recently used entry that no live chart
//! references is evicted. Referenced entries are never evicted.

use dash_core::{Series, SeriesKey};
use std::collections::{HashMap, HashSet};

/// Default number of cached series
pub const DEFAULT_CACHE_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
struct CacheEntry {
    series: Series,
    last_used: u64,
}

#[derive(Debug, Clone)]
pub struct SeriesCache {
    entries: HashMap<SeriesKey, CacheEntry>,
    capacity: Option<usize>,
    clock: u64,
}

impl SeriesCache {
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            capacity,
            clock: 0,
        }
    }

    /// Cache that never evicts
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Series> {
        self.entries.get(key).map(|e| &e.series)
    }

    /// Mark an entry as recently used
    pub fn touch(&mut self, key: &str) {
        self.clock += 1;
        let now = self.clock;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.last_used = now;
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &SeriesKey> {
        self.entries.keys()
    }

    /// Replace the entry for `key`, then evict down to capacity.
    /// Returns the keys evicted.
    pub fn insert(
        &mut self,
        key: SeriesKey,
        series: Series,
        pinned: &HashSet<SeriesKey>,
    ) -> Vec<SeriesKey> {
        self.clock += 1;
        self.entries.insert(
            key.clone(),
            CacheEntry {
                series,
                last_used: self.clock,
            },
        );
        self.evict(&key, pinned)
    }

    fn evict(&mut self, fresh: &SeriesKey, pinned: &HashSet<SeriesKey>) -> Vec<SeriesKey> {
        let Some(capacity) = self.capacity else {
            return Vec::new();
        };

        let mut evicted = Vec::new();
        while self.entries.len() > capacity {
            let victim = self
                .entries
                .iter()
                .filter(|(k, _)| *k != fresh && !pinned.contains(*k))
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());

            match victim {
                Some(key) => {
                    self.entries.remove(&key);
                    evicted.push(key);
                }
                // Everything left is in use
                None => break,
            }
        }
        evicted
    }

    /// Drop every entry not in `pinned`; returns the keys removed
    pub fn retain_pinned(&mut self, pinned: &HashSet<SeriesKey>) -> Vec<SeriesKey> {
        let stale: Vec<SeriesKey> = self
            .entries
            .keys()
            .filter(|k| !pinned.contains(*k))
            .cloned()
            .collect();

        for key in &stale {
            self.entries.remove(key);
        }
        stale
    }

    /// Drop every entry; returns the keys removed
    pub fn clear(&mut self) -> Vec<SeriesKey> {
        self.entries.drain().map(|(key, _)| key).collect()
    }
}

impl Default for SeriesCache {
    fn default() -> Self {
        Self::new(Some(DEFAULT_CACHE_CAPACITY))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::{Aggregation, TimeGrain};

    fn key(var: &str) -> SeriesKey {
        SeriesKey::new(Aggregation::Avg, var, TimeGrain::Month)
    }

    #[test]
    fn test_unbounded_keeps_everything() {
        let mut cache = SeriesCache::unbounded();
        let none = HashSet::new();
        for i in 0..100 {
            cache.insert(key(&format!("v{i}")), Series::default(), &none);
        }
        assert_eq!(cache.len(), 100);
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let mut cache = SeriesCache::new(Some(2));
        let none = HashSet::new();

        cache.insert(key("a"), Series::default(), &none);
        cache.insert(key("b"), Series::default(), &none);
        cache.touch("avg_a_month");
        let evicted = cache.insert(key("c"), Series::default(), &none);

        assert_eq!(evicted, vec![key("b")]);
        assert!(cache.contains("avg_a_month"));
        assert!(cache.contains("avg_c_month"));
    }

    #[test]
    fn test_pinned_entries_survive() {
        let mut cache = SeriesCache::new(Some(1));
        let pinned: HashSet<SeriesKey> = [key("a"), key("b")].into_iter().collect();

        cache.insert(key("a"), Series::default(), &pinned);
        let evicted = cache.insert(key("b"), Series::default(), &pinned);

        assert!(evicted.is_empty());
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_retain_pinned() {
        let mut cache = SeriesCache::unbounded();
        let none = HashSet::new();
        cache.insert(key("a"), Series::default(), &none);
        cache.insert(key("b"), Series::default(), &none);

        let pinned: HashSet<SeriesKey> = [key("b")].into_iter().collect();
        assert_eq!(cache.retain_pinned(&pinned), vec![key("a")]);
        assert_eq!(cache.len(), 1);
    }
}
