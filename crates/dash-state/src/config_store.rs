//! Chart configuration store: owns chart configs and their derived series.

use crate::cache::SeriesCache;
use crate::resolver::ChartDataResolver;
use dash_core::{ChartConfig, ChartConfigPatch, ChartId, Series, SeriesKey};
use std::collections::HashSet;

/// What a `set_chart_config` call did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub chart_id: ChartId,
    /// The chart did not exist before
    pub created: bool,
    /// Key regenerated by this write, if any
    pub recomputed: Option<SeriesKey>,
    /// Keys dropped from the cache to stay within capacity
    pub evicted: Vec<SeriesKey>,
}

pub struct ChartConfigStore {
    configs: Vec<ChartConfig>,
    cache: SeriesCache,
    resolver: Box<dyn ChartDataResolver>,
}

impl ChartConfigStore {
    /// Empty store; the dashboard seeds the default chart
    pub fn new(resolver: Box<dyn ChartDataResolver>, cache: SeriesCache) -> Self {
        Self {
            configs: Vec::new(),
            cache,
            resolver,
        }
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Configurations in insertion order
    pub fn configs(&self) -> &[ChartConfig] {
        &self.configs
    }

    pub fn get(&self, chart_id: &ChartId) -> Option<&ChartConfig> {
        self.configs.iter().find(|c| &c.chart_id == chart_id)
    }

    pub fn contains(&self, chart_id: &ChartId) -> bool {
        self.get(chart_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    pub fn chart_ids(&self) -> impl Iterator<Item = &ChartId> {
        self.configs.iter().map(|c| &c.chart_id)
    }

    /// Cached series by rendered key (e.g. "avg_total_weight_month")
    pub fn chart_data(&self, key: &str) -> Option<&Series> {
        self.cache.get(key)
    }

    /// Series currently backing a chart
    pub fn series_for(&self, chart_id: &ChartId) -> Option<&Series> {
        self.get(chart_id)
            .and_then(|config| self.cache.get(config.series_key().as_str()))
    }

    pub fn cache(&self) -> &SeriesCache {
        &self.cache
    }

    /// Keys referenced by at least one live chart
    pub fn live_keys(&self) -> HashSet<SeriesKey> {
        self.configs.iter().map(ChartConfig::series_key).collect()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create or merge a chart configuration.
    ///
    /// Series are regenerated only when the chart is new or its variable,
    /// grain or aggregation changed. The key being replaced stays cached.
    pub fn set_chart_config(&mut self, chart_id: ChartId, patch: &ChartConfigPatch) -> ConfigChange {
        let (merged, previous, refresh) = match self.configs.iter_mut().find(|c| c.chart_id == chart_id) {
            Some(existing) => {
                let previous = existing.clone();
                existing.apply(patch);
                let refresh = previous.data_differs(existing);
                (existing.clone(), Some(previous), refresh)
            }
            None => {
                let mut config = ChartConfig::seed(chart_id.clone());
                config.apply(patch);
                self.configs.push(config.clone());
                (config, None, true)
            }
        };
        let created = previous.is_none();

        let mut change = ConfigChange {
            chart_id,
            created,
            recomputed: None,
            evicted: Vec::new(),
        };

        if refresh {
            let key = merged.series_key();
            tracing::debug!("Recomputing series {} for chart {}", key, merged.chart_id);

            let series = self.resolver.resolve(&merged);
            let mut pinned = self.live_keys();
            if let Some(previous) = &previous {
                pinned.insert(previous.series_key());
            }
            change.evicted = self.cache.insert(key.clone(), series, &pinned);
            change.recomputed = Some(key);
        } else {
            tracing::debug!("Reusing cached series for chart {}", merged.chart_id);
            self.cache.touch(merged.series_key().as_str());
        }

        change
    }

    /// Remove a chart's configuration; unknown ids are a no-op
    pub fn remove_chart(&mut self, chart_id: &ChartId) -> Option<ChartConfig> {
        let index = self.configs.iter().position(|c| &c.chart_id == chart_id)?;
        Some(self.configs.remove(index))
    }

    /// Drop cached series no live chart uses
    pub fn prune_unreferenced(&mut self) -> Vec<SeriesKey> {
        let pinned = self.live_keys();
        self.cache.retain_pinned(&pinned)
    }

    /// Remove every chart and cached series; returns the keys dropped
    pub fn clear(&mut self) -> Vec<SeriesKey> {
        self.configs.clear();
        self.cache.clear()
    }
}
