//! # dash-state
//!
//! State engine for the chart grid dashboard.
//! One [`Dashboard`] aggregate owns the chart configuration store, the layout
//! store and the selection store, and only exposes compound operations that
//! keep them consistent. Consumers observe changes through explicit
//! subscriptions; [`reactive`] bridges those into Leptos signals.

pub mod cache;
pub mod config_store;
pub mod layout_store;
pub mod observer;
pub mod reactive;
pub mod resolver;
pub mod selection;
pub mod snapshot;

pub use cache::*;
pub use config_store::*;
pub use layout_store::*;
pub use observer::*;
pub use reactive::*;
pub use resolver::*;
pub use selection::*;
pub use snapshot::*;

use chrono::NaiveDate;
use dash_core::{
    catalog, colors, format_value, ChartConfig, ChartConfigPatch, ChartId, DashboardError,
    LayoutItem, Layouts, Series, SeriesKey, BREAKPOINT_MAIN, BREAKPOINT_SM,
};
use std::collections::{BTreeMap, HashSet};

/// Id of the chart every dashboard starts with
pub const SEED_CHART_ID: &str = "0";

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Dashboard engine configuration
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Grid column count per breakpoint
    pub columns: BTreeMap<String, i32>,
    /// Row span of a newly placed chart
    pub tile_height: i32,
    /// Maximum row span of a newly placed chart
    pub tile_max_height: Option<i32>,
    /// Series cache bound (`None` = unbounded)
    pub cache_capacity: Option<usize>,
    /// Seed for the synthetic resolver (`None` = entropy)
    pub seed: Option<u64>,
    /// Fixed "today" for the synthetic resolver (`None` = local clock)
    pub anchor: Option<NaiveDate>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        let mut columns = BTreeMap::new();
        columns.insert(BREAKPOINT_MAIN.to_string(), 2);
        columns.insert(BREAKPOINT_SM.to_string(), 1);

        Self {
            columns,
            tile_height: 1,
            tile_max_height: Some(2),
            cache_capacity: Some(DEFAULT_CACHE_CAPACITY),
            seed: None,
            anchor: None,
        }
    }
}

impl DashboardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, breakpoint: impl Into<String>, cols: i32) -> Self {
        self.columns.insert(breakpoint.into(), cols);
        self
    }

    pub fn tile_height(mut self, h: i32) -> Self {
        self.tile_height = h;
        self
    }

    pub fn tile_max_height(mut self, max_h: Option<i32>) -> Self {
        self.tile_max_height = max_h;
        self
    }

    pub fn cache_capacity(mut self, capacity: Option<usize>) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn anchored_at(mut self, today: NaiveDate) -> Self {
        self.anchor = Some(today);
        self
    }

    /// Column count for a breakpoint (single column if unknown)
    pub fn columns_for(&self, breakpoint: &str) -> i32 {
        self.columns.get(breakpoint).copied().unwrap_or(1)
    }

    /// Synthetic resolver honoring `seed` and `anchor`
    pub fn resolver(&self) -> SyntheticResolver {
        let resolver = match self.seed {
            Some(seed) => SyntheticResolver::seeded(seed),
            None => SyntheticResolver::new(),
        };
        match self.anchor {
            Some(today) => resolver.anchored_at(today),
            None => resolver,
        }
    }

    /// Default placement of a new chart at a breakpoint
    fn tile(&self, chart_id: &ChartId, breakpoint: &str, row: i32) -> LayoutItem {
        let item = LayoutItem::new(chart_id.clone(), 0, row, self.columns_for(breakpoint), self.tile_height);
        match self.tile_max_height {
            Some(max_h) => item.with_max_h(max_h),
            None => item,
        }
    }
}

// ============================================================================
// PRESENTER VIEW MODEL
// ============================================================================

/// One rendered data point
#[derive(Debug, Clone, PartialEq)]
pub struct PointView {
    pub time_period: String,
    pub value: Option<f64>,
    /// Tooltip / label text
    pub display: String,
    /// Highlighted by the shared selection
    pub selected: bool,
}

/// Everything a chart card needs to render
#[derive(Debug, Clone, PartialEq)]
pub struct ChartView {
    pub config: ChartConfig,
    pub title: String,
    pub unit: Option<&'static str>,
    pub legend: String,
    pub color: &'static str,
    pub points: Vec<PointView>,
    /// No series available yet
    pub loading: bool,
}

// ============================================================================
// DASHBOARD AGGREGATE
// ============================================================================

pub struct Dashboard {
    config: DashboardConfig,
    charts: ChartConfigStore,
    layouts: LayoutStore,
    selection: SelectionStore,
    observers: Observers,
    next_chart_id: u64,
}

impl Dashboard {
    /// Dashboard with the default configuration and one seed chart
    pub fn new() -> Self {
        Self::with_config(DashboardConfig::default())
    }

    /// Dashboard backed by the synthetic resolver `config` describes
    pub fn with_config(config: DashboardConfig) -> Self {
        let resolver = config.resolver();
        Self::with_resolver(config, Box::new(resolver))
    }

    /// Dashboard backed by a custom data source
    pub fn with_resolver(config: DashboardConfig, resolver: Box<dyn ChartDataResolver>) -> Self {
        let cache = SeriesCache::new(config.cache_capacity);
        let mut dashboard = Self {
            charts: ChartConfigStore::new(resolver, cache),
            layouts: LayoutStore::default(),
            selection: SelectionStore::new(),
            observers: Observers::new(),
            next_chart_id: 0,
            config,
        };

        let seed = ChartConfig::seed(SEED_CHART_ID);
        dashboard.apply(seed.chart_id.clone(), &ChartConfigPatch::from(&seed));
        dashboard.next_chart_id = 1;
        dashboard
    }

    /// Engine configuration
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    /// Listen to every event
    pub fn subscribe(&mut self, listener: impl FnMut(&DashboardEvent) + 'static) -> SubscriptionId {
        self.observers.subscribe(Box::new(listener))
    }

    /// Listen to events of one slice
    pub fn subscribe_slice(
        &mut self,
        slice: Slice,
        listener: impl FnMut(&DashboardEvent) + 'static,
    ) -> SubscriptionId {
        self.observers.subscribe_slice(slice, Box::new(listener))
    }

    /// Returns false for unknown ids
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn emit(&mut self, event: DashboardEvent) {
        self.observers.notify(&event);
    }

    // ========================================================================
    // Chart Configuration
    // ========================================================================

    /// Configurations in display order
    pub fn chart_configs(&self) -> &[ChartConfig] {
        self.charts.configs()
    }

    /// Configuration of one chart
    pub fn chart_config(&self, chart_id: &ChartId) -> Option<&ChartConfig> {
        self.charts.get(chart_id)
    }

    /// Cached series by key (e.g. "avg_total_weight_month")
    pub fn chart_data(&self, key: &str) -> Option<&Series> {
        self.charts.chart_data(key)
    }

    /// Series currently backing a chart
    pub fn series_for(&self, chart_id: &ChartId) -> Option<&Series> {
        self.charts.series_for(chart_id)
    }

    /// Underlying configuration store (read-only)
    pub fn charts(&self) -> &ChartConfigStore {
        &self.charts
    }

    /// Create or partially update a chart.
    ///
    /// New charts get a default layout placement on every breakpoint.
    /// Fails if the resulting variable is not in the catalog or does not
    /// define the resulting aggregation.
    pub fn set_chart_config(
        &mut self,
        chart_id: impl Into<ChartId>,
        patch: &ChartConfigPatch,
    ) -> Result<ConfigChange, DashboardError> {
        let chart_id = chart_id.into();

        let mut merged = self
            .charts
            .get(&chart_id)
            .cloned()
            .unwrap_or_else(|| ChartConfig::seed(chart_id.clone()));
        merged.apply(patch);
        catalog::validate(&merged.y_axis_var, merged.aggregation)?;

        Ok(self.apply(chart_id, patch))
    }

    /// Add a chart under the next free numeric id
    pub fn add_chart(&mut self, patch: &ChartConfigPatch) -> Result<ChartId, DashboardError> {
        let mut preview = ChartConfig::seed("");
        preview.apply(patch);
        catalog::validate(&preview.y_axis_var, preview.aggregation)?;

        let chart_id = self.allocate_chart_id();
        tracing::info!("Adding chart {}", chart_id);
        self.apply(chart_id.clone(), patch);
        Ok(chart_id)
    }

    /// Remove a chart from the configuration and layout stores together.
    /// Unknown ids are a no-op; returns whether anything changed.
    pub fn remove_chart(&mut self, chart_id: &ChartId) -> bool {
        let removed_config = self.charts.remove_chart(chart_id).is_some();
        let removed_layout = self.layouts.remove_chart(chart_id);

        if removed_config || removed_layout {
            tracing::info!("Removed chart {}", chart_id);
        }
        if removed_config {
            self.emit(DashboardEvent::ChartsChanged {
                chart_id: chart_id.clone(),
            });
        }
        if removed_layout {
            self.emit(DashboardEvent::LayoutsChanged);
        }

        removed_config || removed_layout
    }

    /// Swap a chart's variable, applying the chart type the catalog suggests
    pub fn change_variable(
        &mut self,
        chart_id: &ChartId,
        y_axis_var: &str,
    ) -> Result<Option<ConfigChange>, DashboardError> {
        if !self.charts.contains(chart_id) {
            return Ok(None);
        }

        let patch = ChartConfigPatch::new()
            .y_axis_var(y_axis_var)
            .chart_type(catalog::infer_chart_type(y_axis_var));
        self.set_chart_config(chart_id.clone(), &patch).map(Some)
    }

    /// Line <-> bar; never touches the series cache
    pub fn toggle_chart_type(&mut self, chart_id: &ChartId) -> Option<ConfigChange> {
        let next = self.charts.get(chart_id)?.chart_type.toggle();
        Some(self.apply(chart_id.clone(), &ChartConfigPatch::new().chart_type(next)))
    }

    /// Month -> quarter -> year -> month
    pub fn cycle_time_grain(&mut self, chart_id: &ChartId) -> Option<ConfigChange> {
        let next = self.charts.get(chart_id)?.x_axis_var.next();
        Some(self.apply(chart_id.clone(), &ChartConfigPatch::new().x_axis_var(next)))
    }

    /// Drop cached series that no chart references
    pub fn prune_unreferenced(&mut self) -> Vec<SeriesKey> {
        let pruned = self.charts.prune_unreferenced();
        if !pruned.is_empty() {
            tracing::debug!("Pruned {} unreferenced series", pruned.len());
            self.emit(DashboardEvent::SeriesEvicted { keys: pruned.clone() });
        }
        pruned
    }

    /// Unvalidated write shared by every config mutation
    fn apply(&mut self, chart_id: ChartId, patch: &ChartConfigPatch) -> ConfigChange {
        let change = self.charts.set_chart_config(chart_id, patch);

        if change.created {
            self.place_default(&change.chart_id);
        }

        self.emit(DashboardEvent::ChartsChanged {
            chart_id: change.chart_id.clone(),
        });
        if let Some(key) = &change.recomputed {
            self.emit(DashboardEvent::SeriesChanged { key: key.clone() });
        }
        if !change.evicted.is_empty() {
            self.emit(DashboardEvent::SeriesEvicted {
                keys: change.evicted.clone(),
            });
        }
        if change.created {
            self.emit(DashboardEvent::LayoutsChanged);
        }

        change
    }

    /// Append a tile for `chart_id` at the bottom of every breakpoint that
    /// does not already place it
    fn place_default(&mut self, chart_id: &ChartId) {
        let mut breakpoints: Vec<String> = self.layouts.breakpoints().map(str::to_string).collect();
        if !breakpoints.iter().any(|b| b == BREAKPOINT_MAIN) {
            breakpoints.push(BREAKPOINT_MAIN.to_string());
        }

        for breakpoint in breakpoints {
            if self.layouts.chart_ids(&breakpoint).contains(&chart_id) {
                continue;
            }
            let row = self.layouts.next_row(&breakpoint);
            let tile = self.config.tile(chart_id, &breakpoint, row);
            self.layouts.place(&breakpoint, tile);
        }
    }

    fn allocate_chart_id(&mut self) -> ChartId {
        loop {
            let candidate = ChartId::new(self.next_chart_id.to_string());
            self.next_chart_id += 1;
            if !self.charts.contains(&candidate) {
                return candidate;
            }
        }
    }

    // ========================================================================
    // Layouts
    // ========================================================================

    /// Layouts for every breakpoint
    pub fn layouts(&self) -> &Layouts {
        self.layouts.layouts()
    }

    /// Underlying layout store (read-only)
    pub fn layout_store(&self) -> &LayoutStore {
        &self.layouts
    }

    /// Replace every breakpoint's layout at once (drag/resize end)
    pub fn set_layouts(&mut self, layouts: Layouts) {
        let live: HashSet<&ChartId> = self.charts.chart_ids().collect();
        for (breakpoint, items) in &layouts {
            let placed: HashSet<&ChartId> = items.iter().map(|i| &i.chart_id).collect();
            if placed != live {
                tracing::warn!(
                    "Layout for breakpoint {} does not match charts ({} placed, {} configured)",
                    breakpoint,
                    placed.len(),
                    live.len()
                );
            }
        }

        self.layouts.set_layouts(layouts);
        self.emit(DashboardEvent::LayoutsChanged);
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Underlying selection store (read-only)
    pub fn selection(&self) -> &SelectionStore {
        &self.selection
    }

    /// Whether a bucket label is highlighted
    pub fn is_selected(&self, time_period: &str) -> bool {
        self.selection.contains(time_period)
    }

    /// Selected bucket labels, sorted
    pub fn selected_time_periods(&self) -> Vec<&str> {
        self.selection.selected_time_periods()
    }

    /// Add a bucket to the selection; returns false if already selected
    pub fn select(&mut self, time_period: &str) -> bool {
        let added = self.selection.add(time_period);
        if added {
            self.emit(DashboardEvent::SelectionChanged);
        }
        added
    }

    /// Remove a bucket from the selection; returns false if it was not selected
    pub fn deselect(&mut self, time_period: &str) -> bool {
        let removed = self.selection.remove(time_period);
        if removed {
            self.emit(DashboardEvent::SelectionChanged);
        }
        removed
    }

    /// Point-click on any chart; returns the new membership
    pub fn toggle_selection(&mut self, time_period: &str) -> bool {
        let selected = self.selection.toggle(time_period);
        self.emit(DashboardEvent::SelectionChanged);
        selected
    }

    /// Filters reset: clears filter-derived state (the selection)
    pub fn reset_filters(&mut self) {
        if self.selection.clear() {
            tracing::debug!("Selection cleared by filter reset");
            self.emit(DashboardEvent::SelectionChanged);
        }
    }

    // ========================================================================
    // Presenter Views
    // ========================================================================

    /// Render model for one chart card
    pub fn chart_view(&self, chart_id: &ChartId) -> Option<ChartView> {
        let config = self.charts.get(chart_id)?;
        let series = self.charts.series_for(chart_id);
        let var = config.y_axis_var.as_str();

        let points: Vec<PointView> = series
            .map(|s| {
                s.iter()
                    .map(|point| {
                        let value = point.value(var);
                        PointView {
                            time_period: point.time_period.clone(),
                            value,
                            display: format_value(var, value, config.aggregation),
                            selected: self.selection.contains(&point.time_period),
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let series_count = series.map_or(1, |s| s.data_keys().len().max(1));

        Some(ChartView {
            title: catalog::label(var, config.aggregation).to_string(),
            unit: catalog::unit(var, config.aggregation),
            legend: catalog::series_label(series_count, var).to_string(),
            color: colors::series_color(0, series_count),
            loading: points.is_empty(),
            points,
            config: config.clone(),
        })
    }

    /// Render models for every chart, in display order
    pub fn chart_views(&self) -> Vec<ChartView> {
        self.charts
            .chart_ids()
            .filter_map(|id| self.chart_view(id))
            .collect()
    }

    // ========================================================================
    // Snapshots
    // ========================================================================

    /// Charts, layouts and selection; series are not included
    pub fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            charts: self.charts.configs().to_vec(),
            layouts: self.layouts.layouts().clone(),
            selected_time_periods: self
                .selection
                .selected_time_periods()
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Replace all state with a snapshot, regenerating every series.
    /// Nothing changes if the snapshot is invalid.
    pub fn restore(&mut self, snapshot: DashboardSnapshot) -> Result<(), DashboardError> {
        let mut seen = HashSet::new();
        for chart in &snapshot.charts {
            catalog::validate(&chart.y_axis_var, chart.aggregation)?;
            if !seen.insert(&chart.chart_id) {
                return Err(DashboardError::DuplicateChart(chart.chart_id.clone()));
            }
        }

        tracing::info!("Restoring dashboard snapshot ({} charts)", snapshot.charts.len());

        let cleared = self.charts.clear();
        if !cleared.is_empty() {
            self.emit(DashboardEvent::SeriesEvicted { keys: cleared });
        }

        self.layouts.set_layouts(snapshot.layouts);
        let live: HashSet<&ChartId> = snapshot.charts.iter().map(|c| &c.chart_id).collect();
        let dropped = self.layouts.retain_charts(&live);
        if !dropped.is_empty() {
            tracing::warn!("Dropped {} orphan or duplicate layout entries from snapshot", dropped.len());
        }
        self.selection = snapshot.selected_time_periods.into_iter().collect();

        for chart in &snapshot.charts {
            let change = self.charts.set_chart_config(chart.chart_id.clone(), &ChartConfigPatch::from(chart));
            if let Some(key) = change.recomputed {
                self.emit(DashboardEvent::SeriesChanged { key });
            }
            self.place_default(&chart.chart_id);
            self.emit(DashboardEvent::ChartsChanged {
                chart_id: chart.chart_id.clone(),
            });
        }

        self.next_chart_id = snapshot
            .charts
            .iter()
            .filter_map(|c| c.chart_id.as_str().parse::<u64>().ok())
            .max()
            .map_or(0, |max| max + 1);

        self.emit(DashboardEvent::LayoutsChanged);
        self.emit(DashboardEvent::SelectionChanged);
        Ok(())
    }

    /// Snapshot as JSON
    pub fn to_json(&self) -> Result<String, DashboardError> {
        self.snapshot().to_json()
    }

    /// Restore from a JSON snapshot
    pub fn restore_json(&mut self, json: &str) -> Result<(), DashboardError> {
        self.restore(DashboardSnapshot::from_json(json)?)
    }
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("charts", &self.charts.configs())
            .field("layouts", self.layouts.layouts())
            .field("selection", &self.selection)
            .field("observers", &self.observers)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dash_core::{Aggregation, ChartType, TimeGrain};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dashboard() -> Dashboard {
        Dashboard::with_config(
            DashboardConfig::new()
                .seed(5)
                .anchored_at(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()),
        )
    }

    fn record(dashboard: &mut Dashboard) -> Rc<RefCell<Vec<DashboardEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        dashboard.subscribe(move |e| sink.borrow_mut().push(e.clone()));
        events
    }

    #[test]
    fn test_initial_state() {
        let dashboard = Dashboard::new();

        assert_eq!(dashboard.chart_configs().len(), 1);
        let seed = &dashboard.chart_configs()[0];
        assert_eq!(seed.chart_id.as_str(), "0");
        assert_eq!(seed.y_axis_var, "total_weight");
        assert_eq!(seed.x_axis_var, TimeGrain::Month);
        assert_eq!(seed.aggregation, Aggregation::Avg);
        assert_eq!(seed.chart_type, ChartType::Line);

        assert_eq!(dashboard.chart_data("avg_total_weight_month").unwrap().len(), 12);

        let main = dashboard.layout_store().breakpoint(BREAKPOINT_MAIN).unwrap();
        assert_eq!(main, &[LayoutItem::new("0", 0, 0, 2, 1).with_max_h(2)]);
    }

    #[test]
    fn test_add_chart_places_layout() {
        let mut dashboard = dashboard();
        let id = dashboard
            .add_chart(&ChartConfigPatch::new().y_axis_var("body_fat"))
            .unwrap();

        assert_eq!(id.as_str(), "1");
        assert_eq!(dashboard.chart_config(&id).unwrap().y_axis_var, "body_fat");
        assert!(dashboard.chart_data("avg_body_fat_month").is_some());

        let main = dashboard.layout_store().breakpoint(BREAKPOINT_MAIN).unwrap();
        assert_eq!(main[1], LayoutItem::new("1", 0, 1, 2, 1).with_max_h(2));
    }

    #[test]
    fn test_add_chart_rejects_unknown_variable() {
        let mut dashboard = dashboard();
        let result = dashboard.add_chart(&ChartConfigPatch::new().y_axis_var("steps"));

        assert!(matches!(result, Err(DashboardError::UnknownVariable(_))));
        assert_eq!(dashboard.chart_configs().len(), 1);
    }

    #[test]
    fn test_remove_chart_updates_both_stores() {
        let mut dashboard = dashboard();
        let id = dashboard.add_chart(&ChartConfigPatch::new()).unwrap();

        let mut layouts = dashboard.layouts().clone();
        layouts.insert(BREAKPOINT_SM.to_string(), vec![
            LayoutItem::new("0", 0, 0, 1, 1),
            LayoutItem::new(id.clone(), 0, 1, 1, 1),
        ]);
        dashboard.set_layouts(layouts);

        assert!(dashboard.remove_chart(&id));
        assert!(dashboard.chart_config(&id).is_none());
        for items in dashboard.layouts().values() {
            assert!(items.iter().all(|i| i.chart_id != id));
        }
    }

    #[test]
    fn test_remove_chart_twice_is_noop() {
        let mut dashboard = dashboard();
        let id = ChartId::from(SEED_CHART_ID);

        assert!(dashboard.remove_chart(&id));
        let after_first = dashboard.snapshot();

        let events = record(&mut dashboard);
        assert!(!dashboard.remove_chart(&id));
        assert_eq!(dashboard.snapshot(), after_first);
        assert!(events.borrow().is_empty());
    }

    #[test]
    fn test_chart_type_change_bypasses_cache() {
        let mut dashboard = dashboard();
        let before = dashboard.chart_data("avg_total_weight_month").unwrap().clone();
        let events = record(&mut dashboard);

        let change = dashboard
            .set_chart_config(SEED_CHART_ID, &ChartConfigPatch::new().chart_type(ChartType::Bar))
            .unwrap();

        assert!(change.recomputed.is_none());
        assert_eq!(dashboard.chart_data("avg_total_weight_month").unwrap(), &before);
        assert!(events.borrow().iter().all(|e| e.slice() != Slice::Series));
    }

    #[test]
    fn test_variable_change_keeps_old_entry() {
        let mut dashboard = dashboard();
        let old = dashboard.chart_data("avg_total_weight_month").unwrap().clone();

        dashboard
            .set_chart_config(SEED_CHART_ID, &ChartConfigPatch::new().y_axis_var("muscle_mass"))
            .unwrap();

        assert_eq!(dashboard.chart_data("avg_muscle_mass_month").unwrap().len(), 12);
        assert_eq!(dashboard.chart_data("avg_total_weight_month").unwrap(), &old);
    }

    #[test]
    fn test_change_variable_infers_chart_type() {
        let mut dashboard = dashboard();
        let id = ChartId::from(SEED_CHART_ID);
        dashboard.toggle_chart_type(&id);
        assert_eq!(dashboard.chart_config(&id).unwrap().chart_type, ChartType::Bar);

        let change = dashboard.change_variable(&id, "body_fat").unwrap().unwrap();
        assert_eq!(change.recomputed.unwrap().as_str(), "avg_body_fat_month");
        assert_eq!(dashboard.chart_config(&id).unwrap().chart_type, ChartType::Line);

        assert!(dashboard.change_variable(&"missing".into(), "body_fat").unwrap().is_none());
    }

    #[test]
    fn test_cycle_time_grain() {
        let mut dashboard = dashboard();
        let id = ChartId::from(SEED_CHART_ID);

        let change = dashboard.cycle_time_grain(&id).unwrap();
        assert_eq!(change.recomputed.unwrap().as_str(), "avg_total_weight_quarter");
        dashboard.cycle_time_grain(&id);
        dashboard.cycle_time_grain(&id);
        assert_eq!(dashboard.chart_config(&id).unwrap().x_axis_var, TimeGrain::Month);

        assert!(dashboard.cycle_time_grain(&"nope".into()).is_none());
    }

    #[test]
    fn test_partial_update_of_new_chart_uses_seed_defaults() {
        let mut dashboard = dashboard();
        dashboard
            .set_chart_config("7", &ChartConfigPatch::new().aggregation(Aggregation::Sum))
            .unwrap();

        let config = dashboard.chart_config(&"7".into()).unwrap();
        assert_eq!(config.y_axis_var, "total_weight");
        assert_eq!(config.aggregation, Aggregation::Sum);
        assert_eq!(dashboard.layout_store().chart_ids(BREAKPOINT_MAIN).len(), 2);
    }

    #[test]
    fn test_selection_events_and_reset() {
        let mut dashboard = dashboard();
        let events = record(&mut dashboard);

        assert!(dashboard.select("Jan 2024"));
        assert!(!dashboard.select("Jan 2024"));
        assert!(dashboard.is_selected("Jan 2024"));
        assert!(!dashboard.deselect("Feb 2024"));

        dashboard.reset_filters();
        assert!(!dashboard.is_selected("Jan 2024"));
        assert_eq!(
            *events.borrow(),
            vec![DashboardEvent::SelectionChanged, DashboardEvent::SelectionChanged]
        );
    }

    #[test]
    fn test_selection_highlights_across_charts() {
        let mut dashboard = dashboard();
        let other = dashboard.add_chart(&ChartConfigPatch::new().y_axis_var("body_fat")).unwrap();

        let label = dashboard.series_for(&other).unwrap().points[3].time_period.clone();
        dashboard.toggle_selection(&label);

        for view in dashboard.chart_views() {
            let highlighted: Vec<&str> = view
                .points
                .iter()
                .filter(|p| p.selected)
                .map(|p| p.time_period.as_str())
                .collect();
            assert_eq!(highlighted, vec![label.as_str()]);
        }
    }

    #[test]
    fn test_chart_view() {
        let mut dashboard = dashboard();
        dashboard
            .set_chart_config(SEED_CHART_ID, &ChartConfigPatch::new().y_axis_var("muscle_mass"))
            .unwrap();

        let view = dashboard.chart_view(&SEED_CHART_ID.into()).unwrap();
        assert_eq!(view.title, "Average Muscle Mass");
        assert_eq!(view.legend, "Total");
        assert_eq!(view.color, colors::DEFAULT_DATA);
        assert_eq!(view.points.len(), 12);
        assert!(!view.loading);
        assert!(view.points.iter().all(|p| p.display.ends_with(" lbs")));
        assert_eq!(view.points[11].time_period, "Jun 2024");
    }

    #[test]
    fn test_subscription_order_and_unsubscribe() {
        let mut dashboard = dashboard();
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = events.clone();
        let id = dashboard.subscribe(move |e| sink.borrow_mut().push(e.slice()));

        dashboard.add_chart(&ChartConfigPatch::new().y_axis_var("body_fat")).unwrap();
        assert_eq!(
            *events.borrow(),
            vec![Slice::Charts, Slice::Series, Slice::Layouts]
        );

        assert!(dashboard.unsubscribe(id));
        dashboard.select("Jan 2024");
        assert_eq!(events.borrow().len(), 3);
    }

    #[test]
    fn test_bounded_cache_keeps_live_and_replaced_series() {
        let mut dashboard = Dashboard::with_config(DashboardConfig::new().seed(1).cache_capacity(Some(1)));
        let id = ChartId::from(SEED_CHART_ID);

        dashboard.change_variable(&id, "body_fat").unwrap();
        assert!(dashboard.chart_data("avg_body_fat_month").is_some());
        assert!(dashboard.chart_data("avg_total_weight_month").is_some());

        let events = record(&mut dashboard);
        dashboard.cycle_time_grain(&id);
        assert!(dashboard.chart_data("avg_total_weight_month").is_none());
        assert!(dashboard.chart_data("avg_body_fat_month").is_some());
        assert!(dashboard.series_for(&id).is_some());
        assert!(events.borrow().contains(&DashboardEvent::SeriesEvicted {
            keys: vec![SeriesKey::new(Aggregation::Avg, "total_weight", TimeGrain::Month)],
        }));
    }

    #[test]
    fn test_add_chart_below_extreme_layout() {
        let mut dashboard = dashboard();
        let mut layouts = Layouts::new();
        layouts.insert(BREAKPOINT_MAIN.to_string(), vec![LayoutItem::new("0", 0, i32::MAX, 2, 1)]);
        dashboard.set_layouts(layouts);

        let id = dashboard.add_chart(&ChartConfigPatch::new()).unwrap();

        let main = dashboard.layout_store().breakpoint(BREAKPOINT_MAIN).unwrap();
        assert_eq!(main[1].chart_id, id);
        assert_eq!(main[1].y, i32::MAX);
    }

    #[test]
    fn test_prune_unreferenced() {
        let mut dashboard = dashboard();
        dashboard.change_variable(&SEED_CHART_ID.into(), "body_fat").unwrap();

        let pruned = dashboard.prune_unreferenced();
        assert_eq!(pruned.len(), 1);
        assert!(dashboard.chart_data("avg_total_weight_month").is_none());
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut dashboard = dashboard();
        let id = dashboard.add_chart(&ChartConfigPatch::new().y_axis_var("body_fat")).unwrap();
        dashboard.toggle_chart_type(&id);
        dashboard.select("May 2024");
        let json = dashboard.to_json().unwrap();

        let mut restored = Dashboard::new();
        restored.restore_json(&json).unwrap();

        assert_eq!(restored.chart_configs(), dashboard.chart_configs());
        assert_eq!(restored.layouts(), dashboard.layouts());
        assert!(restored.is_selected("May 2024"));
        assert_eq!(restored.chart_data("avg_body_fat_month").unwrap().len(), 12);

        let next = restored.add_chart(&ChartConfigPatch::new()).unwrap();
        assert_eq!(next.as_str(), "2");
    }

    #[test]
    fn test_restore_fills_missing_placements_and_drops_orphans() {
        let mut dashboard = dashboard();
        let mut layouts = Layouts::new();
        layouts.insert(BREAKPOINT_SM.to_string(), vec![LayoutItem::new("0", 0, 0, 1, 1)]);
        layouts.insert("xl".to_string(), vec![LayoutItem::new("ghost", 0, 0, 4, 1)]);
        let snapshot = DashboardSnapshot {
            charts: vec![ChartConfig::seed(SEED_CHART_ID)],
            layouts,
            selected_time_periods: Vec::new(),
        };

        dashboard.restore(snapshot).unwrap();

        let zero = ChartId::from(SEED_CHART_ID);
        let store = dashboard.layout_store();
        assert_eq!(store.chart_ids(BREAKPOINT_SM), vec![&zero]);
        assert_eq!(store.chart_ids("xl"), vec![&zero]);
        assert_eq!(store.chart_ids(BREAKPOINT_MAIN), vec![&zero]);
        assert_eq!(store.breakpoint(BREAKPOINT_SM).unwrap()[0], LayoutItem::new("0", 0, 0, 1, 1));
    }

    #[test]
    fn test_restore_reports_cleared_series_first() {
        let mut dashboard = dashboard();
        let snapshot = dashboard.snapshot();
        let events = record(&mut dashboard);

        dashboard.restore(snapshot).unwrap();

        let events = events.borrow();
        assert_eq!(
            events[0],
            DashboardEvent::SeriesEvicted {
                keys: vec![SeriesKey::new(Aggregation::Avg, "total_weight", TimeGrain::Month)],
            }
        );
        assert_eq!(events[1].slice(), Slice::Series);
    }

    #[test]
    fn test_restore_rejects_invalid_snapshot() {
        let mut dashboard = dashboard();
        let before = dashboard.snapshot();

        let mut bad = before.clone();
        bad.charts.push(ChartConfig::seed(SEED_CHART_ID));
        assert!(matches!(
            dashboard.restore(bad),
            Err(DashboardError::DuplicateChart(_))
        ));

        let mut unknown = before.clone();
        unknown.charts[0].y_axis_var = "steps".to_string();
        assert!(dashboard.restore(unknown).is_err());

        assert_eq!(dashboard.snapshot(), before);
    }
}
