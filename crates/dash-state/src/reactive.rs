//! Leptos bridge: one revision signal per state slice, bumped by a
//! dashboard subscription, so views re-render only for the slices they read.

use crate::{ChartView, ConfigChange, Dashboard, DashboardConfig, Slice};
use dash_core::{ChartConfig, ChartConfigPatch, ChartId, DashboardError, Layouts};
use leptos::prelude::*;

/// Revision counters, one per slice
#[derive(Clone, Copy)]
pub struct SliceRevisions {
    pub charts: RwSignal<u64>,
    pub series: RwSignal<u64>,
    pub layouts: RwSignal<u64>,
    pub selection: RwSignal<u64>,
}

impl SliceRevisions {
    fn new() -> Self {
        Self {
            charts: RwSignal::new(0),
            series: RwSignal::new(0),
            layouts: RwSignal::new(0),
            selection: RwSignal::new(0),
        }
    }

    pub fn signal(&self, slice: Slice) -> RwSignal<u64> {
        match slice {
            Slice::Charts => self.charts,
            Slice::Series => self.series,
            Slice::Layouts => self.layouts,
            Slice::Selection => self.selection,
        }
    }

    fn bump(&self, slice: Slice) {
        self.signal(slice).update(|rev| *rev += 1);
    }
}

/// Dashboard engine shared through Leptos context
#[derive(Clone, Copy)]
pub struct DashboardContext {
    store: StoredValue<Dashboard, LocalStorage>,
    pub revisions: SliceRevisions,
}

impl DashboardContext {
    pub fn new(config: DashboardConfig) -> Self {
        Self::from_dashboard(Dashboard::with_config(config))
    }

    pub fn from_dashboard(mut dashboard: Dashboard) -> Self {
        let revisions = SliceRevisions::new();
        dashboard.subscribe(move |event| revisions.bump(event.slice()));

        Self {
            store: StoredValue::new_local(dashboard),
            revisions,
        }
    }

    // ========================================================================
    // Tracked Reads
    // ========================================================================

    /// Read the dashboard, re-running the caller when any of `slices` changes
    pub fn read<R>(&self, slices: &[Slice], f: impl FnOnce(&Dashboard) -> R) -> Option<R> {
        for slice in slices {
            self.revisions.signal(*slice).track();
        }
        self.store.try_with_value(f)
    }

    pub fn chart_configs(&self) -> Vec<ChartConfig> {
        self.read(&[Slice::Charts], |d| d.chart_configs().to_vec())
            .unwrap_or_default()
    }

    pub fn chart_view(&self, chart_id: &ChartId) -> Option<ChartView> {
        self.read(Slice::all(), |d| d.chart_view(chart_id)).flatten()
    }

    pub fn chart_views(&self) -> Vec<ChartView> {
        self.read(Slice::all(), Dashboard::chart_views).unwrap_or_default()
    }

    pub fn layouts(&self) -> Layouts {
        self.read(&[Slice::Layouts], |d| d.layouts().clone())
            .unwrap_or_default()
    }

    pub fn is_selected(&self, time_period: &str) -> bool {
        self.read(&[Slice::Selection], |d| d.is_selected(time_period))
            .unwrap_or(false)
    }

    pub fn selected_time_periods(&self) -> Vec<String> {
        self.read(&[Slice::Selection], |d| {
            d.selected_time_periods().into_iter().map(str::to_string).collect()
        })
        .unwrap_or_default()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Mutate the dashboard; subscriptions bump the affected revisions
    pub fn update<R>(&self, f: impl FnOnce(&mut Dashboard) -> R) -> Option<R> {
        self.store.try_update_value(f)
    }

    /// `None` once the owning reactive scope is disposed
    pub fn set_chart_config(
        &self,
        chart_id: ChartId,
        patch: ChartConfigPatch,
    ) -> Option<Result<ConfigChange, DashboardError>> {
        self.update(|d| d.set_chart_config(chart_id, &patch))
    }

    pub fn add_chart(&self, patch: ChartConfigPatch) -> Option<ChartId> {
        match self.update(|d| d.add_chart(&patch))? {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Add chart rejected: {}", e);
                None
            }
        }
    }

    pub fn remove_chart(&self, chart_id: &ChartId) -> bool {
        self.update(|d| d.remove_chart(chart_id)).unwrap_or(false)
    }

    pub fn change_variable(&self, chart_id: &ChartId, y_axis_var: &str) {
        if let Some(Err(e)) = self.update(|d| d.change_variable(chart_id, y_axis_var)) {
            tracing::warn!("Variable change rejected for chart {}: {}", chart_id, e);
        }
    }

    pub fn toggle_chart_type(&self, chart_id: &ChartId) {
        self.update(|d| d.toggle_chart_type(chart_id));
    }

    pub fn cycle_time_grain(&self, chart_id: &ChartId) {
        self.update(|d| d.cycle_time_grain(chart_id));
    }

    pub fn set_layouts(&self, layouts: Layouts) {
        self.update(|d| d.set_layouts(layouts));
    }

    pub fn toggle_selection(&self, time_period: &str) {
        self.update(|d| d.toggle_selection(time_period));
    }

    pub fn reset_filters(&self) {
        self.update(Dashboard::reset_filters);
    }
}

// ============================================================================
// CONTEXT HELPERS
// ============================================================================

/// Construct the dashboard once and provide it to the component tree
pub fn provide_dashboard(config: DashboardConfig) -> DashboardContext {
    let ctx = DashboardContext::new(config);
    provide_context(ctx);
    ctx
}

/// Use dashboard from context
pub fn use_dashboard() -> DashboardContext {
    expect_context::<DashboardContext>()
}

/// Try to get dashboard from context (returns None if not provided)
pub fn try_use_dashboard() -> Option<DashboardContext> {
    use_context::<DashboardContext>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SEED_CHART_ID;

    fn ctx() -> DashboardContext {
        DashboardContext::new(DashboardConfig::new().seed(2))
    }

    #[test]
    fn test_mutations_bump_only_their_slices() {
        let ctx = ctx();

        ctx.toggle_selection("Jan 2024");
        assert_eq!(ctx.revisions.selection.get_untracked(), 1);
        assert_eq!(ctx.revisions.charts.get_untracked(), 0);

        ctx.toggle_chart_type(&SEED_CHART_ID.into());
        assert_eq!(ctx.revisions.charts.get_untracked(), 1);
        assert_eq!(ctx.revisions.series.get_untracked(), 0);

        ctx.cycle_time_grain(&SEED_CHART_ID.into());
        assert_eq!(ctx.revisions.series.get_untracked(), 1);
    }

    #[test]
    fn test_remove_chart_through_context() {
        let ctx = ctx();

        assert!(ctx.remove_chart(&SEED_CHART_ID.into()));
        assert!(ctx.chart_configs().is_empty());
        assert!(ctx.layouts().values().all(|items| items.is_empty()));
        assert_eq!(ctx.revisions.layouts.get_untracked(), 1);
    }

    #[test]
    fn test_add_chart_rejects_unknown_variable() {
        let ctx = ctx();
        assert!(ctx.add_chart(ChartConfigPatch::new().y_axis_var("steps")).is_none());
        assert_eq!(ctx.chart_configs().len(), 1);
    }
}
