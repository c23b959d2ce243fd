//! Per-breakpoint grid placement, independent of chart configuration

use dash_core::{next_free_row, ChartId, LayoutItem, Layouts};
use std::collections::HashSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutStore {
    layouts: Layouts,
}

impl LayoutStore {
    pub fn new(layouts: Layouts) -> Self {
        Self { layouts }
    }

    pub fn layouts(&self) -> &Layouts {
        &self.layouts
    }

    pub fn breakpoint(&self, name: &str) -> Option<&[LayoutItem]> {
        self.layouts.get(name).map(Vec::as_slice)
    }

    /// Bulk replace, last write wins; geometry is taken as-is
    pub fn set_layouts(&mut self, layouts: Layouts) {
        self.layouts = layouts;
    }

    /// Append `item` to a breakpoint, creating the breakpoint if needed
    pub fn place(&mut self, breakpoint: &str, item: LayoutItem) {
        self.layouts.entry(breakpoint.to_string()).or_default().push(item);
    }

    /// Remove the chart from every breakpoint; returns whether anything was removed
    pub fn remove_chart(&mut self, chart_id: &ChartId) -> bool {
        let mut removed = false;
        for items in self.layouts.values_mut() {
            let before = items.len();
            items.retain(|item| &item.chart_id != chart_id);
            removed |= items.len() != before;
        }
        removed
    }

    /// Lowest free row for a breakpoint
    pub fn next_row(&self, breakpoint: &str) -> i32 {
        self.breakpoint(breakpoint).map_or(0, next_free_row)
    }

    pub fn breakpoints(&self) -> impl Iterator<Item = &str> {
        self.layouts.keys().map(String::as_str)
    }

    /// Chart ids placed at a breakpoint, in layout order
    pub fn chart_ids(&self, breakpoint: &str) -> Vec<&ChartId> {
        self.breakpoint(breakpoint)
            .map_or_else(Vec::new, |items| items.iter().map(|i| &i.chart_id).collect())
    }

    /// Keep only the first placement of each id in `live`, per breakpoint.
    /// Returns the ids dropped.
    pub fn retain_charts(&mut self, live: &HashSet<&ChartId>) -> Vec<ChartId> {
        let mut dropped = Vec::new();
        for items in self.layouts.values_mut() {
            let mut placed = HashSet::new();
            items.retain(|item| {
                let keep = live.contains(&item.chart_id) && placed.insert(item.chart_id.clone());
                if !keep {
                    dropped.push(item.chart_id.clone());
                }
                keep
            });
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.layouts.clear();
    }
}
