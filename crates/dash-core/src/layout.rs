//! Grid layout geometry, per breakpoint

use crate::ChartId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Primary (wide) breakpoint
pub const BREAKPOINT_MAIN: &str = "main";
/// Narrow breakpoint
pub const BREAKPOINT_SM: &str = "sm";

/// Placement of one chart card on the grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutItem {
    #[serde(rename = "i")]
    pub chart_id: ChartId,
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    #[serde(rename = "maxH", default, skip_serializing_if = "Option::is_none")]
    pub max_h: Option<i32>,
}

impl LayoutItem {
    pub fn new(chart_id: impl Into<ChartId>, x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            chart_id: chart_id.into(),
            x,
            y,
            w,
            h,
            max_h: None,
        }
    }

    pub fn with_max_h(mut self, max_h: i32) -> Self {
        self.max_h = Some(max_h);
        self
    }

    /// Row just below this item, clamped at `i32::MAX`
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.h)
    }
}

/// Layout lists keyed by breakpoint name
pub type Layouts = BTreeMap<String, Vec<LayoutItem>>;

/// Lowest free row in a breakpoint's layout
pub fn next_free_row(items: &[LayoutItem]) -> i32 {
    items.iter().map(LayoutItem::bottom).max().unwrap_or(0).max(0)
}
