//! Serializable dashboard snapshot (charts, layouts, selection).
//!
//! Series are not stored; they are regenerated on restore.

use dash_core::{ChartConfig, DashboardError, Layouts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub charts: Vec<ChartConfig>,
    pub layouts: Layouts,
    #[serde(default)]
    pub selected_time_periods: Vec<String>,
}

impl DashboardSnapshot {
    pub fn to_json(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, DashboardError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, DashboardError> {
        Ok(serde_json::from_str(json)?)
    }
}
