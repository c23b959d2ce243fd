//! Error type for the few fallible dashboard edges

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("unknown variable: {0}")]
    UnknownVariable(String),
    #[error("aggregation {aggregation} is not defined for variable {variable}")]
    UnsupportedAggregation {
        variable: String,
        aggregation: crate::Aggregation,
    },
    #[error("unknown aggregation: {0}")]
    UnknownAggregation(String),
    #[error("unknown time grain: {0}")]
    UnknownTimeGrain(String),
    #[error("unknown chart type: {0}")]
    UnknownChartType(String),
    #[error("duplicate chart id in snapshot: {0}")]
    DuplicateChart(crate::ChartId),
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
}
