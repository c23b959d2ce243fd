//! # dash-core
//!
//! Core domain types for the chart grid dashboard.
//! Implements Strategy pattern for value formatting.

pub mod catalog;
pub mod error;
pub mod format;
pub mod layout;
pub mod series;

pub use catalog::*;
pub use error::*;
pub use format::*;
pub use layout::*;
pub use series::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// CORE VALUE TYPES
// ============================================================================

/// Chart identifier, unique within a dashboard (e.g., "0", "1")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChartId(pub String);

impl ChartId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ChartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ChartId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ChartId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// How values are combined across a time bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    Sum,
    #[default]
    Avg,
}

impl Aggregation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Avg => "avg",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Sum => "Sum",
            Self::Avg => "Average",
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Sum, Self::Avg]
    }
}

impl std::fmt::Display for Aggregation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Aggregation {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sum" => Ok(Self::Sum),
            "avg" => Ok(Self::Avg),
            other => Err(DashboardError::UnknownAggregation(other.to_string())),
        }
    }
}

/// X-axis bucketing unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrain {
    #[default]
    Month,
    Quarter,
    Year,
}

impl TimeGrain {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Month => "Month",
            Self::Quarter => "Quarter",
            Self::Year => "Year",
        }
    }

    /// Next grain in the toolbar cycle (month -> quarter -> year -> month)
    pub fn next(&self) -> Self {
        match self {
            Self::Month => Self::Quarter,
            Self::Quarter => Self::Year,
            Self::Year => Self::Month,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Month, Self::Quarter, Self::Year]
    }
}

impl std::fmt::Display for TimeGrain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeGrain {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(DashboardError::UnknownTimeGrain(other.to_string())),
        }
    }
}

/// Chart rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Bar,
}

impl ChartType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Bar => "bar",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Line => "Line",
            Self::Bar => "Bar",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            Self::Line => Self::Bar,
            Self::Bar => Self::Line,
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(Self::Line),
            "bar" => Ok(Self::Bar),
            other => Err(DashboardError::UnknownChartType(other.to_string())),
        }
    }
}

// ============================================================================
// CHART CONFIGURATION
// ============================================================================

/// Variable shown by the seed chart
pub const DEFAULT_Y_AXIS_VAR: &str = "total_weight";

/// What a single chart displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart_id: ChartId,
    pub y_axis_var: String,
    pub x_axis_var: TimeGrain,
    pub aggregation: Aggregation,
    pub chart_type: ChartType,
}

impl ChartConfig {
    /// Seed configuration: average total weight by month, drawn as a line
    pub fn seed(chart_id: impl Into<ChartId>) -> Self {
        Self {
            chart_id: chart_id.into(),
            y_axis_var: DEFAULT_Y_AXIS_VAR.to_string(),
            x_axis_var: TimeGrain::Month,
            aggregation: Aggregation::Avg,
            chart_type: ChartType::Line,
        }
    }

    /// Cache key for this configuration's series
    pub fn series_key(&self) -> SeriesKey {
        SeriesKey::new(self.aggregation, &self.y_axis_var, self.x_axis_var)
    }

    /// Merge a partial update into this configuration
    pub fn apply(&mut self, patch: &ChartConfigPatch) {
        if let Some(var) = &patch.y_axis_var {
            self.y_axis_var = var.clone();
        }
        if let Some(grain) = patch.x_axis_var {
            self.x_axis_var = grain;
        }
        if let Some(agg) = patch.aggregation {
            self.aggregation = agg;
        }
        if let Some(chart_type) = patch.chart_type {
            self.chart_type = chart_type;
        }
    }

    /// True when `other` would resolve to different series data
    pub fn data_differs(&self, other: &ChartConfig) -> bool {
        self.y_axis_var != other.y_axis_var
            || self.x_axis_var != other.x_axis_var
            || self.aggregation != other.aggregation
    }
}

/// Partial chart configuration; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChartConfigPatch {
    pub y_axis_var: Option<String>,
    pub x_axis_var: Option<TimeGrain>,
    pub aggregation: Option<Aggregation>,
    pub chart_type: Option<ChartType>,
}

impl ChartConfigPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn y_axis_var(mut self, var: impl Into<String>) -> Self {
        self.y_axis_var = Some(var.into());
        self
    }

    pub fn x_axis_var(mut self, grain: TimeGrain) -> Self {
        self.x_axis_var = Some(grain);
        self
    }

    pub fn aggregation(mut self, agg: Aggregation) -> Self {
        self.aggregation = Some(agg);
        self
    }

    pub fn chart_type(mut self, chart_type: ChartType) -> Self {
        self.chart_type = Some(chart_type);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.y_axis_var.is_none()
            && self.x_axis_var.is_none()
            && self.aggregation.is_none()
            && self.chart_type.is_none()
    }
}

impl From<&ChartConfig> for ChartConfigPatch {
    fn from(config: &ChartConfig) -> Self {
        Self {
            y_axis_var: Some(config.y_axis_var.clone()),
            x_axis_var: Some(config.x_axis_var),
            aggregation: Some(config.aggregation),
            chart_type: Some(config.chart_type),
        }
    }
}

/// Series cache key derived from (aggregation, variable, grain),
/// rendered as e.g. `avg_total_weight_month`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesKey(String);

impl SeriesKey {
    pub fn new(aggregation: Aggregation, y_axis_var: &str, x_axis_var: TimeGrain) -> Self {
        Self(format!("{}_{}_{}", aggregation, y_axis_var, x_axis_var))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for SeriesKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// COLOR CONSTANTS
// ============================================================================

pub mod colors {
    /// Single-series charts
    pub const DEFAULT_DATA: &str = "#228be6";
    pub const SELECTED_POINT: &str = "#fa5252";
    pub const HOVER_POINT: &str = "#fab005";

    /// Multi-series palette, cycled by series index
    pub const SERIES: [&str; 8] = [
        "#228be6", "#12b886", "#fa5252", "#fab005", "#7950f2", "#e64980", "#be4bdb", "#fd7e14",
    ];

    pub fn series_color(index: usize, series_count: usize) -> &'static str {
        if series_count <= 1 {
            DEFAULT_DATA
        } else {
            SERIES[index % SERIES.len()]
        }
    }
}
