//! Aggregation catalog: the measurable quantities a chart can plot,
//! their labels per aggregation mode, unit overrides and display format.

use crate::{Aggregation, ChartType, DashboardError, ValueFormat};

/// Catalog entry for a single y-axis variable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VariableSpec {
    pub key: &'static str,
    /// Label used in pickers and multi-series legends
    pub base_label: &'static str,
    pub sum_label: &'static str,
    pub avg_label: &'static str,
    /// Unit override when summed
    pub sum_unit: Option<&'static str>,
    /// Unit override when averaged
    pub avg_unit: Option<&'static str>,
    pub format: ValueFormat,
}

impl VariableSpec {
    pub fn label(&self, aggregation: Aggregation) -> &'static str {
        match aggregation {
            Aggregation::Sum => self.sum_label,
            Aggregation::Avg => self.avg_label,
        }
    }

    pub fn unit(&self, aggregation: Aggregation) -> Option<&'static str> {
        match aggregation {
            Aggregation::Sum => self.sum_unit,
            Aggregation::Avg => self.avg_unit,
        }
    }

    /// Every catalog entry currently defines both modes
    pub fn supports(&self, aggregation: Aggregation) -> bool {
        !self.label(aggregation).is_empty()
    }

    /// Monetary quantities read better as bars
    pub fn preferred_chart_type(&self) -> ChartType {
        if self.sum_unit == Some("$") {
            ChartType::Bar
        } else {
            ChartType::Line
        }
    }
}

pub static CATALOG: &[VariableSpec] = &[
    VariableSpec {
        key: "total_weight",
        base_label: "Body Composition",
        sum_label: "Body Composition",
        avg_label: "Body Composition",
        sum_unit: Some("lbs"),
        avg_unit: None,
        format: ValueFormat::Mass { unit: "lbs" },
    },
    VariableSpec {
        key: "muscle_mass",
        base_label: "Muscle Mass",
        sum_label: "Total Muscle Mass",
        avg_label: "Average Muscle Mass",
        sum_unit: Some("lbs"),
        avg_unit: None,
        format: ValueFormat::Mass { unit: "lbs" },
    },
    VariableSpec {
        key: "body_fat",
        base_label: "Body Fat %",
        sum_label: "Total Body Fat %",
        avg_label: "Average Body Fat %",
        sum_unit: Some("%"),
        avg_unit: None,
        format: ValueFormat::Percent,
    },
];

pub fn variables() -> &'static [VariableSpec] {
    CATALOG
}

pub fn lookup(key: &str) -> Option<&'static VariableSpec> {
    CATALOG.iter().find(|spec| spec.key == key)
}

/// Chart title for a variable under an aggregation mode; unknown keys echo back
pub fn label<'a>(key: &'a str, aggregation: Aggregation) -> &'a str {
    lookup(key).map_or(key, |spec| spec.label(aggregation))
}

pub fn base_label(key: &str) -> &str {
    lookup(key).map_or(key, |spec| spec.base_label)
}

pub fn unit(key: &str, aggregation: Aggregation) -> Option<&'static str> {
    lookup(key).and_then(|spec| spec.unit(aggregation))
}

/// Chart type applied when the user swaps a chart to `key`
pub fn infer_chart_type(key: &str) -> ChartType {
    lookup(key).map_or(ChartType::Line, VariableSpec::preferred_chart_type)
}

/// Legend label: single-series charts read "Total"
pub fn series_label<'a>(series_count: usize, key: &'a str) -> &'a str {
    if series_count == 1 {
        "Total"
    } else {
        base_label(key)
    }
}

/// Check that `key` exists and defines `aggregation`
pub fn validate(key: &str, aggregation: Aggregation) -> Result<&'static VariableSpec, DashboardError> {
    let spec = lookup(key).ok_or_else(|| DashboardError::UnknownVariable(key.to_string()))?;
    if !spec.supports(aggregation) {
        return Err(DashboardError::UnsupportedAggregation {
            variable: key.to_string(),
            aggregation,
        });
    }
    Ok(spec)
}
