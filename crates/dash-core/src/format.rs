//! Value formatting for tooltips, axis labels and exports.
//! The rule is keyed by variable identity through the catalog.

use crate::{catalog, Aggregation};

// ============================================================================
// STRATEGY PATTERN: Formatters
// ============================================================================

/// Strategy trait for rendering a single numeric value
pub trait ValueFormatter: Send + Sync {
    fn format(&self, value: f64) -> String;
}

/// One decimal place and a trailing `%`
#[derive(Debug, Clone, Default)]
pub struct PercentFormatter;

impl ValueFormatter for PercentFormatter {
    fn format(&self, value: f64) -> String {
        format!("{:.1}%", value)
    }
}

/// Fixed decimals followed by a unit suffix (e.g. "183.3 lbs")
#[derive(Debug, Clone)]
pub struct UnitFormatter {
    pub unit: &'static str,
    pub decimals: usize,
}

impl UnitFormatter {
    pub fn new(unit: &'static str) -> Self {
        Self { unit, decimals: 1 }
    }
}

impl ValueFormatter for UnitFormatter {
    fn format(&self, value: f64) -> String {
        format!("{:.prec$} {}", value, self.unit, prec = self.decimals)
    }
}

/// Thousands grouping with up to `max_fraction_digits` decimals, no suffix
#[derive(Debug, Clone)]
pub struct GroupedFormatter {
    pub max_fraction_digits: usize,
}

impl Default for GroupedFormatter {
    fn default() -> Self {
        Self {
            max_fraction_digits: 3,
        }
    }
}

impl ValueFormatter for GroupedFormatter {
    fn format(&self, value: f64) -> String {
        let fixed = format!("{:.prec$}", value.abs(), prec = self.max_fraction_digits);
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac)) => (int_part, frac.trim_end_matches('0')),
            None => (fixed.as_str(), ""),
        };

        let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
        let is_zero = int_part.bytes().all(|b| b == b'0') && frac_part.is_empty();
        if value < 0.0 && !is_zero {
            out.push('-');
        }

        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }

        if !frac_part.is_empty() {
            out.push('.');
            out.push_str(frac_part);
        }

        out
    }
}

/// Which formatter a catalog variable uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    Percent,
    Mass { unit: &'static str },
    #[default]
    Grouped,
}

impl ValueFormat {
    pub fn formatter(&self) -> Box<dyn ValueFormatter> {
        match *self {
            Self::Percent => Box::new(PercentFormatter),
            Self::Mass { unit } => Box::new(UnitFormatter::new(unit)),
            Self::Grouped => Box::new(GroupedFormatter::default()),
        }
    }

    pub fn format(&self, value: f64) -> String {
        match *self {
            Self::Percent => PercentFormatter.format(value),
            Self::Mass { unit } => UnitFormatter::new(unit).format(value),
            Self::Grouped => GroupedFormatter::default().format(value),
        }
    }
}

/// Format a value for display. Absent and non-finite values render as "".
///
/// The aggregation mode is accepted for parity with chart callbacks; the
/// current rules depend only on the variable.
pub fn format_value(y_axis_var: &str, value: Option<f64>, _aggregation: Aggregation) -> String {
    match value {
        Some(v) if v.is_finite() => catalog::lookup(y_axis_var)
            .map_or(ValueFormat::Grouped, |spec| spec.format)
            .format(v),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_variable() {
        assert_eq!(format_value("body_fat", Some(15.04), Aggregation::Avg), "15.0%");
    }

    #[test]
    fn test_mass_variable() {
        assert_eq!(format_value("total_weight", Some(183.27), Aggregation::Sum), "183.3 lbs");
        assert_eq!(format_value("muscle_mass", Some(150.0), Aggregation::Avg), "150.0 lbs");
    }

    #[test]
    fn test_absent_value_is_empty() {
        assert_eq!(format_value("total_weight", None, Aggregation::Avg), "");
        assert_eq!(format_value("body_fat", Some(f64::NAN), Aggregation::Avg), "");
    }

    #[test]
    fn test_grouped_fallback() {
        assert_eq!(format_value("steps", Some(1_234_567.891), Aggregation::Sum), "1,234,567.891");
        assert_eq!(format_value("steps", Some(1500.5), Aggregation::Sum), "1,500.5");
        assert_eq!(format_value("steps", Some(42.0), Aggregation::Sum), "42");
        assert_eq!(format_value("steps", Some(-9876.0), Aggregation::Sum), "-9,876");
        assert_eq!(format_value("steps", Some(0.0001), Aggregation::Sum), "0");
    }

    #[test]
    fn test_formatter_strategy() {
        let formatter = ValueFormat::Mass { unit: "kg" }.formatter();
        assert_eq!(formatter.format(72.26), "72.3 kg");
        assert_eq!(UnitFormatter { unit: "lbs", decimals: 0 }.format(180.4), "180 lbs");
    }
}
