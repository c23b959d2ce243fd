//! Chart data resolution.
//!
//! The configuration store asks a [`ChartDataResolver`] for a chart's series
//! whenever its data triple changes. The synthetic resolver below fabricates
//! plausible monthly values; a real data source plugs in behind the same trait.

use chrono::{Datelike, Local, NaiveDate};
use dash_core::{ChartConfig, SERIES_LEN, Series, SeriesPoint};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

// ============================================================================
// STRATEGY PATTERN: Resolver Trait
// ============================================================================

/// Produces the ordered series for a chart configuration
pub trait ChartDataResolver {
    /// Exactly [`SERIES_LEN`] buckets, oldest first, ending at the current month
    fn resolve(&mut self, config: &ChartConfig) -> Series;
}

// ============================================================================
// SYNTHETIC RESOLVER
// ============================================================================

/// Value generator for one variable: `center + offset + U(0, 1) * spread`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticProfile {
    pub center: f64,
    pub offset: f64,
    pub spread: f64,
}

impl SyntheticProfile {
    pub const fn new(center: f64, offset: f64, spread: f64) -> Self {
        Self {
            center,
            offset,
            spread,
        }
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        self.center + self.offset + rng.r#gen::<f64>() * self.spread
    }

    /// Bounds of values this profile can produce
    pub fn bounds(&self) -> (f64, f64) {
        let low = self.center + self.offset;
        (low, low + self.spread)
    }

    /// Profile for a catalog variable; unknown variables have none
    pub fn for_variable(var: &str) -> Option<Self> {
        match var {
            "total_weight" => Some(Self::new(180.0, -5.0, 10.0)),
            "muscle_mass" => Some(Self::new(150.0, 0.0, 5.0)),
            "body_fat" => Some(Self::new(15.0, 0.0, 2.0)),
            _ => None,
        }
    }
}

/// Fabricates twelve trailing monthly buckets per request
pub struct SyntheticResolver {
    rng: StdRng,
    /// Fixed "today"; `None` reads the local clock on every resolve
    anchor: Option<NaiveDate>,
}

impl SyntheticResolver {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            anchor: None,
        }
    }

    /// Deterministic values for tests and demos
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            anchor: None,
        }
    }

    /// Pin the month the series ends on
    pub fn anchored_at(mut self, today: NaiveDate) -> Self {
        self.anchor = Some(today);
        self
    }

    fn today(&self) -> NaiveDate {
        self.anchor.unwrap_or_else(|| Local::now().date_naive())
    }
}

impl Default for SyntheticResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartDataResolver for SyntheticResolver {
    fn resolve(&mut self, config: &ChartConfig) -> Series {
        let profile = SyntheticProfile::for_variable(&config.y_axis_var);
        let months = trailing_months(self.today(), SERIES_LEN);

        let points = months
            .into_iter()
            .map(|start| {
                let value = profile.map_or(0.0, |p| p.sample(&mut self.rng));
                SeriesPoint::new(start).with_value(config.y_axis_var.clone(), value)
            })
            .collect();

        tracing::debug!(
            "Resolved synthetic series {} ({} buckets)",
            config.series_key(),
            SERIES_LEN
        );

        Series::new(points)
    }
}

/// First days of the `count` months ending with the month containing `today`,
/// oldest first
pub fn trailing_months(today: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let current = today.year() * 12 + today.month0() as i32;

    (0..count as i32)
        .rev()
        .filter_map(|back| {
            let index = current - back;
            NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        })
        .collect()
}
