//! Multiplicative modifiers applied on top of a base waveform.
//!
//! The stages run in a fixed order because each multiplies the output of the previous one:
//! seasonal modulation, Gaussian noise, maintenance suppression, then the zero floor for
//! flow metrics.

use crate::config::{GeneratorConfig, MaintenanceConfig};
use crate::models::catalog::MetricKind;
use crate::services::waveform::TimeGrid;
use chrono::{DateTime, Datelike, Duration, Utc};
use rand::Rng;
use rand::rngs::SmallRng;
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;

/// A shutdown window; both bounds are inclusive.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MaintenancePeriod {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl MaintenancePeriod {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// Day-stepping shutdown process over the grid.
///
/// Starting at the first timestamp, each day a shutdown begins with `daily_probability`.
/// A shutdown lasts `min_days..=max_days` whole days, after which `cooldown_days` are skipped
/// before trials resume.
pub fn generate_maintenance_periods(
    grid: &TimeGrid,
    cfg: &MaintenanceConfig,
    rng: &mut SmallRng,
) -> Vec<MaintenancePeriod> {
    let mut periods = Vec::new();
    let last = grid.end();
    let mut current = grid.start();
    while current < last {
        if rng.random::<f64>() < cfg.daily_probability {
            let days = rng.random_range(cfg.min_days..=cfg.max_days);
            let end = current + Duration::days(i64::from(days));
            periods.push(MaintenancePeriod { start: current, end });
            // a zero-length shutdown without cooldown must still move on
            current = (end + Duration::days(i64::from(cfg.cooldown_days))).max(current + Duration::days(1));
        } else {
            current += Duration::days(1);
        }
    }
    periods
}

/// `value * (1 + amplitude * sin(2π * day_of_year / 365))`, day of year in 1..=366.
pub fn apply_seasonal(mut values: Vec<f64>, grid: &TimeGrid, amplitude: f64) -> Vec<f64> {
    if amplitude == 0.0 {
        return values;
    }
    let mut day = -1;
    let mut factor = 1.0;
    for (index, value) in values.iter_mut().enumerate() {
        let elapsed = grid.elapsed_days(index);
        if elapsed != day {
            day = elapsed;
            let ordinal = grid.timestamp(index).ordinal() as f64;
            factor = 1.0 + amplitude * (2.0 * PI * ordinal / 365.0).sin();
        }
        *value *= factor;
    }
    values
}

/// Independent multiplicative noise, one draw per point.
pub fn apply_noise(mut values: Vec<f64>, noise: &Normal<f64>, rng: &mut SmallRng) -> Vec<f64> {
    for value in values.iter_mut() {
        *value *= noise.sample(rng);
    }
    values
}

pub fn suppress_maintenance(
    mut values: Vec<f64>,
    grid: &TimeGrid,
    periods: &[MaintenancePeriod],
    factor: f64,
) -> Vec<f64> {
    for period in periods {
        if let Some((first, last)) = grid.index_span(period.start, period.end) {
            for value in &mut values[first..=last] {
                *value *= factor;
            }
        }
    }
    values
}

/// Floors finite values at zero. NaN and infinities pass through for the finiteness check.
pub fn clamp_non_negative(mut values: Vec<f64>) -> Vec<f64> {
    for value in values.iter_mut().filter(|v| v.is_finite()) {
        *value = value.max(0.0);
    }
    values
}

/// The modifier stages bound to one well: its grid, tuning and maintenance schedule.
pub struct ModifierPipeline<'a> {
    grid: &'a TimeGrid,
    seasonal_amplitude: f64,
    noise: Normal<f64>,
    maintenance: &'a [MaintenancePeriod],
    suppression_factor: f64,
}

impl<'a> ModifierPipeline<'a> {
    pub fn new(
        grid: &'a TimeGrid,
        cfg: &GeneratorConfig,
        maintenance: &'a [MaintenancePeriod],
    ) -> Result<Self, String> {
        let noise = Normal::new(1.0, cfg.noise_amplitude)
            .map_err(|e| format!("invalid noise_amplitude {}: {}", cfg.noise_amplitude, e))?;
        Ok(ModifierPipeline {
            grid,
            seasonal_amplitude: cfg.seasonal_amplitude,
            noise,
            maintenance,
            suppression_factor: cfg.maintenance.suppression_factor,
        })
    }

    /// Runs every stage on `values`. Noise consumes exactly one draw per point from `rng`.
    pub fn apply(&self, kind: MetricKind, values: Vec<f64>, rng: &mut SmallRng) -> Vec<f64> {
        let values = apply_seasonal(values, self.grid, self.seasonal_amplitude);
        let values = apply_noise(values, &self.noise, rng);
        if !kind.is_flow() {
            return values;
        }
        let values = suppress_maintenance(values, self.grid, self.maintenance, self.suppression_factor);
        clamp_non_negative(values)
    }
}
