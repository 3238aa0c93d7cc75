//! Timestamp grid and the deterministic base signal of each metric.

use crate::models::catalog::MetricKind;
use crate::services::params::WellParameters;
use crate::utils::start_of_day;
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Equally spaced UTC timestamps: `start + i * step` for `i in 0..len`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TimeGrid {
    start: DateTime<Utc>,
    step_minutes: i64,
    len: usize,
}

impl TimeGrid {
    /// Covers `[start_date 00:00, end_date 00:00]`, both endpoints included.
    pub fn covering(start_date: NaiveDate, end_date: NaiveDate, step_minutes: u32) -> Result<Self, String> {
        if start_date > end_date {
            return Err(format!("grid start {} is after grid end {}", start_date, end_date));
        }
        if step_minutes == 0 {
            return Err("grid step must be positive".to_string());
        }
        let start = start_of_day(start_date);
        let span = (start_of_day(end_date) - start).num_minutes();
        let step_minutes = i64::from(step_minutes);
        Ok(TimeGrid {
            start,
            step_minutes,
            len: (span / step_minutes) as usize + 1,
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Last timestamp on the grid.
    pub fn end(&self) -> DateTime<Utc> {
        self.timestamp(self.len - 1)
    }

    pub fn timestamp(&self, index: usize) -> DateTime<Utc> {
        self.start + Duration::minutes(self.step_minutes * index as i64)
    }

    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.len).map(|i| self.timestamp(i))
    }

    /// Whole days since the first timestamp; the time of day is discarded.
    pub fn elapsed_days(&self, index: usize) -> i64 {
        (self.step_minutes * index as i64) / MINUTES_PER_DAY
    }

    /// Indices whose timestamps fall inside `[from, to]`, or `None` when the grid misses the interval.
    pub fn index_span(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> Option<(usize, usize)> {
        if to < from || to < self.start || from > self.end() {
            return None;
        }
        let from_minutes = (from - self.start).num_minutes().max(0);
        let to_minutes = (to - self.start).num_minutes();
        // ceil for the lower bound, floor for the upper one
        let first = (from_minutes + self.step_minutes - 1) / self.step_minutes;
        let last = (to_minutes / self.step_minutes).min(self.len as i64 - 1);
        (first <= last).then_some((first as usize, last as usize))
    }
}

/// Base signal of one metric with its parameters bound in.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Waveform {
    /// `initial * exp(-rate_per_day * elapsed_days)`
    Decline { initial: f64, rate_per_day: f64 },
    Constant(f64),
}

/// Value used for metrics outside the modelled catalog.
pub const PLACEHOLDER_VALUE: f64 = 100.0;

impl Waveform {
    pub fn for_metric(kind: MetricKind, params: &WellParameters) -> Self {
        match kind {
            MetricKind::OilProduction => Waveform::Decline {
                initial: params.initial_rate,
                rate_per_day: params.decline_rate,
            },
            MetricKind::GasProduction => Waveform::Decline {
                initial: params.initial_rate * params.gas_oil_ratio,
                rate_per_day: params.decline_rate,
            },
            // Reservoir pressure depletes at half the production decline rate.
            MetricKind::WellheadPressure => Waveform::Decline {
                initial: params.initial_wellhead_pressure,
                rate_per_day: 0.5 * params.decline_rate,
            },
            MetricKind::TubingPressure => Waveform::Decline {
                initial: params.initial_tubing_pressure,
                rate_per_day: 0.5 * params.decline_rate,
            },
            MetricKind::GasInjection => Waveform::Constant(params.injection_rate.unwrap_or(0.0)),
            MetricKind::Other => Waveform::Constant(PLACEHOLDER_VALUE),
        }
    }

    pub fn synthesize(&self, grid: &TimeGrid) -> Vec<f64> {
        match *self {
            Waveform::Constant(value) => vec![value; grid.len()],
            Waveform::Decline { initial, rate_per_day } => {
                let mut values = Vec::with_capacity(grid.len());
                // The factor only changes once per day; avoid an exp() per minute.
                let mut day = -1;
                let mut factor = 0.0;
                for index in 0..grid.len() {
                    let elapsed = grid.elapsed_days(index);
                    if elapsed != day {
                        day = elapsed;
                        factor = (-rate_per_day * elapsed as f64).exp();
                    }
                    values.push(initial * factor);
                }
                values
            }
        }
    }
}
