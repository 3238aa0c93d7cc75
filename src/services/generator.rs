//! Synthetic dataset generation: well metadata, the metric catalog and the
//! per-(well, metric) time series.
//!
//! Pipeline for every pair: resolve well parameters, synthesise the base waveform,
//! run the modifier stages, then assign quality flags. Pairs are independent and
//! run on the rayon pool; output order is always wells outer, metrics inner.

use crate::config::GeneratorConfig;
use crate::models::catalog::{METRIC_CATALOG, Metric, Well, WellType, well_id_for_index};
use crate::models::series::QualityFlag;
use crate::services::modifiers::{ModifierPipeline, generate_maintenance_periods};
use crate::services::params::{MAINTENANCE_LANE, METADATA_LANE, resolve_well_parameters, series_stream, sub_stream};
use crate::services::quality::assign_quality_flags;
use crate::services::waveform::{TimeGrid, Waveform};
use crate::utils::utc_seconds;
use chrono::{DateTime, Duration, Utc};
use log::debug;
use rand::Rng;
use rayon::prelude::*;
use serde::Serialize;

const FIELDS: [&str; 3] = ["North Field", "South Field", "East Field"];
const OPERATORS: [&str; 3] = ["Demo Energy Corp", "Example Oil LLC", "Test Petroleum Inc"];

#[derive(Debug)]
pub enum GenerationError {
    InvalidConfig(String),
    /// A synthesised value was NaN or infinite; the whole run is aborted.
    NumericFault {
        well_id: String,
        metric_name: String,
        timestamp: DateTime<Utc>,
        value: f64,
    },
}

impl core::fmt::Display for GenerationError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            GenerationError::InvalidConfig(s) => write!(f, "invalid generator config: {}", s),
            GenerationError::NumericFault {
                well_id,
                metric_name,
                timestamp,
                value,
            } => write!(
                f,
                "non-finite value {} for {}/{} at {}",
                value, well_id, metric_name, timestamp
            ),
        }
    }
}

impl std::error::Error for GenerationError {}

/// One generated (well, metric) series stored column-wise; timestamps come from the grid.
#[derive(Debug, Clone)]
pub struct SeriesBlock {
    pub well_id: String,
    pub metric_name: String,
    pub grid: TimeGrid,
    pub values: Vec<f64>,
    pub flags: Vec<QualityFlag>,
}

/// Row view of a [`SeriesBlock`] entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesRecord<'a> {
    #[serde(with = "utc_seconds")]
    pub timestamp: DateTime<Utc>,
    pub well_id: &'a str,
    pub metric_name: &'a str,
    pub value: f64,
    pub quality_flag: QualityFlag,
}

impl SeriesBlock {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn records(&self) -> impl Iterator<Item = SeriesRecord<'_>> + '_ {
        self.grid
            .iter()
            .zip(&self.values)
            .zip(&self.flags)
            .map(|((timestamp, value), flag)| SeriesRecord {
                timestamp,
                well_id: &self.well_id,
                metric_name: &self.metric_name,
                value: *value,
                quality_flag: *flag,
            })
    }
}

pub struct SyntheticGenerator {
    cfg: GeneratorConfig,
    grid: TimeGrid,
}

impl SyntheticGenerator {
    pub fn new(cfg: GeneratorConfig) -> Result<Self, GenerationError> {
        cfg.validate().map_err(GenerationError::InvalidConfig)?;
        let grid = TimeGrid::covering(cfg.data_start_date, cfg.data_end_date, cfg.frequency_minutes)
            .map_err(GenerationError::InvalidConfig)?;
        Ok(SyntheticGenerator { cfg, grid })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.cfg
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// `num_wells` wells with ids `WELL-001..`; each well draws from its own metadata stream.
    pub fn generate_well_metadata(&self) -> Vec<Well> {
        (0..self.cfg.num_wells).map(|index| self.well_metadata(index)).collect()
    }

    fn well_metadata(&self, index: usize) -> Well {
        let mut rng = sub_stream(self.cfg.seed, index, METADATA_LANE);
        let name_field = FIELDS[rng.random_range(0..FIELDS.len())];
        let letter = char::from(b'A' + (index % 26) as u8);
        let latitude = round4(rng.random_range(28.0..=32.0));
        let longitude = round4(rng.random_range(-97.0..=-93.0));
        let operator = OPERATORS[rng.random_range(0..OPERATORS.len())];
        let field_name = FIELDS[rng.random_range(0..FIELDS.len())];
        let well_type = WellType::ALL[rng.random_range(0..WellType::ALL.len())];
        let spud_offset = rng.random_range(180..=730);

        Well {
            well_id: well_id_for_index(index),
            well_name: format!("{} {} {}", name_field, letter, index + 1),
            latitude,
            longitude,
            operator: operator.to_string(),
            field_name: field_name.to_string(),
            well_type,
            spud_date: self.cfg.data_start_date - Duration::days(spud_offset),
            data_start_date: self.cfg.data_start_date,
            data_end_date: self.cfg.data_end_date,
        }
    }

    pub fn generate_metric_definitions(&self) -> Vec<Metric> {
        METRIC_CATALOG.iter().map(|spec| spec.to_metric()).collect()
    }

    /// Every (well, metric) pair, wells outer and metrics inner. `well_index` of a well is its
    /// position in `wells`.
    pub fn generate_timeseries(&self, wells: &[Well], metrics: &[Metric]) -> Result<Vec<SeriesBlock>, GenerationError> {
        let per_well = wells
            .par_iter()
            .enumerate()
            .map(|(index, well)| self.generate_well_series(index, well, metrics))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(per_well.into_iter().flatten().collect())
    }

    /// All metric series of one well, in `metrics` order.
    pub fn generate_well_series(
        &self,
        well_index: usize,
        well: &Well,
        metrics: &[Metric],
    ) -> Result<Vec<SeriesBlock>, GenerationError> {
        let params = resolve_well_parameters(&self.cfg, well_index, well.well_type);
        let mut maintenance_rng = sub_stream(self.cfg.seed, well_index, MAINTENANCE_LANE);
        let maintenance = generate_maintenance_periods(&self.grid, &self.cfg.maintenance, &mut maintenance_rng);
        debug!(
            "{}: {:?}, {} maintenance period(s)",
            well.well_id,
            params,
            maintenance.len()
        );
        let pipeline =
            ModifierPipeline::new(&self.grid, &self.cfg, &maintenance).map_err(GenerationError::InvalidConfig)?;

        metrics
            .par_iter()
            .enumerate()
            .map(|(metric_index, metric)| {
                let kind = metric.kind();
                let mut rng = series_stream(self.cfg.seed, well_index, metric_index);
                let base = Waveform::for_metric(kind, &params).synthesize(&self.grid);
                let values = pipeline.apply(kind, base, &mut rng);
                let flags = assign_quality_flags(values.len(), &mut rng);
                let block = SeriesBlock {
                    well_id: well.well_id.clone(),
                    metric_name: metric.metric_name.clone(),
                    grid: self.grid,
                    values,
                    flags,
                };
                check_finite(&block)?;
                Ok(block)
            })
            .collect()
    }
}

fn check_finite(block: &SeriesBlock) -> Result<(), GenerationError> {
    match block.values.iter().position(|v| !v.is_finite()) {
        None => Ok(()),
        Some(index) => Err(GenerationError::NumericFault {
            well_id: block.well_id.clone(),
            metric_name: block.metric_name.clone(),
            timestamp: block.grid.timestamp(index),
            value: block.values[index],
        }),
    }
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UniformRange;
    use crate::models::catalog::MetricKind;
    use chrono::NaiveDate;

    fn hourly_config() -> GeneratorConfig {
        GeneratorConfig {
            frequency_minutes: 60,
            ..GeneratorConfig::default()
        }
    }

    fn series<'a>(blocks: &'a [SeriesBlock], well_id: &str, metric: &str) -> &'a SeriesBlock {
        blocks
            .iter()
            .find(|b| b.well_id == well_id && b.metric_name == metric)
            .unwrap()
    }

    fn pearson(a: &[f64], b: &[f64]) -> f64 {
        let n = a.len() as f64;
        let mean_a = a.iter().sum::<f64>() / n;
        let mean_b = b.iter().sum::<f64>() / n;
        let mut cov = 0.0;
        let mut var_a = 0.0;
        let mut var_b = 0.0;
        for (x, y) in a.iter().zip(b) {
            cov += (x - mean_a) * (y - mean_b);
            var_a += (x - mean_a).powi(2);
            var_b += (y - mean_b).powi(2);
        }
        cov / (var_a.sqrt() * var_b.sqrt())
    }

    #[test]
    fn well_metadata_is_deterministic_and_well_formed() {
        let generator = SyntheticGenerator::new(GeneratorConfig::default()).unwrap();
        let wells = generator.generate_well_metadata();
        assert_eq!(wells, generator.generate_well_metadata());
        assert_eq!(wells.len(), 3);
        for (index, well) in wells.iter().enumerate() {
            assert_eq!(well.well_id, well_id_for_index(index));
            assert!((28.0..=32.0).contains(&well.latitude));
            assert!((-97.0..=-93.0).contains(&well.longitude));
            assert_eq!(well.latitude, round4(well.latitude));
            assert!(OPERATORS.contains(&well.operator.as_str()));
            assert!(FIELDS.contains(&well.field_name.as_str()));
            let age = (well.data_start_date - well.spud_date).num_days();
            assert!((180..=730).contains(&age));
            assert_eq!(well.data_end_date, NaiveDate::from_ymd_opt(2025, 12, 9).unwrap());
        }
        assert!(wells[1].well_name.ends_with(" B 2"), "{}", wells[1].well_name);
    }

    #[test]
    fn every_pair_covers_the_full_grid() {
        let generator = SyntheticGenerator::new(hourly_config()).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        let blocks = generator.generate_timeseries(&wells, &metrics).unwrap();
        assert_eq!(blocks.len(), wells.len() * metrics.len());

        // wells outer, metrics inner
        assert_eq!(blocks[0].well_id, "WELL-001");
        assert_eq!(blocks[1].metric_name, metrics[1].metric_name);
        assert_eq!(blocks[metrics.len()].well_id, "WELL-002");

        let expected = 365 * 24 + 1;
        for block in &blocks {
            assert_eq!(block.len(), expected);
            assert_eq!(block.flags.len(), expected);
            let stamps: Vec<_> = block.records().map(|r| r.timestamp).collect();
            for pair in stamps.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::hours(1));
            }
        }
    }

    #[test]
    fn flow_metrics_are_never_negative() {
        let cfg = GeneratorConfig {
            noise_amplitude: 0.8,
            ..hourly_config()
        };
        let generator = SyntheticGenerator::new(cfg).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        let blocks = generator.generate_timeseries(&wells, &metrics).unwrap();
        let mut pressure_went_negative = false;
        for block in &blocks {
            let kind = MetricKind::from_name(&block.metric_name);
            if kind.is_flow() {
                assert!(block.values.iter().all(|v| *v >= 0.0), "{}", block.metric_name);
            } else if block.values.iter().any(|v| *v < 0.0) {
                pressure_went_negative = true;
            }
        }
        assert!(pressure_went_negative);
    }

    #[test]
    fn same_seed_reproduces_the_dataset() {
        let a = SyntheticGenerator::new(hourly_config()).unwrap();
        let b = SyntheticGenerator::new(hourly_config()).unwrap();
        let wells = a.generate_well_metadata();
        let metrics = a.generate_metric_definitions();
        let left = a.generate_timeseries(&wells, &metrics).unwrap();
        let right = b.generate_timeseries(&wells, &metrics).unwrap();
        for (l, r) in left.iter().zip(&right) {
            assert_eq!(l.values, r.values);
            assert_eq!(l.flags, r.flags);
        }

        // a single well generated on its own matches the batch
        let solo = a.generate_well_series(1, &wells[1], &metrics).unwrap();
        assert_eq!(solo[0].values, left[metrics.len()].values);
    }

    #[test]
    fn wells_from_one_seed_differ() {
        let generator = SyntheticGenerator::new(hourly_config()).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        let blocks = generator.generate_timeseries(&wells, &metrics).unwrap();
        let first = series(&blocks, "WELL-001", "oil_production_rate");
        let second = series(&blocks, "WELL-002", "oil_production_rate");
        assert_ne!(first.values, second.values);
    }

    #[test]
    fn oil_and_gas_are_strongly_correlated() {
        let generator = SyntheticGenerator::new(hourly_config()).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        let blocks = generator.generate_timeseries(&wells, &metrics).unwrap();
        for well in &wells {
            let oil = series(&blocks, &well.well_id, "oil_production_rate");
            let gas = series(&blocks, &well.well_id, "gas_production_rate");
            let r = pearson(&oil.values, &gas.values);
            assert!(r > 0.5, "{}: r = {}", well.well_id, r);
        }
    }

    #[test]
    fn only_injectors_inject() {
        let generator = SyntheticGenerator::new(hourly_config()).unwrap();
        let metrics = generator.generate_metric_definitions();
        let mut wells = generator.generate_well_metadata();
        wells[0].well_type = WellType::Producer;
        wells[1].well_type = WellType::Injector;
        let blocks = generator.generate_timeseries(&wells[..2], &metrics).unwrap();

        let producer = series(&blocks, "WELL-001", "gas_injection_rate");
        assert!(producer.values.iter().all(|v| *v == 0.0));
        let injector = series(&blocks, "WELL-002", "gas_injection_rate");
        let mean = injector.values.iter().sum::<f64>() / injector.len() as f64;
        assert!((400.0..=1400.0).contains(&mean), "{mean}");
    }

    #[test]
    fn records_serialize_with_wire_timestamps() {
        let cfg = GeneratorConfig {
            data_end_date: NaiveDate::from_ymd_opt(2024, 12, 10).unwrap(),
            ..GeneratorConfig::default()
        };
        let generator = SyntheticGenerator::new(cfg).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        let blocks = generator.generate_well_series(0, &wells[0], &metrics[..1]).unwrap();
        assert_eq!(blocks[0].len(), 1441);
        let record = blocks[0].records().nth(61).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["timestamp"], "2024-12-09T01:01:00Z");
        assert_eq!(json["well_id"], "WELL-001");
    }

    #[test]
    fn non_finite_values_abort_generation() {
        let cfg = GeneratorConfig {
            initial_production: UniformRange::new(f64::MAX, f64::MAX),
            seasonal_amplitude: 0.5,
            ..hourly_config()
        };
        let generator = SyntheticGenerator::new(cfg).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        match generator.generate_timeseries(&wells, &metrics) {
            Err(GenerationError::NumericFault { metric_name, .. }) => {
                assert!(metric_name.ends_with("production_rate"))
            }
            other => panic!("expected a numeric fault, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn overflow_during_shutdown_still_aborts_generation() {
        let mut cfg = GeneratorConfig {
            num_wells: 1,
            data_start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
            data_end_date: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            initial_production: UniformRange::new(f64::MAX, f64::MAX),
            seasonal_amplitude: 0.5,
            noise_amplitude: 0.0,
            ..hourly_config()
        };
        // shut in for the whole window, with flow forced to zero
        cfg.maintenance.daily_probability = 1.0;
        cfg.maintenance.min_days = 1;
        cfg.maintenance.max_days = 1;
        cfg.maintenance.cooldown_days = 0;
        cfg.maintenance.suppression_factor = 0.0;

        let generator = SyntheticGenerator::new(cfg).unwrap();
        let wells = generator.generate_well_metadata();
        let metrics = generator.generate_metric_definitions();
        match generator.generate_timeseries(&wells, &metrics) {
            Err(GenerationError::NumericFault { metric_name, value, .. }) => {
                assert!(MetricKind::from_name(&metric_name).is_flow(), "{metric_name}");
                assert!(value.is_nan());
            }
            other => panic!("expected a numeric fault, got {:?}", other.map(|b| b.len())),
        }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let cfg = GeneratorConfig {
            num_wells: 0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            SyntheticGenerator::new(cfg),
            Err(GenerationError::InvalidConfig(_))
        ));
    }
}
