//! Static entities: wells and the metric catalog.
//!
//! Notes
//! - Both are created once while seeding and never updated afterwards.
//! - Enum-valued columns are stored as their lowercase names (see `as_str`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// =====================
// Wells
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WellType {
    Producer,
    Injector,
    Observation,
}

impl WellType {
    pub const ALL: [WellType; 3] = [WellType::Producer, WellType::Injector, WellType::Observation];

    pub fn as_str(&self) -> &'static str {
        match self {
            WellType::Producer => "producer",
            WellType::Injector => "injector",
            WellType::Observation => "observation",
        }
    }
}

impl fmt::Display for WellType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WellType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WellType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown well type: {}", s))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Well {
    /// `WELL-###`, unique.
    pub well_id: String,
    pub well_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub operator: String,
    pub field_name: String,
    pub well_type: WellType,
    /// Always strictly before `data_start_date`.
    pub spud_date: NaiveDate,
    pub data_start_date: NaiveDate,
    pub data_end_date: NaiveDate,
}

/// Formats the identifier for the well at `index` (zero-based).
pub fn well_id_for_index(index: usize) -> String {
    format!("WELL-{:03}", index + 1)
}

/// `WELL-` followed by exactly three ASCII digits.
pub fn is_valid_well_id(well_id: &str) -> bool {
    well_id
        .strip_prefix("WELL-")
        .is_some_and(|digits| digits.len() == 3 && digits.bytes().all(|b| b.is_ascii_digit()))
}

// =====================
// Metrics
// =====================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Numeric,
    Boolean,
    Categorical,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Numeric => "numeric",
            DataType::Boolean => "boolean",
            DataType::Categorical => "categorical",
        }
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "numeric" => Ok(DataType::Numeric),
            "boolean" => Ok(DataType::Boolean),
            "categorical" => Ok(DataType::Categorical),
            other => Err(format!("unknown data type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Lowercase with underscores, unique.
    pub metric_name: String,
    pub display_name: String,
    pub description: String,
    pub unit_of_measurement: String,
    pub data_type: DataType,
    pub typical_min: Option<f64>,
    pub typical_max: Option<f64>,
}

impl Metric {
    pub fn kind(&self) -> MetricKind {
        MetricKind::from_name(&self.metric_name)
    }
}

pub fn is_valid_metric_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_lowercase() || b == b'_')
}

/// How a metric is synthesised. Resolved once from the metric name.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MetricKind {
    OilProduction,
    GasProduction,
    WellheadPressure,
    TubingPressure,
    GasInjection,
    Other,
}

impl MetricKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            "oil_production_rate" => MetricKind::OilProduction,
            "gas_production_rate" => MetricKind::GasProduction,
            "wellhead_pressure" => MetricKind::WellheadPressure,
            "tubing_pressure" => MetricKind::TubingPressure,
            "gas_injection_rate" => MetricKind::GasInjection,
            _ => MetricKind::Other,
        }
    }

    /// Production and injection rates: suppressed during maintenance and floored at zero.
    pub fn is_flow(&self) -> bool {
        matches!(
            self,
            MetricKind::OilProduction | MetricKind::GasProduction | MetricKind::GasInjection
        )
    }
}

pub struct MetricSpec {
    pub name: &'static str,
    pub display_name: &'static str,
    pub unit: &'static str,
    pub typical_min: f64,
    pub typical_max: f64,
}

pub const METRIC_CATALOG: [MetricSpec; 5] = [
    MetricSpec {
        name: "oil_production_rate",
        display_name: "Oil Production Rate",
        unit: "bbl/day",
        typical_min: 0.0,
        typical_max: 500.0,
    },
    MetricSpec {
        name: "gas_production_rate",
        display_name: "Gas Production Rate",
        unit: "mcf/day",
        typical_min: 0.0,
        typical_max: 2000.0,
    },
    MetricSpec {
        name: "wellhead_pressure",
        display_name: "Wellhead Pressure",
        unit: "psi",
        typical_min: 100.0,
        typical_max: 3000.0,
    },
    MetricSpec {
        name: "tubing_pressure",
        display_name: "Tubing Pressure",
        unit: "psi",
        typical_min: 50.0,
        typical_max: 2500.0,
    },
    MetricSpec {
        name: "gas_injection_rate",
        display_name: "Gas Injection Rate",
        unit: "mcf/day",
        typical_min: 0.0,
        typical_max: 1500.0,
    },
];

impl MetricSpec {
    pub fn to_metric(&self) -> Metric {
        Metric {
            metric_name: self.name.to_string(),
            display_name: self.display_name.to_string(),
            description: format!("Synthetic {} measurements", self.display_name.to_lowercase()),
            unit_of_measurement: self.unit.to_string(),
            data_type: DataType::Numeric,
            typical_min: Some(self.typical_min),
            typical_max: Some(self.typical_max),
        }
    }
}
