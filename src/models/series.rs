//! Time-series points, aggregated buckets and the query payloads built from them.

use crate::utils::utc_seconds;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityFlag {
    Good,
    Suspect,
    Bad,
}

impl QualityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityFlag::Good => "good",
            QualityFlag::Suspect => "suspect",
            QualityFlag::Bad => "bad",
        }
    }
}

impl FromStr for QualityFlag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(QualityFlag::Good),
            "suspect" => Ok(QualityFlag::Suspect),
            "bad" => Ok(QualityFlag::Bad),
            other => Err(format!("unknown quality flag: {}", other)),
        }
    }
}

/// A stored reading as returned by raw queries.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesDataPoint {
    #[serde(with = "utc_seconds")]
    pub timestamp: DateTime<Utc>,
    pub well_id: String,
    pub metric_name: String,
    pub value: f64,
    pub unit: String,
    pub quality_flag: QualityFlag,
}

/// Minimal (time, value) pair fed to the aggregation engine.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Sample {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reduction {
    Average,
    Max,
    Min,
    Sum,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationType {
    DailyAverage,
    DailyMax,
    DailyMin,
    DailySum,
    MonthlyAverage,
}

impl AggregationType {
    pub const ALL: [AggregationType; 5] = [
        AggregationType::DailyAverage,
        AggregationType::DailyMax,
        AggregationType::DailyMin,
        AggregationType::DailySum,
        AggregationType::MonthlyAverage,
    ];

    pub fn daily(reduction: Reduction) -> Self {
        match reduction {
            Reduction::Average => AggregationType::DailyAverage,
            Reduction::Max => AggregationType::DailyMax,
            Reduction::Min => AggregationType::DailyMin,
            Reduction::Sum => AggregationType::DailySum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AggregationType::DailyAverage => "daily_average",
            AggregationType::DailyMax => "daily_max",
            AggregationType::DailyMin => "daily_min",
            AggregationType::DailySum => "daily_sum",
            AggregationType::MonthlyAverage => "monthly_average",
        }
    }
}

impl fmt::Display for AggregationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AggregationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AggregationType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let known = AggregationType::ALL.map(|t| t.as_str()).join(", ");
                format!("invalid aggregation_type: {} (expected one of {})", s, known)
            })
    }
}

/// Summary of one day or month bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDataPoint {
    /// First day of the bucket.
    pub date: NaiveDate,
    /// `YYYY-MM-DD` for daily buckets, `YYYY-MM` for monthly ones.
    pub time_period: String,
    pub well_id: String,
    pub metric_name: String,
    pub aggregated_value: f64,
    pub aggregation_type: AggregationType,
    pub unit: String,
    pub data_point_count: usize,
    pub min_value: f64,
    pub max_value: f64,
    pub data_completeness: f64,
}

// =====================
// Query payloads
// =====================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawQueryMetadata {
    pub well_id: String,
    pub metric_name: String,
    #[serde(with = "utc_seconds")]
    pub start_timestamp: DateTime<Utc>,
    #[serde(with = "utc_seconds")]
    pub end_timestamp: DateTime<Utc>,
    pub total_points: usize,
    pub data_completeness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawDataResponse {
    pub data: Vec<TimeSeriesDataPoint>,
    pub metadata: RawQueryMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedQueryMetadata {
    pub well_id: String,
    pub metric_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub aggregation_type: AggregationType,
    pub total_periods: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedDataResponse {
    pub data: Vec<AggregatedDataPoint>,
    pub metadata: AggregatedQueryMetadata,
}
