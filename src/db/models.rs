//! Diesel row structs for the `wells`, `metrics` and `timeseries_data` tables.
//!
//! Important: migrations set up `timeseries_data` as a TimescaleDB hypertable on `time`.
//! Insert structs borrow from the domain types so bulk seeding does not clone strings per row.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;

use crate::models::catalog::{Metric, Well};
use crate::models::series::QualityFlag;
use crate::schema;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::wells)]
#[diesel(primary_key(well_id))]
pub struct WellRow {
    pub well_id: String,
    pub well_name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub operator: String,
    pub field_name: String,
    pub well_type: String,
    pub spud_date: NaiveDate,
    pub data_start_date: NaiveDate,
    pub data_end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<WellRow> for Well {
    type Error = String;

    fn try_from(row: WellRow) -> Result<Self, Self::Error> {
        let well_type = row
            .well_type
            .parse()
            .map_err(|e| format!("well {}: {}", row.well_id, e))?;
        Ok(Well {
            well_id: row.well_id,
            well_name: row.well_name,
            latitude: row.latitude,
            longitude: row.longitude,
            operator: row.operator,
            field_name: row.field_name,
            well_type,
            spud_date: row.spud_date,
            data_start_date: row.data_start_date,
            data_end_date: row.data_end_date,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::wells)]
pub struct NewWell<'a> {
    pub well_id: &'a str,
    pub well_name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
    pub operator: &'a str,
    pub field_name: &'a str,
    pub well_type: &'static str,
    pub spud_date: NaiveDate,
    pub data_start_date: NaiveDate,
    pub data_end_date: NaiveDate,
}

impl<'a> From<&'a Well> for NewWell<'a> {
    fn from(well: &'a Well) -> Self {
        NewWell {
            well_id: &well.well_id,
            well_name: &well.well_name,
            latitude: well.latitude,
            longitude: well.longitude,
            operator: &well.operator,
            field_name: &well.field_name,
            well_type: well.well_type.as_str(),
            spud_date: well.spud_date,
            data_start_date: well.data_start_date,
            data_end_date: well.data_end_date,
        }
    }
}

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = schema::metrics)]
#[diesel(primary_key(metric_name))]
pub struct MetricRow {
    pub metric_name: String,
    pub display_name: String,
    pub description: String,
    pub unit_of_measurement: String,
    pub data_type: String,
    pub typical_min: Option<f64>,
    pub typical_max: Option<f64>,
}

impl TryFrom<MetricRow> for Metric {
    type Error = String;

    fn try_from(row: MetricRow) -> Result<Self, Self::Error> {
        let data_type = row
            .data_type
            .parse()
            .map_err(|e| format!("metric {}: {}", row.metric_name, e))?;
        Ok(Metric {
            metric_name: row.metric_name,
            display_name: row.display_name,
            description: row.description,
            unit_of_measurement: row.unit_of_measurement,
            data_type,
            typical_min: row.typical_min,
            typical_max: row.typical_max,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::metrics)]
pub struct NewMetric<'a> {
    pub metric_name: &'a str,
    pub display_name: &'a str,
    pub description: &'a str,
    pub unit_of_measurement: &'a str,
    pub data_type: &'static str,
    pub typical_min: Option<f64>,
    pub typical_max: Option<f64>,
}

impl<'a> From<&'a Metric> for NewMetric<'a> {
    fn from(metric: &'a Metric) -> Self {
        NewMetric {
            metric_name: &metric.metric_name,
            display_name: &metric.display_name,
            description: &metric.description,
            unit_of_measurement: &metric.unit_of_measurement,
            data_type: metric.data_type.as_str(),
            typical_min: metric.typical_min,
            typical_max: metric.typical_max,
        }
    }
}

/// A stored reading without its (well, metric) key, as loaded by range queries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = schema::timeseries_data)]
pub struct SeriesRow {
    pub time: DateTime<Utc>,
    pub value: f64,
    pub quality_flag: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = schema::timeseries_data)]
pub struct NewSeriesRow<'a> {
    pub well_id: &'a str,
    pub metric_name: &'a str,
    pub time: DateTime<Utc>,
    pub value: f64,
    pub quality_flag: &'static str,
}

impl<'a> NewSeriesRow<'a> {
    pub fn new(well_id: &'a str, metric_name: &'a str, time: DateTime<Utc>, value: f64, flag: QualityFlag) -> Self {
        NewSeriesRow {
            well_id,
            metric_name,
            time,
            value,
            quality_flag: flag.as_str(),
        }
    }
}
