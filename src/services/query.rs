//! Read side of the store: wells, metrics, raw windows and aggregated buckets.

use crate::db::models::{MetricRow, SeriesRow, WellRow};
use crate::models::catalog::{Metric, Well, is_valid_metric_name, is_valid_well_id};
use crate::models::series::{
    AggregatedDataResponse, AggregatedQueryMetadata, AggregationType, RawDataResponse, RawQueryMetadata, Sample,
    TimeSeriesDataPoint,
};
use crate::schema;
use crate::services::aggregation::{SeriesRef, aggregate};
use crate::services::completeness::compute_raw_completeness;
use crate::utils::start_of_day;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::PgConnection;
use diesel::prelude::*;
use log::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryError {
    WellNotFound(String),
    MetricNotFound(String),
    InvalidRange(String),
    /// A malformed timestamp, date or aggregation type.
    InvalidRequest(String),
    Database(String),
}

impl QueryError {
    /// Unknown well or metric, as opposed to a malformed request or a storage failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QueryError::WellNotFound(_) | QueryError::MetricNotFound(_))
    }
}

impl core::fmt::Display for QueryError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            QueryError::WellNotFound(id) => write!(f, "Well not found: {}", id),
            QueryError::MetricNotFound(name) => write!(f, "Metric not found: {}", name),
            QueryError::InvalidRange(s) | QueryError::InvalidRequest(s) => write!(f, "{}", s),
            QueryError::Database(s) => write!(f, "database error: {}", s),
        }
    }
}

impl std::error::Error for QueryError {}

impl From<diesel::result::Error> for QueryError {
    fn from(value: diesel::result::Error) -> Self {
        QueryError::Database(value.to_string())
    }
}

pub fn validate_timestamp_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<(), QueryError> {
    if start >= end {
        return Err(QueryError::InvalidRange(
            "start_timestamp must be before end_timestamp".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_date_range(start_date: NaiveDate, end_date: NaiveDate) -> Result<(), QueryError> {
    if start_date > end_date {
        return Err(QueryError::InvalidRange(
            "start_date must not be after end_date".to_string(),
        ));
    }
    Ok(())
}

pub fn list_wells(conn: &mut PgConnection) -> Result<Vec<Well>, QueryError> {
    use schema::wells::dsl as W;

    W::wells
        .order(W::well_id.asc())
        .select(WellRow::as_select())
        .load::<WellRow>(conn)?
        .into_iter()
        .map(|row| Well::try_from(row).map_err(QueryError::Database))
        .collect()
}

pub fn get_well(conn: &mut PgConnection, well_id: &str) -> Result<Well, QueryError> {
    use schema::wells::dsl as W;

    if !is_valid_well_id(well_id) {
        return Err(QueryError::WellNotFound(well_id.to_string()));
    }
    let row = W::wells
        .find(well_id)
        .select(WellRow::as_select())
        .first::<WellRow>(conn)
        .optional()?
        .ok_or_else(|| QueryError::WellNotFound(well_id.to_string()))?;
    Well::try_from(row).map_err(QueryError::Database)
}

pub fn list_metrics(conn: &mut PgConnection) -> Result<Vec<Metric>, QueryError> {
    use schema::metrics::dsl as M;

    M::metrics
        .order(M::metric_name.asc())
        .select(MetricRow::as_select())
        .load::<MetricRow>(conn)?
        .into_iter()
        .map(|row| Metric::try_from(row).map_err(QueryError::Database))
        .collect()
}

pub fn get_metric(conn: &mut PgConnection, metric_name: &str) -> Result<Metric, QueryError> {
    use schema::metrics::dsl as M;

    if !is_valid_metric_name(metric_name) {
        return Err(QueryError::MetricNotFound(metric_name.to_string()));
    }
    let row = M::metrics
        .find(metric_name)
        .select(MetricRow::as_select())
        .first::<MetricRow>(conn)
        .optional()?
        .ok_or_else(|| QueryError::MetricNotFound(metric_name.to_string()))?;
    Metric::try_from(row).map_err(QueryError::Database)
}

/// Rows with `from <= time < until`, ascending.
fn load_series(
    conn: &mut PgConnection,
    well_id: &str,
    metric_name: &str,
    from: DateTime<Utc>,
    until: DateTime<Utc>,
) -> Result<Vec<SeriesRow>, QueryError> {
    use schema::timeseries_data::dsl as T;

    let rows: Vec<SeriesRow> = T::timeseries_data
        .filter(T::well_id.eq(well_id))
        .filter(T::metric_name.eq(metric_name))
        .filter(T::time.ge(from))
        .filter(T::time.lt(until))
        .order(T::time.asc())
        .select(SeriesRow::as_select())
        .load(conn)?;
    debug!(
        "Loaded {} row(s) for {}/{} in [{}, {})",
        rows.len(),
        well_id,
        metric_name,
        from,
        until
    );
    Ok(rows)
}

/// Readings within `[start, end]` (both inclusive) plus completeness of the window.
pub fn get_raw_timeseries(
    conn: &mut PgConnection,
    well_id: &str,
    metric_name: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<RawDataResponse, QueryError> {
    get_well(conn, well_id)?;
    let metric = get_metric(conn, metric_name)?;
    validate_timestamp_range(start, end)?;

    // readings sit on whole seconds, so the next second bounds the closed window
    let rows = load_series(conn, well_id, metric_name, start, end + Duration::seconds(1))?;
    build_raw_response(well_id, &metric, start, end, rows)
}

pub fn build_raw_response(
    well_id: &str,
    metric: &Metric,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    rows: Vec<SeriesRow>,
) -> Result<RawDataResponse, QueryError> {
    let data = rows
        .into_iter()
        .filter(|row| start <= row.time && row.time <= end)
        .map(|row| {
            let quality_flag = row.quality_flag.parse().map_err(QueryError::Database)?;
            Ok(TimeSeriesDataPoint {
                timestamp: row.time,
                well_id: well_id.to_string(),
                metric_name: metric.metric_name.clone(),
                value: row.value,
                unit: metric.unit_of_measurement.clone(),
                quality_flag,
            })
        })
        .collect::<Result<Vec<_>, QueryError>>()?;

    let metadata = RawQueryMetadata {
        well_id: well_id.to_string(),
        metric_name: metric.metric_name.clone(),
        start_timestamp: start,
        end_timestamp: end,
        total_points: data.len(),
        data_completeness: compute_raw_completeness(start, end, data.len()),
    };
    Ok(RawDataResponse { data, metadata })
}

/// Buckets of the readings whose UTC date lies in `[start_date, end_date]`.
pub fn get_aggregated_timeseries(
    conn: &mut PgConnection,
    well_id: &str,
    metric_name: &str,
    start_date: NaiveDate,
    end_date: NaiveDate,
    aggregation_type: AggregationType,
) -> Result<AggregatedDataResponse, QueryError> {
    get_well(conn, well_id)?;
    let metric = get_metric(conn, metric_name)?;
    validate_date_range(start_date, end_date)?;

    let until = start_of_day(end_date) + Duration::days(1);
    let rows = load_series(conn, well_id, metric_name, start_of_day(start_date), until)?;
    let samples: Vec<Sample> = rows
        .iter()
        .map(|row| Sample {
            timestamp: row.time,
            value: row.value,
        })
        .collect();
    Ok(build_aggregated_response(
        well_id,
        &metric,
        &samples,
        start_date,
        end_date,
        aggregation_type,
    ))
}

pub fn build_aggregated_response(
    well_id: &str,
    metric: &Metric,
    samples: &[Sample],
    start_date: NaiveDate,
    end_date: NaiveDate,
    aggregation_type: AggregationType,
) -> AggregatedDataResponse {
    let series = SeriesRef {
        well_id,
        metric_name: &metric.metric_name,
        unit: &metric.unit_of_measurement,
    };
    let data = aggregate(series, samples, start_date, end_date, aggregation_type);
    let metadata = AggregatedQueryMetadata {
        well_id: well_id.to_string(),
        metric_name: metric.metric_name.clone(),
        start_date,
        end_date,
        aggregation_type,
        total_periods: data.len(),
    };
    AggregatedDataResponse { data, metadata }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::catalog::METRIC_CATALOG;
    use crate::models::series::QualityFlag;
    use chrono::TimeZone;

    fn oil() -> Metric {
        METRIC_CATALOG[0].to_metric()
    }

    fn row(minute: i64, value: f64, flag: &str) -> SeriesRow {
        SeriesRow {
            time: Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap() + Duration::minutes(minute),
            value,
            quality_flag: flag.to_string(),
        }
    }

    #[test]
    fn range_validation_distinguishes_invalid_from_not_found() {
        let t = Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap();
        let err = validate_timestamp_range(t, t).unwrap_err();
        assert_eq!(err.to_string(), "start_timestamp must be before end_timestamp");
        assert!(!err.is_not_found());
        assert!(validate_timestamp_range(t, t + Duration::minutes(1)).is_ok());

        let d = NaiveDate::from_ymd_opt(2024, 12, 9).unwrap();
        assert!(validate_date_range(d, d).is_ok());
        assert!(validate_date_range(d, d.pred_opt().unwrap()).is_err());

        let missing = QueryError::WellNotFound("WELL-999".to_string());
        assert!(missing.is_not_found());
        assert_eq!(missing.to_string(), "Well not found: WELL-999");
        assert!(QueryError::MetricNotFound("x".to_string()).is_not_found());
    }

    #[test]
    fn raw_response_reports_completeness_of_the_window() {
        let start = Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 12, 9, 1, 0, 0).unwrap();
        let rows: Vec<_> = (0..61).filter(|m| m % 2 == 0).map(|m| row(m, 300.0, "good")).collect();
        let response = build_raw_response("WELL-001", &oil(), start, end, rows).unwrap();
        assert_eq!(response.metadata.total_points, 31);
        assert_eq!(response.metadata.data_completeness, 50.82);
        assert_eq!(response.data[0].unit, "bbl/day");
        assert_eq!(response.data[0].quality_flag, QualityFlag::Good);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["metadata"]["start_timestamp"], "2024-12-09T00:00:00Z");
        assert_eq!(json["data"][1]["timestamp"], "2024-12-09T00:02:00Z");
    }

    #[test]
    fn empty_window_is_not_an_error() {
        let start = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let end = start + Duration::hours(1);
        let response = build_raw_response("WELL-001", &oil(), start, end, Vec::new()).unwrap();
        assert!(response.data.is_empty());
        assert_eq!(response.metadata.total_points, 0);
        assert_eq!(response.metadata.data_completeness, 0.0);
    }

    #[test]
    fn corrupt_quality_flags_surface_as_storage_errors() {
        let start = Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap();
        let err = build_raw_response("WELL-001", &oil(), start, start + Duration::hours(1), vec![row(0, 1.0, "meh")])
            .unwrap_err();
        assert!(matches!(err, QueryError::Database(_)));
    }

    #[test]
    fn aggregated_response_counts_periods() {
        let samples: Vec<_> = (0..3 * 1440)
            .map(|m| Sample {
                timestamp: Utc.with_ymd_and_hms(2024, 12, 9, 0, 0, 0).unwrap() + Duration::minutes(m),
                value: 250.0,
            })
            .collect();
        let start = NaiveDate::from_ymd_opt(2024, 12, 9).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 12, 10).unwrap();
        let response =
            build_aggregated_response("WELL-001", &oil(), &samples, start, end, AggregationType::DailyAverage);
        assert_eq!(response.metadata.total_periods, 2);
        assert_eq!(response.data[1].data_completeness, 100.0);
        assert_eq!(response.data[1].aggregated_value, 250.0);

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["metadata"]["aggregation_type"], "daily_average");
        assert_eq!(json["data"][0]["date"], "2024-12-09");
    }
}
