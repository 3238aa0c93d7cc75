use crate::db::models::{NewMetric, NewSeriesRow, NewWell};
use crate::schema;
use diesel::prelude::*;
use diesel::PgConnection;

pub fn insert_wells(conn: &mut PgConnection, rows: &[NewWell]) -> Result<usize, String> {
    if rows.is_empty() {
        return Ok(0);
    }

    use schema::wells::dsl as W;

    diesel::insert_into(W::wells)
        .values(rows)
        .on_conflict(W::well_id)
        .do_nothing()
        .execute(conn)
        .map_err(|e| format!("insert well rows failed: {}", e))
}

pub fn insert_metrics(conn: &mut PgConnection, rows: &[NewMetric]) -> Result<usize, String> {
    if rows.is_empty() {
        return Ok(0);
    }

    use schema::metrics::dsl as M;

    diesel::insert_into(M::metrics)
        .values(rows)
        .on_conflict(M::metric_name)
        .do_nothing()
        .execute(conn)
        .map_err(|e| format!("insert metric rows failed: {}", e))
}

/// Rows already present for the same (well, metric, time) are left untouched.
pub fn insert_series_rows(conn: &mut PgConnection, rows: &[NewSeriesRow]) -> Result<usize, String> {
    if rows.is_empty() {
        return Ok(0);
    }

    use schema::timeseries_data::dsl as T;

    diesel::insert_into(T::timeseries_data)
        .values(rows)
        .on_conflict((T::well_id, T::metric_name, T::time))
        .do_nothing()
        .execute(conn)
        .map_err(|e| format!("insert timeseries rows failed: {}", e))
}
