//! One-shot population of the store with a synthetic dataset.

use crate::config::Config;
use crate::db::models::{NewMetric, NewSeriesRow, NewWell};
use crate::schema;
use crate::services::generator::{SeriesBlock, SyntheticGenerator};
use crate::services::ingest::{insert_metrics, insert_series_rows, insert_wells};
use chrono::{DateTime, Utc};
use diesel::PgConnection;
use diesel::prelude::*;
use log::info;
use std::time::Instant;

pub fn run(conn: &mut PgConnection, cfg: &Config) -> Result<(), String> {
    let generator =
        SyntheticGenerator::new(cfg.generator.clone()).map_err(|e| format!("Seed: generator setup failed: {}", e))?;

    if has_timeseries_data(conn)? {
        if !cfg.force_reseed {
            info!("Seed: timeseries_data already holds rows; skipping (set FORCE_RESEED=1 to regenerate)");
            return Ok(());
        }
        info!("Seed: FORCE_RESEED set; clearing existing wells, metrics and readings");
        clear_dataset(conn)?;
    }

    let gen_cfg = generator.config();
    let grid = generator.grid();
    info!(
        "Seed: generating {} well(s) from {} to {} every {} min (seed={}, points per series={})",
        gen_cfg.num_wells,
        gen_cfg.data_start_date,
        gen_cfg.data_end_date,
        gen_cfg.frequency_minutes,
        gen_cfg.seed,
        grid.len()
    );

    let wells = generator.generate_well_metadata();
    let metrics = generator.generate_metric_definitions();
    let new_wells: Vec<NewWell> = wells.iter().map(NewWell::from).collect();
    let new_metrics: Vec<NewMetric> = metrics.iter().map(NewMetric::from).collect();
    let inserted_wells = insert_wells(conn, &new_wells)?;
    let inserted_metrics = insert_metrics(conn, &new_metrics)?;
    info!(
        "Seed: reference data ready (wells={}, metrics={})",
        inserted_wells, inserted_metrics
    );

    let started = Instant::now();
    let mut inserted_rows: usize = 0;
    // One well at a time keeps at most one well's series in memory.
    for (index, well) in wells.iter().enumerate() {
        let blocks = generator
            .generate_well_series(index, well, &metrics)
            .map_err(|e| format!("Seed: generation aborted: {}", e))?;
        for block in &blocks {
            let count = write_block(conn, block, cfg.batch_size)?;
            inserted_rows += count;
            info!(
                "Seed: {} {} ({}) stored {} row(s)",
                well.well_id, block.metric_name, well.well_type, count
            );
        }
    }

    info!(
        "Seed: complete (wells={}, metrics={}, rows={}, elapsed={:.1}s)",
        wells.len(),
        metrics.len(),
        inserted_rows,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn has_timeseries_data(conn: &mut PgConnection) -> Result<bool, String> {
    use schema::timeseries_data::dsl as T;

    T::timeseries_data
        .select(T::time)
        .first::<DateTime<Utc>>(conn)
        .optional()
        .map(|row| row.is_some())
        .map_err(|e| format!("checking for existing readings failed: {}", e))
}

fn clear_dataset(conn: &mut PgConnection) -> Result<(), String> {
    use schema::{metrics, timeseries_data, wells};

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        diesel::delete(timeseries_data::table).execute(conn)?;
        diesel::delete(wells::table).execute(conn)?;
        diesel::delete(metrics::table).execute(conn)?;
        Ok(())
    })
    .map_err(|e| format!("clearing existing dataset failed: {}", e))
}

fn write_block(conn: &mut PgConnection, block: &SeriesBlock, batch_size: usize) -> Result<usize, String> {
    let mut inserted: usize = 0;
    for batch in row_batches(block, batch_size) {
        inserted += insert_series_rows(conn, &batch)?;
    }
    Ok(inserted)
}

/// Insert rows of `block` in time order, at most `batch_size` per batch; only the last batch may be short.
fn row_batches(block: &SeriesBlock, batch_size: usize) -> impl Iterator<Item = Vec<NewSeriesRow<'_>>> + '_ {
    let batch_size = batch_size.max(1);
    let mut rows = block.records().map(|record| {
        NewSeriesRow::new(
            record.well_id,
            record.metric_name,
            record.timestamp,
            record.value,
            record.quality_flag,
        )
    });
    std::iter::from_fn(move || {
        let batch: Vec<_> = rows.by_ref().take(batch_size).collect();
        (!batch.is_empty()).then_some(batch)
    })
}
