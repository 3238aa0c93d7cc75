pub mod models {
    pub mod catalog;
    pub mod series;
}

pub mod cli;
pub mod config;
pub mod db {
    pub mod models;
}
pub mod schema;
pub mod utils;
pub mod services {
    pub mod aggregation;
    pub mod completeness;
    pub mod generator;
    pub mod ingest;
    pub mod modifiers;
    pub mod params;
    pub mod quality;
    pub mod query;
    pub mod seed;
    pub mod waveform;
}

use crate::cli::{Command, Invocation, parse_args, query_exit_code};
use crate::config::{Config, load_env_file};
use crate::services::query::{self, QueryError};
use crate::services::seed;
use diesel::PgConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use log::{debug, error, info};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug)]
struct LoadedEnvFile {
    path: PathBuf,
    explicit: bool,
}

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(Debug)]
enum RunError {
    Setup(String),
    Query(QueryError),
}

impl From<String> for RunError {
    fn from(value: String) -> Self {
        RunError::Setup(value)
    }
}

impl From<QueryError> for RunError {
    fn from(value: QueryError) -> Self {
        RunError::Query(value)
    }
}

fn apply_database_migrations(conn: &mut PgConnection) -> Result<(), String> {
    match conn.run_pending_migrations(MIGRATIONS) {
        Ok(applied) => {
            if applied.is_empty() {
                info!("Database schema is up to date; no migrations were applied");
            } else {
                let names = applied.iter().map(|v| v.to_string()).collect::<Vec<_>>().join(", ");
                info!("Applied {} database migration(s): {}", applied.len(), names);
            }
            Ok(())
        }
        Err(e) => Err(format!("Applying database migrations failed: {}", e)),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|e| format!("serializing response failed: {}", e))?;
    println!("{}", text);
    Ok(())
}

fn run(command: Command) -> Result<(), RunError> {
    // 1) Load config
    let cfg = Config::from_env()?;
    info!(
        "Config loaded (seed={}, wells={}, range={}..={}, frequency={}min, batch_size={}, force_reseed={})",
        cfg.generator.seed,
        cfg.generator.num_wells,
        cfg.generator.data_start_date,
        cfg.generator.data_end_date,
        cfg.generator.frequency_minutes,
        cfg.batch_size,
        cfg.force_reseed
    );

    // 2) Connect DB
    let mut conn = PgConnection::establish(&cfg.database_url).map_err(|e| format!("DB connection failed: {}", e))?;
    info!("Connected to database");

    // 3) Apply pending database migrations
    apply_database_migrations(&mut conn)?;

    // 4) Seed or answer a query
    debug!("Running {:?}", command);
    match command {
        Command::Seed => seed::run(&mut conn, &cfg)?,
        Command::Wells => print_json(&query::list_wells(&mut conn)?)?,
        Command::Well { well_id } => print_json(&query::get_well(&mut conn, &well_id)?)?,
        Command::Metrics => print_json(&query::list_metrics(&mut conn)?)?,
        Command::Raw {
            well_id,
            metric_name,
            start,
            end,
        } => print_json(&query::get_raw_timeseries(&mut conn, &well_id, &metric_name, start, end)?)?,
        Command::Aggregate {
            well_id,
            metric_name,
            start_date,
            end_date,
            aggregation_type,
        } => print_json(&query::get_aggregated_timeseries(
            &mut conn,
            &well_id,
            &metric_name,
            start_date,
            end_date,
            aggregation_type,
        )?)?,
    }

    Ok(())
}

fn configure_env(invocation: &Invocation) -> Result<Option<LoadedEnvFile>, String> {
    if let Some(path) = invocation.env_file.clone() {
        if !path.is_file() {
            return Err(format!("env file not found: {}", path.display()));
        }
        load_env_file(&path)?;
        return Ok(Some(LoadedEnvFile { path, explicit: true }));
    }

    let cwd = std::env::current_dir().map_err(|e| format!("unable to read current directory: {}", e))?;
    let default_path = cwd.join(".env");
    if default_path.is_file() {
        load_env_file(&default_path)?;
        Ok(Some(LoadedEnvFile {
            path: default_path,
            explicit: false,
        }))
    } else {
        Ok(None)
    }
}

fn main() {
    let invocation = match parse_args(std::env::args_os().skip(1)) {
        Ok(invocation) => invocation,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(err.exit_code());
        }
    };
    let loaded_env = match configure_env(&invocation) {
        Ok(loaded) => loaded,
        Err(err) => {
            eprintln!("fatal: {}", err);
            std::process::exit(1);
        }
    };

    // Init logging after environment so RUST_LOG from .env is respected.
    let default_filter = env_logger::Env::default().default_filter_or("info");
    env_logger::Builder::from_env(default_filter)
        .format_timestamp_secs()
        .init();

    if let Some(info) = loaded_env.as_ref() {
        let origin = if info.explicit { "CLI-specified" } else { "default" };
        info!("Environment loaded from {} .env file: {}", origin, info.path.display());
    }

    info!(
        "well-timescale {} (git {}) starting",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_TIME_GIT_HASH")
    );
    match run(invocation.command) {
        Ok(()) => {}
        Err(RunError::Setup(e)) => {
            error!("fatal: {}", e);
            std::process::exit(1);
        }
        Err(RunError::Query(e)) => {
            error!("query failed: {}", e);
            std::process::exit(query_exit_code(&e));
        }
    }
}
