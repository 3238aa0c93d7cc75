//! Command line parsing.
//!
//! ```text
//! well-timescale [--env-file PATH] [COMMAND]
//!
//!   seed                                                   (default)
//!   wells
//!   well WELL_ID
//!   metrics
//!   raw WELL_ID METRIC START END                           (ISO 8601 UTC timestamps)
//!   aggregate WELL_ID METRIC START_DATE END_DATE TYPE      (YYYY-MM-DD dates)
//! ```

use crate::models::series::AggregationType;
use crate::services::query::QueryError;
use crate::utils::{parse_date, parse_utc_timestamp};
use chrono::{DateTime, NaiveDate, Utc};
use std::ffi::OsString;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Seed,
    Wells,
    Well {
        well_id: String,
    },
    Metrics,
    Raw {
        well_id: String,
        metric_name: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Aggregate {
        well_id: String,
        metric_name: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
        aggregation_type: AggregationType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub env_file: Option<PathBuf>,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CliError {
    /// Malformed command line: unknown flag or command, wrong arity.
    Usage(String),
    /// Well-formed command whose arguments are rejected as a query.
    Request(QueryError),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => 1,
            CliError::Request(e) => query_exit_code(e),
        }
    }
}

impl core::fmt::Display for CliError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CliError::Usage(s) => write!(f, "{}", s),
            CliError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

fn usage(msg: impl Into<String>) -> CliError {
    CliError::Usage(msg.into())
}

fn invalid_request(msg: String) -> CliError {
    CliError::Request(QueryError::InvalidRequest(msg))
}

fn utf8_arg(arg: OsString) -> Result<String, CliError> {
    arg.into_string().map_err(|_| usage("argument contains invalid UTF-8"))
}

pub fn parse_args<I>(args: I) -> Result<Invocation, CliError>
where
    I: IntoIterator<Item = OsString>,
{
    let mut env_file: Option<PathBuf> = None;
    let mut positional: Vec<String> = Vec::new();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        let arg = utf8_arg(arg)?;
        if arg == "--env-file" || arg.starts_with("--env-file=") {
            if env_file.is_some() {
                return Err(usage("`--env-file` provided more than once"));
            }
            let value = match arg.strip_prefix("--env-file=") {
                Some(inline) => inline.to_string(),
                None => args.next().map(utf8_arg).transpose()?.unwrap_or_default(),
            };
            if value.is_empty() {
                return Err(usage("`--env-file` requires a path argument"));
            }
            env_file = Some(PathBuf::from(value));
        } else if arg == "--" {
            for rest in args.by_ref() {
                positional.push(utf8_arg(rest)?);
            }
        } else if arg.starts_with("--") {
            return Err(usage(format!("unrecognised argument: {}", arg)));
        } else {
            positional.push(arg);
        }
    }

    Ok(Invocation {
        env_file,
        command: parse_command(&positional)?,
    })
}

fn parse_command(args: &[String]) -> Result<Command, CliError> {
    let Some((name, rest)) = args.split_first() else {
        return Ok(Command::Seed);
    };
    let command = match (name.as_str(), rest) {
        ("seed", []) => Command::Seed,
        ("wells", []) => Command::Wells,
        ("well", [well_id]) => Command::Well {
            well_id: well_id.clone(),
        },
        ("metrics", []) => Command::Metrics,
        ("raw", [well_id, metric_name, start, end]) => Command::Raw {
            well_id: well_id.clone(),
            metric_name: metric_name.clone(),
            start: parse_utc_timestamp(start).map_err(invalid_request)?,
            end: parse_utc_timestamp(end).map_err(invalid_request)?,
        },
        ("aggregate", [well_id, metric_name, start_date, end_date, aggregation_type]) => Command::Aggregate {
            well_id: well_id.clone(),
            metric_name: metric_name.clone(),
            start_date: parse_date(start_date).map_err(invalid_request)?,
            end_date: parse_date(end_date).map_err(invalid_request)?,
            aggregation_type: aggregation_type
                .parse::<AggregationType>()
                .map_err(invalid_request)?,
        },
        ("seed" | "wells" | "well" | "metrics" | "raw" | "aggregate", _) => {
            return Err(usage(format!("wrong number of arguments for `{}`", name)));
        }
        (other, _) => return Err(usage(format!("unknown command: {}", other))),
    };
    Ok(command)
}

/// Process exit status for a failed query: 3 for unknown entities, 2 for rejected requests,
/// 1 for storage failures.
pub fn query_exit_code(err: &QueryError) -> i32 {
    match err {
        e if e.is_not_found() => 3,
        QueryError::InvalidRange(_) | QueryError::InvalidRequest(_) => 2,
        _ => 1,
    }
}
