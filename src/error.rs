//! Error types shared across the rendering pipeline.
//!
//! Configuration mistakes, host I/O failures, and logical failures (like a
//! zero-uptime CPU percentage) all flow through one enum so that per-PID
//! read errors can be gathered and combined into a single report.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // ---- configuration errors ----
    #[error("column must be in form FIELD[,ALIGN[,FUNCTION[=ARG]]]: {0:?}")]
    ColumnSyntax(String),

    #[error(
        "invalid field: {value:?} (allowed: pid, parent_pid, cpu_percent, \
         virtual_size, resident_size, start_time, uptime, command)"
    )]
    InvalidField { value: String },

    #[error("invalid alignment: {value:?} (must be \"L\" or \"R\")")]
    InvalidAlignment { value: String },

    #[error("unknown format function {function:?} for field {field}")]
    UnknownFunction { field: &'static str, function: String },

    #[error("format function {function:?} requires an argument, e.g. {function}=ARG")]
    FunctionNeedsArg { function: &'static str },

    #[error("invalid time layout: {layout:?}")]
    InvalidTimeLayout { layout: String },

    #[error("aggregation requires exactly one column with field \"uptime\"")]
    InvalidAggregation,

    #[error("invalid service name: {0:?}")]
    InvalidServiceName(String),

    // ---- table shape errors ----
    #[error("no rows")]
    NoRows,

    #[error("column count mismatch: row {row} has {actual} columns, expected {expected}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("alignment count {alignments} does not match column count {columns}")]
    AlignmentCountMismatch { alignments: usize, columns: usize },

    // ---- host I/O and parse errors ----
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {what} in {}: {text:?}", .path.display())]
    Parse {
        what: &'static str,
        path: PathBuf,
        text: String,
    },

    #[error("{what} not found in {}", .path.display())]
    MissingField {
        what: &'static str,
        path: PathBuf,
    },

    #[error("sysconf({name}) failed")]
    Sysconf { name: &'static str },

    #[error("no such service: {0}")]
    NoSuchService(String),

    #[error("service {0} is loaded but not started")]
    ServiceNotStarted(String),

    #[error("failed to run {command}: {source}")]
    Command {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed with {status}")]
    CommandFailed {
        command: String,
        status: std::process::ExitStatus,
    },

    // ---- logical errors ----
    #[error("process uptime is zero, cannot compute cpu percent")]
    ZeroUptime,

    // ---- aggregated / runtime errors ----
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("{}", format_multi(.0))]
    Multi(Vec<Error>),
}

impl Error {
    /// Collapses the errors collected from independent tasks: none is Ok,
    /// exactly one propagates as-is, several combine into `Multi`.
    pub fn join(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Error::Multi(errors)),
        }
    }
}

fn format_multi(errors: &[Error]) -> String {
    let mut out = String::new();
    for (i, err) in errors.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&err.to_string());
    }
    out
}
