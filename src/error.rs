use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading range or seed configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("missing required range '{key}'")]
    MissingRange { key: String },

    #[error("invalid range for '{key}': '{value}' (expected '(min, max)')")]
    InvalidRange { key: String, value: String },

    #[error("invalid bounds for '{key}': min ({min}) > max ({max})")]
    InvalidBounds { key: String, min: f64, max: f64 },

    #[error("missing required seed value '{key}'")]
    MissingSeed { key: String },

    #[error("invalid seed value for '{key}': '{value}'")]
    InvalidSeed { key: String, value: String },
}

/// Errors raised while pulling the RMSRD value out of a solver output file.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("no RMSRD line found in solver output")]
    NotFound,

    #[error("RMSRD line is malformed: '{line}'")]
    Malformed { line: String },

    #[error("failed to read solver output {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Errors raised by the file-based solver protocol.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("failed to launch solver {executable:?}: {source}")]
    Spawn {
        executable: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("solver produced no output within {waited:?}")]
    Timeout { waited: Duration },

    #[error("failed to stage solver input: {0}")]
    Stage(#[source] io::Error),
}

/// Top-level error for a case workflow.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Solver(#[from] SolverError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error("failed to read template {path:?}: {source}")]
    Template {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("template has no case name on line 2")]
    MissingCaseName,

    #[error("no sampled dataset produced a valid RMSRD; nothing to refine")]
    NoViableCandidate,

    #[error(transparent)]
    Io(#[from] io::Error),
}
