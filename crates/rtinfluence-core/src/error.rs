//! Error taxonomy for the retweet influence network analytics engine.
//!
//! Variants map onto the five error kinds named in the error handling design: Config,
//! IoData, Algorithm, Invariant, System. Kinds are distinguished so that callers (the
//! window pipeline, the orchestrator, the result writer) can decide in-band recording
//! versus fatal/process-exit handling without matching on variant names directly.

use thiserror::Error;

/// Main error type for the analytics engine.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed schedule, unreadable event store root, invalid CLI configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Empty window, unreadable parquet, malformed event columns.
    #[error("io/data error: {0}")]
    IoData(String),

    /// A specific graph primitive failed or is unavailable in the capability layer.
    #[error("algorithm '{name}' failed: {message}")]
    Algorithm { name: String, message: String },

    /// A validator check failed.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// A worker crashed while processing a window.
    #[error("worker system error: {0}")]
    System(String),

    /// Propagated filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Propagated Arrow error (schema mismatch, cast failure).
    #[error("arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Propagated Parquet error (reader/writer failure).
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Propagated CSV error (window schedule parsing).
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Propagated JSON (de)serialization error.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Propagated timestamp parsing error.
    #[error("timestamp parse error: {0}")]
    Chrono(#[from] chrono::ParseError),
}

/// The five error kinds named in the error handling design, independent of payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    IoData,
    Algorithm,
    Invariant,
    System,
}

impl Error {
    /// Build a `Config` error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Build an `IoData` error.
    pub fn io_data(msg: impl Into<String>) -> Self {
        Self::IoData(msg.into())
    }

    /// Build an `Algorithm` error tagged with the capability name that failed
    /// (e.g. `base__pagerank`), matching the `errors.json` tag convention.
    pub fn algorithm(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Algorithm {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Build an `Invariant` error.
    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::Invariant(msg.into())
    }

    /// Build a `System` error.
    pub fn system(msg: impl Into<String>) -> Self {
        Self::System(msg.into())
    }

    /// The taxonomy kind this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::IoData(_) | Self::Io(_) | Self::Arrow(_) | Self::Parquet(_) | Self::Csv(_) => {
                ErrorKind::IoData
            }
            Self::Algorithm { .. } => ErrorKind::Algorithm,
            Self::Invariant(_) => ErrorKind::Invariant,
            Self::System(_) => ErrorKind::System,
            Self::Serde(_) => ErrorKind::IoData,
            Self::Chrono(_) => ErrorKind::Config,
        }
    }

    /// Whether this error should be recorded as `errors.fatal` for the window rather
    /// than as a named non-fatal tag. Config and IoData errors are fatal to the window
    /// (or the run, for Config); Algorithm errors are never fatal; Invariant and System
    /// errors are fatal only by the caller's own fail-fast policy, not unconditionally.
    pub fn is_fatal_to_window(&self) -> bool {
        matches!(self.kind(), ErrorKind::Config | ErrorKind::IoData)
    }
}

/// Result type alias for the analytics engine.
pub type Result<T> = std::result::Result<T, Error>;
