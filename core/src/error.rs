//! Startup and stream failures.
//!
//! Unrecognized log lines never show up here: extraction returns `Option`
//! and sparse input is the steady state, not an error.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogueError {
    #[error("meta deck catalogue {path:?} not found")]
    NotFound { path: PathBuf },

    #[error("failed to read meta deck catalogue {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("meta deck catalogue {path:?} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum LogSourceError {
    #[error("log file {path:?} not found (is logging enabled in the game client?)")]
    NotFound { path: PathBuf },

    #[error("failed to open log file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed reading log file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Top-level failure of a monitoring run.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("no log file configured")]
    NoLogPath,

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    #[error(transparent)]
    LogSource(#[from] LogSourceError),
}
