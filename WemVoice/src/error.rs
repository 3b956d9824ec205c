//! Error types for `WemVoice`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `WemVoice` operations.
///
/// Only run-level conditions are errors. Per-item problems (a degraded
/// descriptor, a descriptor with no matching voice, a failed copy) are
/// carried as data in the run's results so a batch never stops halfway.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== Run Setup Errors ====================
    /// A configured input folder does not exist.
    #[error("input folder does not exist: {path}")]
    InputNotFound {
        /// The missing folder.
        path: PathBuf,
    },

    /// The configured output folder does not exist.
    #[error("output folder does not exist: {path}")]
    OutputNotFound {
        /// The missing folder.
        path: PathBuf,
    },

    /// The run was cancelled before a stage could start.
    #[error("run cancelled")]
    Cancelled,

    // ==================== Configuration Errors ====================
    /// The configuration file could not be parsed.
    #[error("invalid configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// The configuration could not be serialized.
    #[error("could not serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    /// JSON serialization error (run summaries).
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== File System Errors ====================
    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `WemVoice` operations.
pub type Result<T> = std::result::Result<T, Error>;
