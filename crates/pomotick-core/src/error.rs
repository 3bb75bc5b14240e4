//! Core error types for pomotick-core.
//!
//! The timer itself never fails: invalid input degrades to a no-op or to
//! defaults. These errors cover the I/O around it (the key-value store, the
//! runtime config file, the notification device) so callers can decide
//! whether to log or surface them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomotick-core.
///
/// Returned by entry points that touch more than one kind of I/O, such as
/// opening the configured store or reading a saved session.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value storage errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Runtime configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Stored payload could not be decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Key-value storage errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Data directory could not be prepared
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Value could not be encoded for storage
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    /// In-memory store poisoned by a panicking writer
    #[error("In-memory store poisoned")]
    Poisoned,
}

/// Runtime configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dotted key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Notification playback errors. Callers log these and move on.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// Output device rejected the cue
    #[error("Cue playback failed: {0}")]
    Playback(#[from] std::io::Error),

    /// Playback blocked by the environment
    #[error("Cue playback blocked: {0}")]
    Blocked(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
