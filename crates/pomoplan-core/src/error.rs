//! Core error types for pomoplan-core.
//!
//! The countdown engine itself never fails: invalid commands degrade to
//! no-ops with an advisory message. Errors only surface at the edges,
//! when parsing user choices or reading and writing configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomoplan-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// No home directory and no override directory
    #[error("Could not determine a configuration directory")]
    NoConfigDir,
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unknown pomodoro format '{0}' (expected short, long or custom)")]
    UnknownFormat(String),

    #[error("custom format is not configured (set session.custom_work_minutes and session.custom_break_minutes)")]
    CustomFormatUnset,

    /// Work and break lengths must both be positive.
    #[error("invalid format {work_min}/{break_min}: durations must be positive")]
    InvalidFormat { work_min: u32, break_min: u32 },

    #[error("{total} minutes is not an offered total for this format (choose one of {options:?})")]
    TotalNotOffered { total: u32, options: Vec<u32> },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
