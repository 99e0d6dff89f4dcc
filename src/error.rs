//! Error types for skiff.
//!
//! Uses `thiserror` for ergonomic error definitions. Per-port failures are not
//! errors; they travel as [`crate::scanner::ProbeFailure`] inside outcomes.

use crate::types::{PortError, TargetError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the scan engine itself.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Scan worker failed: {0}")]
    WorkerFailed(String),
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors loading or validating settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("invalid settings file: {0}")]
    InvalidFormat(String),

    #[error("invalid setting {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Top-level error for the command-line front end.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Invalid wait time {0}: must be a positive number of seconds")]
    InvalidWait(f64),

    #[error("Invalid concurrency {0}: must be at least 1")]
    InvalidConcurrency(usize),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Target(#[from] TargetError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// `1` for bad arguments or settings, `2` for resolution and scan failures.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Port(_) | Self::InvalidWait(_) | Self::InvalidConcurrency(_) | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::Target(_) | Self::Scan(_) => exit_code::FATAL,
        }
    }
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: u8 = 0;
    pub const USAGE: u8 = 1;
    pub const FATAL: u8 = 2;
    /// 128 + SIGINT, as shells report it.
    pub const INTERRUPTED: u8 = 130;
}
