//! Top-level error type and exit-code policy.
//!
//! Library failures arrive as [`crate::packager::Error`]; this module wraps
//! them with CLI and configuration errors and decides the process exit code.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Exit code for any fatal failure without a more specific OS code.
pub const EXIT_FAILURE: i32 = 1;

/// Main error type for all CLI operations
#[derive(Error, Debug)]
pub enum AppError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Config file parse errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Packaging errors
    #[error("{0}")]
    Packager(#[from] crate::packager::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl AppError {
    /// Process exit code for this error.
    ///
    /// A failed package removal exits with the OS error code it reported;
    /// everything else exits with [`EXIT_FAILURE`].
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Packager(e) => os_exit_code(e.os_code()),
            _ => EXIT_FAILURE,
        }
    }
}

/// Truncates an OS error code to a 32-bit exit code.
///
/// Codes that truncate to 0 map to [`EXIT_FAILURE`] so a failure never
/// exits successfully.
pub fn os_exit_code(code: Option<i64>) -> i32 {
    match code.map(|c| c as i32) {
        Some(0) | None => EXIT_FAILURE,
        Some(c) => c,
    }
}
