//! Error types for packaging operations.
//!
//! Every fallible operation in [`crate::packager`] returns [`Result`]. The
//! [`ErrorExt`] and [`Context`] extension traits attach the path or step that
//! failed, and [`crate::bail!`] short-circuits with a [`Error::GenericError`].

use std::{fmt::Display, path::PathBuf};
use thiserror::Error;

/// Result type alias for packaging operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the renderer, the remover, the tool fetcher and the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// Free-form failure with a message
    #[error("{0}")]
    GenericError(String),

    /// Filesystem operation failed on a known path
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being done
        context: &'static str,
        /// Path the operation touched
        path: PathBuf,
        /// Underlying IO error
        #[source]
        error: std::io::Error,
    },

    /// External process could not be spawned
    #[error("failed to execute {command}: {error}")]
    CommandFailed {
        /// Program that was launched
        command: String,
        /// Spawn error
        #[source]
        error: std::io::Error,
    },

    /// HTTP download failed
    #[error("download of {url} failed: {reason}")]
    Download {
        /// URL requested
        url: String,
        /// Transport or status failure
        reason: String,
    },

    /// Zip archive could not be read or written
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A single template could not be parsed or rendered
    #[error("template {}: {reason}", .path.display())]
    Template {
        /// Template file
        path: PathBuf,
        /// Handlebars error text
        reason: String,
    },

    /// Executable missing from an extracted archive
    #[error("{name} not found under {}", .searched.display())]
    ToolNotFound {
        /// File name searched for
        name: String,
        /// Directory that was walked
        searched: PathBuf,
    },

    /// Packaging tool exited without leaving its output file behind
    #[error(
        "packaging tool did not produce {}\n--- tool output ---\n{output}",
        .expected.display()
    )]
    ArtifactMissing {
        /// File the tool was expected to write
        expected: PathBuf,
        /// Combined stdout/stderr of the tool
        output: String,
    },

    /// Package registry could not be queried
    #[error("querying installed packages for {identifier} failed: {reason}")]
    RegistryQuery {
        /// Package identifier that was queried
        identifier: String,
        /// Failure detail
        reason: String,
    },

    /// OS package removal failed
    #[error("removing {full_name} failed{}: {message}", format_code(.code))]
    RemovalFailed {
        /// Full package name passed to the removal call
        full_name: String,
        /// OS error code, when the removal reported one
        code: Option<i64>,
        /// Error text reported by the removal call
        message: String,
    },

    /// Directory traversal error
    #[error("directory walk failed: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path was not under the expected root
    #[error("path prefix error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),
}

fn format_code(code: &Option<i64>) -> String {
    match code {
        Some(code) => format!(" (error code 0x{:08X})", *code as u32),
        None => String::new(),
    }
}

impl Error {
    /// OS error code reported by a failed package removal, if any.
    ///
    /// Filesystem and spawn errors return `None`; their errno is not a
    /// meaningful process exit code.
    pub fn os_code(&self) -> Option<i64> {
        match self {
            Error::RemovalFailed { code, .. } => *code,
            _ => None,
        }
    }
}

/// Attaches a path and step description to IO results.
pub trait ErrorExt<T> {
    /// Converts an IO error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Adds a message to failures and missing values.
pub trait Context<T> {
    /// Wraps the failure in [`Error::GenericError`] prefixed with `context`.
    fn context<C: Display>(self, context: C) -> Result<T>;

    /// Lazily evaluated variant of [`Context::context`].
    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T>;
}

impl<T, E: std::error::Error> Context<T> for std::result::Result<T, E> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C: Display, F: FnOnce() -> C>(self, f: F) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::packager::Error::GenericError(format!($($arg)*)))
    };
}
