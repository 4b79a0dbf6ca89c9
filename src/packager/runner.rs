//! Process invocation seam.
//!
//! The remover and the pipeline launch external programs only through
//! [`CommandRunner`], so tests can swap in a fake without touching real
//! package state or vendor binaries.

use crate::packager::error::{Error, Result};
use std::{ffi::OsString, future::Future, path::Path, process::Stdio};

/// Exit status and combined output of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    /// Stdout followed by stderr, lossily decoded.
    pub output: String,
}

impl CommandOutput {
    /// Whether the process exited with code 0.
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs a program to completion and captures its output.
pub trait CommandRunner {
    /// Runs `program` with `args`. Fails only when the process cannot be
    /// started; a non-zero exit is reported through [`CommandOutput::code`].
    fn run(
        &self,
        program: &Path,
        args: &[OsString],
    ) -> impl Future<Output = Result<CommandOutput>> + Send;
}

/// [`CommandRunner`] that spawns real processes with `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[OsString]) -> Result<CommandOutput> {
        log::debug!("Running {} {:?}", program.display(), args);

        let output = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|error| Error::CommandFailed {
                command: program.display().to_string(),
                error,
            })?;

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        log::debug!(
            "{} exited with {:?}",
            program.display(),
            output.status.code()
        );

        Ok(CommandOutput {
            code: output.status.code(),
            output: combined,
        })
    }
}
