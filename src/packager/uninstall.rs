//! Removal of a single Appx package.
//!
//! [`remove_package`] asks a [`PackageRegistry`] for an installed package and
//! removes it if present. An absent package is success. Errors from the query
//! or the removal are returned unchanged, including the OS error code.

use crate::packager::{
    error::{Error, Result},
    runner::CommandRunner,
};
use std::{ffi::OsString, future::Future, path::PathBuf};

/// An installed package as reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    /// Full package name (name, version, architecture, publisher id).
    pub full_name: String,
}

/// Result of a successful [`remove_package`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemovalOutcome {
    /// Nothing matched the identifier; no removal was attempted.
    NotInstalled,
    /// The package was removed.
    Removed {
        /// Full name passed to the removal call
        full_name: String,
    },
}

/// OS package registry operations.
pub trait PackageRegistry {
    /// Looks up an installed, fully staged package by name.
    fn find_installed(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<Option<InstalledPackage>>> + Send;

    /// Removes a package by full name.
    fn remove(&self, full_name: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Removes `identifier` if it is installed. Makes a single attempt.
pub async fn remove_package<R: PackageRegistry>(
    registry: &R,
    identifier: &str,
) -> Result<RemovalOutcome> {
    log::info!("Looking for installed package {}", identifier);

    let Some(package) = registry.find_installed(identifier).await? else {
        log::info!("{} is not installed, nothing to remove", identifier);
        return Ok(RemovalOutcome::NotInstalled);
    };

    log::info!("Removing {}", package.full_name);
    registry.remove(&package.full_name).await?;
    log::info!("Removed {}", package.full_name);

    Ok(RemovalOutcome::Removed {
        full_name: package.full_name,
    })
}

/// [`PackageRegistry`] that drives the Appx cmdlets through PowerShell.
#[derive(Debug, Clone)]
pub struct AppxRegistry<R> {
    runner: R,
    powershell: PathBuf,
}

impl<R: CommandRunner> AppxRegistry<R> {
    /// Locates Windows PowerShell, falling back to PowerShell 7 (`pwsh`).
    pub fn detect(runner: R) -> Result<Self> {
        let powershell = which::which("powershell")
            .or_else(|_| which::which("pwsh"))
            .map_err(|e| Error::GenericError(format!("PowerShell not found in PATH: {e}")))?;
        log::debug!("Using {}", powershell.display());
        Ok(Self::with_powershell(runner, powershell))
    }

    /// Uses a specific PowerShell executable (e.g. `pwsh`).
    pub fn with_powershell(runner: R, powershell: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            powershell: powershell.into(),
        }
    }

    fn script_args(script: String) -> Vec<OsString> {
        ["-NoProfile", "-NonInteractive", "-Command"]
            .into_iter()
            .map(OsString::from)
            .chain(std::iter::once(OsString::from(script)))
            .collect()
    }
}

/// Quotes a value as a PowerShell single-quoted literal.
fn ps_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

impl<R: CommandRunner + Sync> PackageRegistry for AppxRegistry<R> {
    async fn find_installed(&self, identifier: &str) -> Result<Option<InstalledPackage>> {
        let script = format!(
            "$ErrorActionPreference = 'Stop'; \
             Get-AppxPackage -Name {} | \
             Where-Object {{ -not $_.IsPartiallyStaged }} | \
             Select-Object -First 1 -ExpandProperty PackageFullName",
            ps_quote(identifier)
        );

        let out = self
            .runner
            .run(&self.powershell, &Self::script_args(script))
            .await
            .map_err(|e| Error::RegistryQuery {
                identifier: identifier.to_string(),
                reason: e.to_string(),
            })?;

        if !out.success() {
            return Err(Error::RegistryQuery {
                identifier: identifier.to_string(),
                reason: format!(
                    "Get-AppxPackage exited with {:?}: {}",
                    out.code,
                    out.output.trim()
                ),
            });
        }

        Ok(out
            .output
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(|full_name| InstalledPackage {
                full_name: full_name.to_string(),
            }))
    }

    async fn remove(&self, full_name: &str) -> Result<()> {
        let script = format!(
            "try {{ Remove-AppxPackage -Package {} -ErrorAction Stop }} \
             catch {{ [Console]::Error.WriteLine($_.Exception.Message); \
             $code = $_.Exception.HResult; if ($code -eq 0) {{ $code = 1 }}; exit $code }}",
            ps_quote(full_name)
        );

        let out = self
            .runner
            .run(&self.powershell, &Self::script_args(script))
            .await?;

        if out.success() {
            return Ok(());
        }

        Err(Error::RemovalFailed {
            full_name: full_name.to_string(),
            code: out.code.map(i64::from),
            message: out.output.trim().to_string(),
        })
    }
}
