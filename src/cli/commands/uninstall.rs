//! `uninstall` command.

use crate::error::Result;
use crate::packager::{AppxRegistry, ProcessRunner, RemovalOutcome, Settings, remove_package};

/// Removes the configured package. A removal failure propagates so that
/// `main` can exit with the OS error code.
pub async fn run(settings: &Settings) -> Result<i32> {
    let registry = AppxRegistry::detect(ProcessRunner)?;

    match remove_package(&registry, settings.package_identifier()).await? {
        RemovalOutcome::NotInstalled => {
            log::info!("{} already absent", settings.package_identifier())
        }
        RemovalOutcome::Removed { full_name } => log::info!("✓ Uninstalled {}", full_name),
    }

    Ok(0)
}
