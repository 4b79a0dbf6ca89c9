//! `key=value` lines for CI consumers.

use crate::error::Result;
use anyhow::Context;
use std::{fs::OpenOptions, io::Write, path::Path};

/// Output key naming the packaged archive.
pub const INTUNEWIN_PATH_KEY: &str = "intunewin_path";

/// Output key naming the staged-sources zip.
pub const SOURCE_ZIP_PATH_KEY: &str = "source_zip_path";

/// Appends `key=value` lines to `dest`, or prints them when `dest` is `None`.
pub fn emit(dest: Option<&Path>, pairs: &[(&str, String)]) -> Result<()> {
    let mut text = String::new();
    for (key, value) in pairs {
        text.push_str(&format!("{key}={value}\n"));
    }

    match dest {
        Some(path) => {
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open outputs file {}", path.display()))?;
            file.write_all(text.as_bytes())
                .with_context(|| format!("Failed to write outputs to {}", path.display()))?;
            log::debug!("Appended {} output(s) to {}", pairs.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
