//! `package` command.

use crate::cli::outputs::{self, INTUNEWIN_PATH_KEY, SOURCE_ZIP_PATH_KEY};
use crate::error::Result;
use crate::packager::{ProcessRunner, Settings, package};
use std::path::Path;

/// Packages `input` and reports the artifact paths.
pub async fn run(
    settings: &Settings,
    input: &Path,
    output_dir: Option<&Path>,
    github_output: Option<&Path>,
) -> Result<i32> {
    let paths = package(&ProcessRunner, settings, input, output_dir).await?;

    outputs::emit(
        github_output,
        &[
            (INTUNEWIN_PATH_KEY, paths.intunewin.display().to_string()),
            (SOURCE_ZIP_PATH_KEY, paths.source_zip.display().to_string()),
        ],
    )?;

    Ok(0)
}
