//! Packaging tool acquisition.
//!
//! Downloads the tool archive, extracts it into a scratch directory, finds the
//! executable anywhere in the extracted tree and moves it to the configured
//! tool path. The scratch directory and the downloaded archive are removed
//! whether or not the fetch succeeds.

use crate::packager::{
    archive,
    error::{Error, ErrorExt, Result},
    settings::{Settings, TOOL_SCRATCH_PREFIX},
    utils::{fs, http::Fetcher},
};
use std::path::{Path, PathBuf};

/// Downloads the packaging tool and places it at [`Settings::tool_path`].
///
/// Returns the final path of the executable.
pub async fn fetch_tool<F: Fetcher>(fetcher: &F, settings: &Settings) -> Result<PathBuf> {
    let run_id = uuid::Uuid::new_v4();
    let scratch_dir = settings
        .staging_parent()
        .join(format!("{TOOL_SCRATCH_PREFIX}{run_id}"));
    let archive_path = settings
        .staging_parent()
        .join(format!("{TOOL_SCRATCH_PREFIX}{run_id}.zip"));

    let result = download_and_place(fetcher, settings, &archive_path, &scratch_dir).await;

    if let Err(e) = fs::remove_file(&archive_path).await {
        log::warn!("Failed to remove {}: {}", archive_path.display(), e);
    }
    if let Err(e) = fs::remove_dir_all(&scratch_dir).await {
        log::warn!("Failed to remove {}: {}", scratch_dir.display(), e);
    }

    result
}

async fn download_and_place<F: Fetcher>(
    fetcher: &F,
    settings: &Settings,
    archive_path: &Path,
    scratch_dir: &Path,
) -> Result<PathBuf> {
    let data = fetcher.fetch(settings.tool_url()).await?;

    tokio::fs::create_dir_all(settings.staging_parent())
        .await
        .fs_context("creating scratch parent", settings.staging_parent())?;
    tokio::fs::write(archive_path, &data)
        .await
        .fs_context("writing downloaded archive", archive_path)?;

    let (archive_owned, scratch_owned) = (archive_path.to_path_buf(), scratch_dir.to_path_buf());
    tokio::task::spawn_blocking(move || archive::extract_zip(&archive_owned, &scratch_owned))
        .await
        .map_err(|e| Error::GenericError(format!("extraction task panicked: {e}")))??;

    let tool_name = settings.tool_name().to_string();
    let search_root = scratch_dir.to_path_buf();
    let found =
        tokio::task::spawn_blocking(move || find_executable(&search_root, &tool_name))
            .await
            .map_err(|e| Error::GenericError(format!("search task panicked: {e}")))?
            .ok_or_else(|| Error::ToolNotFound {
                name: settings.tool_name().to_string(),
                searched: scratch_dir.to_path_buf(),
            })?;

    log::debug!("Found {} at {}", settings.tool_name(), found.display());

    let dest = fs::move_file(&found, settings.tool_path()).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755))
            .await
            .fs_context("setting permissions", &dest)?;
    }

    log::info!("Packaging tool ready at {}", dest.display());
    Ok(dest)
}

/// Returns the first file under `root` named `name`, compared case-insensitively.
pub fn find_executable(root: &Path, name: &str) -> Option<PathBuf> {
    walkdir::WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .find(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|n| n.eq_ignore_ascii_case(name))
        })
        .map(|e| e.into_path())
}
