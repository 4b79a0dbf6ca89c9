//! Ephemeral staging directory.

use crate::packager::{
    error::{Context, ErrorExt, Result},
    settings::{
        APP_CONTENT_DIR, ARTIFACT_EXTENSION, CANONICAL_APP_STEM, SOURCE_ZIP_SUFFIX, STAGING_PREFIX,
        TOOL_SCRATCH_PREFIX,
    },
    utils::fs,
};
use std::path::{Path, PathBuf};

/// A uniquely named working tree for one pipeline run.
///
/// Nothing removes it automatically; callers must call [`StagingDir::remove`]
/// on every path out of the run.
#[derive(Debug)]
pub struct StagingDir {
    root: PathBuf,
}

impl StagingDir {
    /// Creates `<parent>/intunewin-stage-<uuid>`.
    pub async fn create(parent: &Path) -> Result<Self> {
        let root = parent.join(format!("{STAGING_PREFIX}{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&root).await?;
        log::debug!("Created staging directory {}", root.display());
        Ok(Self { root })
    }

    /// Staging root, passed to the tool as both content source and output folder.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Application content directory inside the root.
    pub fn app_dir(&self) -> PathBuf {
        self.root.join(APP_CONTENT_DIR)
    }

    /// Copies `input` into the content directory as `app.<ext>`, then copies
    /// every sibling entry except the input and earlier pipeline outputs.
    ///
    /// Returns the staged path of the input.
    pub async fn stage_application(&self, input: &Path) -> Result<PathBuf> {
        let app_dir = self.app_dir();
        fs::create_dir_all(&app_dir).await?;

        let canonical = canonical_name(input);
        let staged_input = app_dir.join(&canonical);
        fs::copy_file(input, &staged_input).await?;
        log::info!("Staged {} as {}", input.display(), canonical);

        let input_dir = parent_dir(input);
        let input_name = input.file_name().context("input path has no file name")?;
        let resolved_root = tokio::fs::canonicalize(&self.root)
            .await
            .fs_context("resolving staging directory", &self.root)?;

        let mut entries = tokio::fs::read_dir(input_dir)
            .await
            .fs_context("reading input directory", input_dir)?;
        let mut siblings = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .fs_context("reading input directory", input_dir)?
        {
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if name == input_name || is_pipeline_output(&name_str) || is_scratch_dir(&name_str) {
                continue;
            }
            if name_str == canonical {
                log::warn!(
                    "Skipping sibling {} because it collides with the staged input name",
                    entry.path().display()
                );
                continue;
            }
            if holds_staging_root(&entry.path(), &resolved_root).await {
                log::warn!(
                    "Skipping sibling {} because it contains the staging directory",
                    entry.path().display()
                );
                continue;
            }
            siblings.push(entry.path());
        }
        siblings.sort();

        for sibling in siblings {
            let Some(name) = sibling.file_name() else {
                continue;
            };
            log::debug!("Staging sibling {}", sibling.display());
            fs::copy_entry(&sibling, &app_dir.join(name)).await?;
        }

        Ok(staged_input)
    }

    /// Copies the deployment scripts directory into the root, keeping its name.
    pub async fn stage_scripts(
        &self,
        scripts_dir: &Path,
        dir_name: &std::ffi::OsStr,
    ) -> Result<PathBuf> {
        let dest = self.root.join(dir_name);
        fs::copy_dir(scripts_dir, &dest).await?;
        log::info!("Staged deployment scripts from {}", scripts_dir.display());
        Ok(dest)
    }

    /// Removes the staging tree. Failures are logged, not returned.
    pub async fn remove(self) {
        log::debug!("Removing staging directory {}", self.root.display());
        if let Err(e) = fs::remove_dir_all(&self.root).await {
            log::warn!(
                "Failed to clean up staging directory {}: {}",
                self.root.display(),
                e
            );
        }
    }
}

/// `app.<original extension>`, or `app` when the input has no extension.
pub fn canonical_name(input: &Path) -> String {
    match input.extension() {
        Some(ext) => format!("{CANONICAL_APP_STEM}.{}", ext.to_string_lossy()),
        None => CANONICAL_APP_STEM.to_string(),
    }
}

/// Directory containing `path`; `.` for bare file names.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Whether a name belongs to a staging or tool scratch directory, including
/// ones left behind by interrupted runs.
fn is_scratch_dir(name: &str) -> bool {
    name.starts_with(STAGING_PREFIX) || name.starts_with(TOOL_SCRATCH_PREFIX)
}

/// Whether `path` is the staging root or one of its ancestors.
async fn holds_staging_root(path: &Path, resolved_root: &Path) -> bool {
    tokio::fs::canonicalize(path)
        .await
        .is_ok_and(|resolved| resolved_root.starts_with(resolved))
}

/// Whether a file name looks like an artifact of an earlier run.
fn is_pipeline_output(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(&format!(".{ARTIFACT_EXTENSION}")) || lower.ends_with(SOURCE_ZIP_SUFFIX)
}
