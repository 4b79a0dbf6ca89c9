//! File system helpers for staging and artifact relocation.
//!
//! Copies create missing parent directories, removals are idempotent, and
//! blocking tree walks run on the blocking thread pool.

use crate::packager::error::{Error, ErrorExt, Result};
use std::{
    io,
    path::{Path, PathBuf},
};
use tokio::fs;

/// Creates `path` and any missing parents.
pub async fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Removes a file if it exists.
pub async fn remove_file(path: &Path) -> Result<()> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Copies a regular file, creating the destination's parent directories.
///
/// An existing destination is overwritten.
pub async fn copy_file(from: &Path, to: &Path) -> Result<()> {
    if !from.is_file() {
        return Err(Error::GenericError(format!(
            "{} does not exist or is not a file",
            from.display()
        )));
    }
    if let Some(dest_dir) = to.parent() {
        fs::create_dir_all(dest_dir)
            .await
            .fs_context("creating directory", dest_dir)?;
    }
    fs::copy(from, to).await.fs_context("copying file to", to)?;
    Ok(())
}

/// Recursively copies a directory, preserving symlinks.
///
/// Fails if `from` is not a directory.
pub async fn copy_dir(from: &Path, to: &Path) -> Result<()> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!(
            "{} does not exist or is not a directory",
            from.display()
        )));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || copy_dir_blocking(&from, &to))
        .await
        .map_err(|e| Error::GenericError(format!("directory copy task panicked: {e}")))?
}

fn copy_dir_blocking(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        std::fs::create_dir_all(parent).fs_context("creating directory", parent)?;
    }

    for entry in walkdir::WalkDir::new(from) {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);

        if entry.file_type().is_symlink() {
            let target = std::fs::read_link(entry.path())
                .fs_context("reading symlink", entry.path())?;
            let linked = if entry.path().is_dir() {
                symlink_dir(&target, &dest_path)
            } else {
                symlink_file(&target, &dest_path)
            };
            linked.fs_context("creating symlink", &dest_path)?;
        } else if entry.file_type().is_dir() {
            std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path).fs_context("copying file to", &dest_path)?;
        }
    }

    Ok(())
}

/// Copies a file or directory tree to `to`.
///
/// A symlink at `from` is followed, so the copy holds the target's content.
/// Links relative to the source directory would dangle once moved.
pub async fn copy_entry(from: &Path, to: &Path) -> Result<()> {
    let metadata = fs::metadata(from)
        .await
        .fs_context("reading metadata", from)?;
    if metadata.is_dir() {
        copy_dir(from, to).await
    } else {
        copy_file(from, to).await
    }
}

/// Moves a file, falling back to copy + delete when rename crosses devices.
///
/// An existing destination is replaced.
pub async fn move_file(from: &Path, to: &Path) -> Result<PathBuf> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .await
            .fs_context("creating directory", parent)?;
    }

    match fs::rename(from, to).await {
        Ok(()) => {}
        Err(e) => {
            log::debug!(
                "rename {} -> {} failed ({}), copying instead",
                from.display(),
                to.display(),
                e
            );
            fs::copy(from, to).await.fs_context("copying file to", to)?;
            remove_file(from).await?;
        }
    }

    Ok(to.to_path_buf())
}
