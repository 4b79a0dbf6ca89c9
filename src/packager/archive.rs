//! Zip extraction and creation.
//!
//! Both functions are blocking; async callers run them through
//! `tokio::task::spawn_blocking`.

use crate::packager::error::{ErrorExt, Result};
use std::{
    fs::{self, File},
    io,
    path::Path,
};
use zip::{CompressionMethod, write::SimpleFileOptions};

/// Extracts a zip archive into `dest_dir`, returning the number of files written.
///
/// Entries whose paths would escape `dest_dir` are skipped.
pub fn extract_zip(archive_path: &Path, dest_dir: &Path) -> Result<usize> {
    log::info!(
        "Extracting {} to {}",
        archive_path.display(),
        dest_dir.display()
    );

    fs::create_dir_all(dest_dir).fs_context("creating extraction directory", dest_dir)?;

    let file = File::open(archive_path).fs_context("opening archive", archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut written = 0;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(entry_path) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe path in zip: {}", entry.name());
            continue;
        };
        let dest_path = dest_dir.join(entry_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            continue;
        }

        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent).fs_context("creating directory", parent)?;
        }
        let mut outfile = File::create(&dest_path).fs_context("creating file", &dest_path)?;
        io::copy(&mut entry, &mut outfile).fs_context("writing file", &dest_path)?;
        written += 1;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Some(mode) = entry.unix_mode().filter(|m| m & 0o777 != 0) {
                fs::set_permissions(&dest_path, fs::Permissions::from_mode(mode & 0o777))
                    .fs_context("setting permissions", &dest_path)?;
            }
        }
    }

    log::debug!("Extracted {} file(s)", written);
    Ok(written)
}

/// Compresses the contents of `src_dir` into a new zip at `dest`.
///
/// Entry names are relative to `src_dir` and use `/` separators. An existing
/// file at `dest` is overwritten. Returns the number of entries written.
pub fn zip_dir(src_dir: &Path, dest: &Path) -> Result<usize> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).fs_context("creating directory", parent)?;
    }

    let file = File::create(dest).fs_context("creating archive", dest)?;
    let mut writer = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut count = 0;

    for entry in walkdir::WalkDir::new(src_dir)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
    {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(src_dir)?;
        let name = rel_path
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            writer.add_directory(format!("{name}/"), options)?;
        } else {
            writer.start_file(name, options)?;
            let mut source = File::open(entry.path()).fs_context("opening file", entry.path())?;
            io::copy(&mut source, &mut writer).fs_context("compressing file", entry.path())?;
        }
        count += 1;
    }

    writer.finish()?;
    log::debug!("Wrote {} entries to {}", count, dest.display());
    Ok(count)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Builds an in-memory zip from `(name, contents)` pairs.
    pub(crate) fn zip_bytes(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(io::Cursor::new(Vec::new()));
        for (name, contents) in files {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(contents).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    /// Lists entry names in a zip file.
    pub(crate) fn entry_names(path: &Path) -> Vec<String> {
        let archive = zip::ZipArchive::new(File::open(path).unwrap()).unwrap();
        let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    #[test]
    fn zip_dir_then_extract_keeps_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let src = tmp.path().join("stage");
        fs::create_dir_all(src.join("Files/sub")).unwrap();
        fs::write(src.join("Files/app.msi"), "msi").unwrap();
        fs::write(src.join("Files/sub/readme.txt"), "hi").unwrap();

        let zip_path = tmp.path().join("out/stage.zip");
        zip_dir(&src, &zip_path).unwrap();

        assert_eq!(
            entry_names(&zip_path),
            vec![
                "Files/",
                "Files/app.msi",
                "Files/sub/",
                "Files/sub/readme.txt"
            ]
        );

        let extracted = tmp.path().join("extracted");
        assert_eq!(extract_zip(&zip_path, &extracted).unwrap(), 2);
        assert_eq!(
            fs::read_to_string(extracted.join("Files/sub/readme.txt")).unwrap(),
            "hi"
        );
    }

    #[test]
    fn extract_skips_escaping_entries() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("evil.zip");
        fs::write(
            &zip_path,
            zip_bytes(&[("../escape.txt", &b"x"[..]), ("ok/inside.txt", &b"y"[..])]),
        )
        .unwrap();

        let dest = tmp.path().join("dest");
        assert_eq!(extract_zip(&zip_path, &dest).unwrap(), 1);
        assert!(dest.join("ok/inside.txt").exists());
        assert!(!tmp.path().join("escape.txt").exists());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let zip_path = tmp.path().join("broken.zip");
        fs::write(&zip_path, b"definitely not a zip").unwrap();
        assert!(extract_zip(&zip_path, &tmp.path().join("d")).is_err());
    }
}
