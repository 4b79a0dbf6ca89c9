//! Core Settings struct and accessors.

use std::path::{Path, PathBuf};

/// Resolved settings for every packaging step.
///
/// Constructed via [`super::SettingsBuilder`]; all fields have defaults taken
/// from the constants in [`super`].
///
/// # Examples
///
/// ```no_run
/// use intunewin_packager::packager::SettingsBuilder;
///
/// # fn example() -> intunewin_packager::packager::Result<()> {
/// let settings = SettingsBuilder::new()
///     .scripts_dir("deploy")
///     .tool_path("tools/IntuneWinAppUtil.exe")
///     .build()?;
/// assert_eq!(settings.install_script(), "install.ps1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Directory scanned for templates.
    pub(super) templates_dir: PathBuf,

    /// Rendered deployment scripts; copied into every staging root.
    pub(super) scripts_dir: PathBuf,

    /// Setup file name inside `scripts_dir`.
    pub(super) install_script: String,

    /// Parent under which staging roots are created.
    pub(super) staging_parent: PathBuf,

    /// Remote archive holding the packaging tool.
    pub(super) tool_url: String,

    /// Executable file name searched for inside the archive.
    pub(super) tool_name: String,

    /// Destination of the fetched executable, and the program the pipeline runs.
    pub(super) tool_path: PathBuf,

    /// Appx package identifier targeted by the remover.
    pub(super) package_identifier: String,
}

impl Settings {
    /// Returns the template source directory.
    pub fn templates_dir(&self) -> &Path {
        &self.templates_dir
    }

    /// Returns the deployment scripts directory.
    pub fn scripts_dir(&self) -> &Path {
        &self.scripts_dir
    }

    /// Returns the setup file name handed to the packaging tool.
    pub fn install_script(&self) -> &str {
        &self.install_script
    }

    /// Returns the directory under which staging roots are created.
    pub fn staging_parent(&self) -> &Path {
        &self.staging_parent
    }

    /// Returns the packaging tool download URL.
    pub fn tool_url(&self) -> &str {
        &self.tool_url
    }

    /// Returns the packaging tool executable name.
    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    /// Returns the packaging tool location.
    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }

    /// Returns the package identifier the remover looks for.
    pub fn package_identifier(&self) -> &str {
        &self.package_identifier
    }

    /// Name of the scripts directory as it appears inside the staging root.
    ///
    /// Falls back to the default directory name when `scripts_dir` ends in `..`
    /// or is a filesystem root.
    pub fn scripts_dir_name(&self) -> &std::ffi::OsStr {
        self.scripts_dir
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new(super::DEFAULT_SCRIPTS_DIR))
    }

    /// Setup file path relative to the staging root, as passed to `-s`.
    pub fn setup_file_relative(&self) -> PathBuf {
        Path::new(self.scripts_dir_name()).join(&self.install_script)
    }

    /// File name the packaging tool writes: the setup file stem plus `.intunewin`.
    pub fn expected_artifact_name(&self) -> String {
        let stem = Path::new(&self.install_script)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.install_script.clone());
        format!("{stem}.{}", super::ARTIFACT_EXTENSION)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            templates_dir: PathBuf::from(super::DEFAULT_TEMPLATES_DIR),
            scripts_dir: PathBuf::from(super::DEFAULT_SCRIPTS_DIR),
            install_script: super::DEFAULT_INSTALL_SCRIPT.to_string(),
            staging_parent: std::env::temp_dir(),
            tool_url: super::DEFAULT_TOOL_URL.to_string(),
            tool_name: super::DEFAULT_TOOL_NAME.to_string(),
            tool_path: PathBuf::from(super::DEFAULT_TOOL_PATH),
            package_identifier: super::DEFAULT_PACKAGE_IDENTIFIER.to_string(),
        }
    }
}
