//! Builder for constructing Settings.

use super::Settings;
use crate::packager::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// Unset fields keep the defaults from [`Settings::default`].
#[derive(Default)]
pub struct SettingsBuilder {
    templates_dir: Option<PathBuf>,
    scripts_dir: Option<PathBuf>,
    install_script: Option<String>,
    staging_parent: Option<PathBuf>,
    tool_url: Option<String>,
    tool_name: Option<String>,
    tool_path: Option<PathBuf>,
    package_identifier: Option<String>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the template source directory.
    pub fn templates_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.templates_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the deployment scripts directory.
    pub fn scripts_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.scripts_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the setup file name inside the scripts directory.
    pub fn install_script(mut self, name: impl Into<String>) -> Self {
        self.install_script = Some(name.into());
        self
    }

    /// Sets the directory staging roots are created under.
    ///
    /// Default: the system temp directory
    pub fn staging_parent<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.staging_parent = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the packaging tool download URL.
    pub fn tool_url(mut self, url: impl Into<String>) -> Self {
        self.tool_url = Some(url.into());
        self
    }

    /// Sets the executable name searched for in the downloaded archive.
    pub fn tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = Some(name.into());
        self
    }

    /// Sets where the packaging tool lives.
    pub fn tool_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.tool_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the package identifier targeted by `uninstall`.
    pub fn package_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.package_identifier = Some(identifier.into());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a name field is empty or the install script is not
    /// a bare file name.
    pub fn build(self) -> Result<Settings> {
        let defaults = Settings::default();

        let settings = Settings {
            templates_dir: self.templates_dir.unwrap_or(defaults.templates_dir),
            scripts_dir: self.scripts_dir.unwrap_or(defaults.scripts_dir),
            install_script: self.install_script.unwrap_or(defaults.install_script),
            staging_parent: self.staging_parent.unwrap_or(defaults.staging_parent),
            tool_url: self.tool_url.unwrap_or(defaults.tool_url),
            tool_name: self.tool_name.unwrap_or(defaults.tool_name),
            tool_path: self.tool_path.unwrap_or(defaults.tool_path),
            package_identifier: self
                .package_identifier
                .unwrap_or(defaults.package_identifier),
        };

        for (field, value) in [
            ("install_script", settings.install_script.as_str()),
            ("tool_url", settings.tool_url.as_str()),
            ("tool_name", settings.tool_name.as_str()),
            ("package_identifier", settings.package_identifier.as_str()),
        ] {
            if value.trim().is_empty() {
                return Err(Error::GenericError(format!("{field} must not be empty")));
            }
        }

        if Path::new(&settings.install_script).components().count() != 1 {
            return Err(Error::GenericError(format!(
                "install_script must be a file name, got {}",
                settings.install_script
            )));
        }

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_keep_defaults() {
        let settings = SettingsBuilder::new()
            .package_identifier("Contoso.Widget")
            .build()
            .unwrap();
        assert_eq!(settings.package_identifier(), "Contoso.Widget");
        assert_eq!(settings.tool_name(), crate::packager::settings::DEFAULT_TOOL_NAME);
        assert_eq!(settings.staging_parent(), std::env::temp_dir());
    }

    #[test]
    fn empty_identifier_is_rejected() {
        let err = SettingsBuilder::new().package_identifier("  ").build().unwrap_err();
        assert!(err.to_string().contains("package_identifier"));
    }

    #[test]
    fn install_script_with_directory_is_rejected() {
        assert!(SettingsBuilder::new()
            .install_script("nested/install.ps1")
            .build()
            .is_err());
    }
}
