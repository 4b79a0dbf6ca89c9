//! Optional `packager.toml` configuration file.
//!
//! Every key is optional; missing keys keep the built-in defaults. Unknown
//! keys are rejected so typos surface instead of being ignored.
//!
//! ```toml
//! templates_dir = "templates"
//! scripts_dir = "deploy"
//! install_script = "install.ps1"
//! staging_dir = "C:/build/tmp"
//! package_identifier = "MSTeams"
//!
//! [tool]
//! url = "https://example.com/IntuneWinAppUtil.zip"
//! name = "IntuneWinAppUtil.exe"
//! path = "tools/IntuneWinAppUtil.exe"
//! ```

use crate::error::{AppError, CliError, Result};
use crate::packager::{Settings, SettingsBuilder};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "packager.toml";

/// Parsed configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Template source directory
    pub templates_dir: Option<PathBuf>,
    /// Deployment scripts directory
    pub scripts_dir: Option<PathBuf>,
    /// Setup file name inside the scripts directory
    pub install_script: Option<String>,
    /// Parent for staging and scratch directories
    pub staging_dir: Option<PathBuf>,
    /// Appx package removed by `uninstall`
    pub package_identifier: Option<String>,
    /// Packaging tool location
    #[serde(default)]
    pub tool: ToolConfig,
}

/// `[tool]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Archive download URL
    pub url: Option<String>,
    /// Executable name inside the archive
    pub name: Option<String>,
    /// Where the executable is placed and run from
    pub path: Option<PathBuf>,
}

impl FileConfig {
    /// Reads and parses a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::Cli(CliError::ExecutionFailed {
                command: "read config".to_string(),
                reason: format!("Failed to read {}: {}", path.display(), e),
            })
        })?;
        Ok(toml::from_str(&text)?)
    }

    /// Loads `explicit` if given, else `packager.toml` in the working
    /// directory if it exists, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.is_file() {
                    log::debug!("Using {}", default.display());
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Applies the file's values over the defaults.
    pub fn into_settings(self) -> Result<Settings> {
        let mut builder = SettingsBuilder::new();
        if let Some(dir) = self.templates_dir {
            builder = builder.templates_dir(dir);
        }
        if let Some(dir) = self.scripts_dir {
            builder = builder.scripts_dir(dir);
        }
        if let Some(name) = self.install_script {
            builder = builder.install_script(name);
        }
        if let Some(dir) = self.staging_dir {
            builder = builder.staging_parent(dir);
        }
        if let Some(id) = self.package_identifier {
            builder = builder.package_identifier(id);
        }
        if let Some(url) = self.tool.url {
            builder = builder.tool_url(url);
        }
        if let Some(name) = self.tool.name {
            builder = builder.tool_name(name);
        }
        if let Some(path) = self.tool.path {
            builder = builder.tool_path(path);
        }
        Ok(builder.build()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let config: FileConfig = toml::from_str(
            r#"
            scripts_dir = "build/Deploy"
            package_identifier = "Contoso.Widget"

            [tool]
            path = "bin/IntuneWinAppUtil.exe"
            "#,
        )
        .unwrap();

        let settings = config.into_settings().unwrap();
        assert_eq!(settings.scripts_dir(), Path::new("build/Deploy"));
        assert_eq!(settings.package_identifier(), "Contoso.Widget");
        assert_eq!(settings.tool_path(), Path::new("bin/IntuneWinAppUtil.exe"));
        assert_eq!(settings.templates_dir(), Path::new("templates"));
        assert_eq!(settings.install_script(), "install.ps1");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<FileConfig>("scripts_directory = \"x\"").is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(FileConfig::discover(Some(&tmp.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn load_reads_file_from_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("packager.toml");
        std::fs::write(&path, "install_script = \"Deploy-Application.ps1\"\n").unwrap();

        let settings = FileConfig::load(&path).unwrap().into_settings().unwrap();
        assert_eq!(settings.expected_artifact_name(), "Deploy-Application.intunewin");
    }
}
