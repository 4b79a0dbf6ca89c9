//! Configuration for the renderer, the tool fetcher, the pipeline and the
//! package remover.
//!
//! Every fixed name the workflow relies on lives here as a named constant so
//! that callers (and tests) can override it through [`SettingsBuilder`].

mod builder;
mod core;

pub use builder::SettingsBuilder;
pub use core::Settings;

/// Appx package family name removed by the `uninstall` command.
pub const DEFAULT_PACKAGE_IDENTIFIER: &str = "MSTeams";

/// Directory holding `*.template` files.
pub const DEFAULT_TEMPLATES_DIR: &str = "templates";

/// Directory the renderer writes into and the pipeline copies into staging.
pub const DEFAULT_SCRIPTS_DIR: &str = "deploy";

/// Setup file handed to the packaging tool, relative to the scripts directory.
pub const DEFAULT_INSTALL_SCRIPT: &str = "install.ps1";

/// Suffix stripped from template file names when rendering.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// Archive containing the Win32 Content Prep Tool.
pub const DEFAULT_TOOL_URL: &str =
    "https://github.com/microsoft/Microsoft-Win32-Content-Prep-Tool/archive/refs/heads/master.zip";

/// Executable located inside the downloaded archive.
pub const DEFAULT_TOOL_NAME: &str = "IntuneWinAppUtil.exe";

/// Where the fetched executable is placed.
pub const DEFAULT_TOOL_PATH: &str = "tools/IntuneWinAppUtil.exe";

/// Subdirectory of the staging root holding application content.
pub const APP_CONTENT_DIR: &str = "Files";

/// File stem the input package is renamed to inside [`APP_CONTENT_DIR`].
pub const CANONICAL_APP_STEM: &str = "app";

/// Extension of the packaging tool's output.
pub const ARTIFACT_EXTENSION: &str = "intunewin";

/// Suffix appended to the input stem for the staged-tree archive.
pub const SOURCE_ZIP_SUFFIX: &str = "_source.zip";

/// Prefix of every staging directory name.
pub const STAGING_PREFIX: &str = "intunewin-stage-";

/// Prefix of the tool fetcher's scratch directory and downloaded archive.
pub const TOOL_SCRATCH_PREFIX: &str = "intunewin-tool-";
