//! Intune Win32 app packaging.
//!
//! - [`templates`] - deployment script rendering
//! - [`tool`] - packaging tool download and placement
//! - [`pipeline`] - staging, tool invocation and artifact relocation
//! - [`uninstall`] - Appx package removal
//! - [`runner`] / [`utils::http`] - process and network seams

pub mod archive;
pub mod error;
pub mod pipeline;
pub mod runner;
pub mod settings;
pub mod templates;
pub mod tool;
pub mod uninstall;
pub mod utils;

pub use error::{Context, Error, ErrorExt, Result};
pub use pipeline::{ArtifactPaths, package};
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
pub use settings::{Settings, SettingsBuilder};
pub use templates::{RenderReport, TemplateVariables, parse_variable_args, render_templates};
pub use tool::fetch_tool;
pub use uninstall::{AppxRegistry, PackageRegistry, RemovalOutcome, remove_package};
pub use utils::http::{Fetcher, HttpFetcher};
