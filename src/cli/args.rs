//! Command line argument parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Intune Win32 app packaging helper
#[derive(Parser, Debug)]
#[command(
    name = "intunewin_packager",
    version,
    about = "Render deployment scripts and package installers as .intunewin",
    long_about = "Wraps the Microsoft Win32 Content Prep Tool.

Typical flow:
  intunewin_packager render --f:AppName=Contoso --f:Version=1.2.0
  intunewin_packager fetch-tool
  intunewin_packager package ./installers/Contoso.msi --output-dir ./dist

Set RUST_LOG=debug for tool output and staging details."
)]
pub struct Args {
    /// Config file (default: ./packager.toml when present)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Package an installer into <name>.intunewin and <name>_source.zip
    Package {
        /// Installer file to package
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory for the artifacts (default: the input's directory)
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// File to append `key=value` output lines to
        #[arg(long, env = "GITHUB_OUTPUT", value_name = "PATH")]
        github_output: Option<PathBuf>,
    },

    /// Render *.template files into the deployment scripts directory
    Render {
        /// Template variables as --f:KEY=VALUE
        #[arg(
            value_name = "--f:KEY=VALUE",
            num_args = 0..,
            trailing_var_arg = true,
            allow_hyphen_values = true
        )]
        vars: Vec<String>,
    },

    /// Remove the configured Appx package if it is installed
    Uninstall,

    /// Download the packaging tool to its configured path
    FetchTool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
