//! Command line interface.
//!
//! Parses arguments, resolves [`crate::packager::Settings`] from the optional
//! config file, and dispatches to a subcommand.

mod args;
pub mod commands;
pub mod outputs;

pub use args::{Args, Command};

use crate::config::FileConfig;
use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    execute(Args::parse_args()).await
}

/// Executes already-parsed arguments.
pub async fn execute(args: Args) -> Result<i32> {
    let settings = FileConfig::discover(args.config.as_deref())?.into_settings()?;
    log::debug!("Resolved settings: {:?}", settings);

    match args.command {
        Command::Package {
            input,
            output_dir,
            github_output,
        } => {
            commands::package::run(
                &settings,
                &input,
                output_dir.as_deref(),
                github_output.as_deref(),
            )
            .await
        }
        Command::Render { vars } => commands::render::run(&settings, &vars).await,
        Command::Uninstall => commands::uninstall::run(&settings).await,
        Command::FetchTool => commands::fetch_tool::run(&settings).await,
    }
}
