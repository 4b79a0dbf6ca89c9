//! Subcommand implementations. Each returns the process exit code on success.

pub mod fetch_tool;
pub mod package;
pub mod render;
pub mod uninstall;
