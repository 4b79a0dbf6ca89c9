//! Intune Win32 app packaging automation.
//!
//! This library provides:
//! - Deployment script rendering from Handlebars templates
//! - Download and placement of the Win32 Content Prep Tool
//! - A staging pipeline that runs the tool and collects `.intunewin` and
//!   source-zip artifacts
//! - Removal of a single Appx package
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod config;
pub mod error;
pub mod packager;

// Re-export commonly used types
pub use error::{AppError, CliError, Result};
