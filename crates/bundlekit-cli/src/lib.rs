//! Command-line interface for bundlekit.
//!
//! The binary is thin glue over the `bundlekit` crate:
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`commands`] - one function per subcommand
//! - [`error`] - the CLI error type, rendered through miette
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status lines and the build summary

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
