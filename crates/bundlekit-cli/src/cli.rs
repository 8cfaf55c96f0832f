//! Command-line definition.
//!
//! - `bundlekit build [-- ARGS]` - one build for the current environment
//! - `bundlekit watch [-- ARGS]` - run the bundler's watcher in the foreground
//! - `bundlekit install|add|remove|exec` - dependency passthroughs
//! - `bundlekit version|config|bundlers` - inspection

use std::path::PathBuf;

use bundlekit::ManifestLayout;
use clap::{Args, Parser, Subcommand};

/// Drive bun, esbuild, rollup or webpack from config/bundlekit.yml
#[derive(Parser, Debug)]
#[command(name = "bundlekit", version, about)]
pub struct Cli {
    /// Environment to resolve (defaults to $BUNDLEKIT_ENV, then development)
    ///
    /// Long form only: `-e` belongs to the tools behind `exec`.
    #[arg(long, global = true, value_name = "NAME")]
    pub env: Option<String>,

    /// Project root containing config/bundlekit.yml
    #[arg(long, global = true, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Manifest layout to write instead of the config's `manifest_layout`
    #[arg(long, global = true, value_parser = parse_layout, value_name = "LAYOUT")]
    pub manifest_layout: Option<ManifestLayout>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build assets for the current environment
    Build(PassthroughArgs),
    /// Rebuild on change until interrupted
    Watch(PassthroughArgs),
    /// Install the project's JavaScript dependencies
    Install(PassthroughArgs),
    /// Add packages with the bundler's package manager
    Add(PackagesArgs),
    /// Remove packages with the bundler's package manager
    Remove(PackagesArgs),
    /// Run the bundler's runtime with raw arguments
    Exec(ExecArgs),
    /// Print the bundler version
    Version,
    /// Print the resolved config as JSON
    Config,
    /// List the supported bundlers
    Bundlers,
}

#[derive(Args, Debug, Default)]
pub struct PassthroughArgs {
    /// Extra arguments appended to the bundler command (after `--`)
    #[arg(last = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

#[derive(Args, Debug)]
pub struct PackagesArgs {
    #[arg(required = true, value_name = "PACKAGE")]
    pub packages: Vec<String>,
}

/// Raw arguments for `exec`.
///
/// Arguments are passed through verbatim once the first one is read. Put
/// `--` first to pass a leading `-v` or `-q`, which would otherwise be taken
/// as bundlekit's own flags.
#[derive(Args, Debug)]
pub struct ExecArgs {
    #[arg(
        required = true,
        trailing_var_arg = true,
        allow_hyphen_values = true,
        value_name = "ARG"
    )]
    pub args: Vec<String>,
}

fn parse_layout(value: &str) -> Result<ManifestLayout, String> {
    value.parse()
}
