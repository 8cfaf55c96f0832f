//! # bundlekit
//!
//! Drives an external JavaScript bundler (bun, esbuild, rollup or webpack)
//! from a single environment-aware YAML config.
//!
//! A [`Context`] owns the [`ConfigStore`], the [`HookRegistry`] and the
//! subprocess [`CommandRunner`]. Its [`BuildCoordinator`] resolves the
//! config for the current environment, runs the selected [`Bundler`]
//! adapter, measures the output and writes a manifest for the asset server.
//!
//! ```no_run
//! use bundlekit::Context;
//!
//! # fn main() -> bundlekit::Result<()> {
//! let mut ctx = Context::builder(".").env("production").build()?;
//! ctx.hooks_mut().on_build_complete(|done| {
//!     println!("built in {}ms", done.duration_ms);
//!     Ok(())
//! });
//!
//! let result = ctx.coordinator().build(&[])?;
//! println!("{} ({})", result.size, result.config.env());
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod context;
pub mod coordinator;
pub mod error;
pub mod hooks;
pub mod manifest;
pub mod package;
pub mod pipeline;
pub mod process;
pub mod size;
pub mod tasks;

pub use bundlekit_config::{ConfigError, ConfigKey, ConfigStore, ResolvedConfig};

pub use adapters::{
    AdapterSettings, Bundler, BundlerKind, CommandTable, Operation, create_bundler,
};
pub use context::{Context, ContextBuilder};
pub use coordinator::{BuildCoordinator, BuildResult};
pub use error::{CommandExecutionError, Error, FailureKind, HookError, HookEvent, Result};
pub use hooks::{BuildCompletion, HookRegistry};
pub use manifest::{ManifestEntry, ManifestLayout, ManifestWriter, OutputDir};
pub use package::{PackageManager, PackageScripts};
pub use pipeline::{ConfigPipelineDetector, FixedPipeline, PipelineDetector};
pub use process::{CommandLine, CommandRunner, ExitState, ProcessOutput, StdioMode, SystemRunner};
pub use size::{BundleSize, format_size};
pub use tasks::{TaskHost, enhance_precompile};
