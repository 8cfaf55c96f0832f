//! One build, end to end.
//!
//! ```text
//! resolve config ─► build-start hooks ─► ensure outdir ─► run bundler
//!                                                            │
//!            ┌───────────────────────────────────────────────┤
//!            ▼ success                                       ▼ failure
//!   size + manifest (never fatal)                      error hooks
//!   build-complete hooks                               build-complete hooks
//!   Ok(BuildResult)                                    Err(BuildFailed)
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use bundlekit_config::{ConfigKey, ResolvedConfig};

use crate::adapters::Bundler;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::hooks::BuildCompletion;
use crate::manifest::OutputDir;
use crate::process::{ExitState, ProcessOutput};
use crate::size::{BundleSize, measure_bundle};

/// Outcome of a successful build.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub success: bool,
    /// The exact config the build ran with.
    pub config: Arc<ResolvedConfig>,
    pub duration_ms: f64,
    pub size: BundleSize,
    /// Manifest written for this build, if any.
    pub manifest: Option<PathBuf>,
    pub output: ProcessOutput,
}

/// Runs builds and the dependency passthroughs against a [`Context`].
#[derive(Debug)]
pub struct BuildCoordinator<'ctx> {
    ctx: &'ctx Context,
}

impl<'ctx> BuildCoordinator<'ctx> {
    pub fn new(ctx: &'ctx Context) -> Self {
        Self { ctx }
    }

    /// Build the current environment.
    ///
    /// Config and adapter errors are returned unchanged before any hook
    /// runs. A bundler failure is reported to the error and build-complete
    /// hooks and then returned wrapped in [`Error::BuildFailed`].
    pub fn build(&self, extra_args: &[String]) -> Result<BuildResult> {
        let config = self.ctx.config()?;
        let adapter = self.ctx.adapter_for(Arc::clone(&config))?;

        self.ctx.hooks().trigger_build_start(&config)?;
        let outdir = self.prepare_outdir(&config);

        let started = Instant::now();
        let outcome = adapter.build(extra_args);
        let duration_ms = round_ms(started.elapsed().as_secs_f64() * 1000.0);

        match outcome {
            Ok(output) => self.succeed(config, outdir, duration_ms, output),
            Err(err) => Err(self.fail(err, config, duration_ms)),
        }
    }

    fn prepare_outdir(&self, config: &ResolvedConfig) -> Option<OutputDir> {
        let outdir = OutputDir::new(self.ctx.root(), config.outdir()?);
        let path = outdir.path();
        if !path.exists() {
            tracing::warn!("output directory {} does not exist; creating it", path.display());
            if let Err(err) = fs::create_dir_all(path) {
                tracing::warn!("could not create {}: {err}", path.display());
            }
        }
        Some(outdir)
    }

    fn succeed(
        &self,
        config: Arc<ResolvedConfig>,
        outdir: Option<OutputDir>,
        duration_ms: f64,
        output: ProcessOutput,
    ) -> Result<BuildResult> {
        let analyze = config.is_enabled(ConfigKey::AnalyzeBundle);
        let size = outdir
            .as_ref()
            .map_or(BundleSize::Unknown, |dir| measure_bundle(dir.path(), analyze));
        let manifest = outdir
            .as_ref()
            .and_then(|dir| self.write_manifest(&config, dir));

        tracing::info!(env = config.env(), duration_ms, size = %size, "build succeeded");

        self.ctx.hooks().trigger_build_complete(&BuildCompletion {
            success: true,
            config: &config,
            duration_ms,
            size: Some(&size),
            error: None,
        })?;

        Ok(BuildResult {
            success: true,
            config,
            duration_ms,
            size,
            manifest,
            output,
        })
    }

    fn write_manifest(&self, config: &ResolvedConfig, outdir: &OutputDir) -> Option<PathBuf> {
        let layout = self.ctx.pipeline().detect(config);
        match layout.writer().generate(outdir) {
            Ok(path) => Some(path),
            Err(err) => {
                tracing::warn!(layout = %layout, "skipping manifest: {err}");
                None
            }
        }
    }

    /// Notify observers of `err` and wrap it with the build context. A
    /// failing observer replaces the build error.
    fn fail(&self, err: Error, config: Arc<ResolvedConfig>, duration_ms: f64) -> Error {
        tracing::debug!(env = config.env(), duration_ms, "build failed: {err}");

        let hooks = self.ctx.hooks();
        if let Err(hook_err) = hooks.trigger_error(&err) {
            return hook_err;
        }
        let completion = BuildCompletion {
            success: false,
            config: &config,
            duration_ms,
            size: None,
            error: Some(&err),
        };
        if let Err(hook_err) = hooks.trigger_build_complete(&completion) {
            return hook_err;
        }

        Error::BuildFailed {
            source: Box::new(err),
            config,
            duration_ms,
        }
    }

    /// Run the watcher in the foreground until it exits.
    pub fn watch(&self, extra_args: &[String]) -> Result<ExitState> {
        self.adapter()?.watch(extra_args)
    }

    /// Install the project's dependencies with the terminal attached.
    ///
    /// # Errors
    ///
    /// [`Error::CommandExecution`] when the installer exits non-zero.
    pub fn install(&self, extra_args: &[String]) -> Result<ProcessOutput> {
        self.adapter()?.install(extra_args)
    }

    /// Add `packages`; `Ok(false)` when the package manager reports failure.
    pub fn add(&self, packages: &[String]) -> Result<bool> {
        self.adapter()?.add_packages(packages)
    }

    pub fn remove(&self, packages: &[String]) -> Result<bool> {
        self.adapter()?.remove_packages(packages)
    }

    /// Run the bundler's runtime with `args` verbatim.
    pub fn exec(&self, args: &[String]) -> Result<bool> {
        self.adapter()?.exec_raw(args)
    }

    /// Trimmed output of the bundler's version command.
    pub fn version(&self) -> Result<String> {
        self.adapter()?.version()
    }

    pub fn is_available(&self) -> Result<bool> {
        Ok(self.adapter()?.is_available())
    }

    fn adapter(&self) -> Result<Box<dyn Bundler>> {
        self.ctx.adapter()
    }
}

fn round_ms(ms: f64) -> f64 {
    (ms * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations_keep_two_decimals() {
        assert_eq!(round_ms(12.3456), 12.35);
        assert_eq!(round_ms(0.001), 0.0);
        assert_eq!(round_ms(1500.0), 1500.0);
    }
}
