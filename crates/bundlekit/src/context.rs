//! The process-wide state a build needs, constructed once and passed around.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bundlekit_config::{ConfigStore, ResolvedConfig};

use crate::adapters::{AdapterSettings, Bundler, create_bundler};
use crate::coordinator::BuildCoordinator;
use crate::error::Result;
use crate::hooks::HookRegistry;
use crate::pipeline::{ConfigPipelineDetector, PipelineDetector};
use crate::process::{CommandRunner, SystemRunner};

/// Project root, config store, hooks, subprocess runner and manifest layout
/// detector for one application.
#[derive(Debug)]
pub struct Context {
    root: PathBuf,
    store: ConfigStore,
    hooks: HookRegistry,
    runner: Arc<dyn CommandRunner>,
    pipeline: Box<dyn PipelineDetector>,
}

impl Context {
    /// Start building a context rooted at `root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bundlekit::{ConfigStore, Context, FixedPipeline, ManifestLayout};
    /// use serde_json::json;
    ///
    /// let store = ConfigStore::from_value(json!({
    ///     "default": { "bundler": "rollup", "outdir": "dist" }
    /// }))
    /// .unwrap();
    ///
    /// let ctx = Context::builder("/srv/app")
    ///     .store(store)
    ///     .env("staging")
    ///     .pipeline(FixedPipeline(ManifestLayout::Legacy))
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(ctx.env(), "staging");
    /// assert_eq!(ctx.config().unwrap().outdir(), Some("dist"));
    /// ```
    pub fn builder(root: impl Into<PathBuf>) -> ContextBuilder {
        ContextBuilder::new(root)
    }

    /// Context for `root` with every default: config from
    /// `config/bundlekit.yml`, real subprocesses, layout from the config.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        Self::builder(root).build()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// The environment builds resolve against.
    pub fn env(&self) -> &str {
        self.store.current_env()
    }

    pub fn hooks(&self) -> &HookRegistry {
        &self.hooks
    }

    /// Register observers after construction.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry {
        &mut self.hooks
    }

    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    pub fn pipeline(&self) -> &dyn PipelineDetector {
        self.pipeline.as_ref()
    }

    /// Resolved config for the current environment.
    pub fn config(&self) -> Result<Arc<ResolvedConfig>> {
        Ok(self.store.resolve_current()?)
    }

    /// Adapter for the current environment's bundler.
    pub fn adapter(&self) -> Result<Box<dyn Bundler>> {
        self.adapter_for(self.config()?)
    }

    /// Adapter for the bundler `config` names, bound to this context's root
    /// and runner.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedBundler`](crate::Error::UnsupportedBundler) when no
    /// adapter exists for the name.
    pub fn adapter_for(&self, config: Arc<ResolvedConfig>) -> Result<Box<dyn Bundler>> {
        create_bundler(AdapterSettings {
            config,
            root: self.root.clone(),
            runner: self.runner(),
        })
    }

    pub fn coordinator(&self) -> BuildCoordinator<'_> {
        BuildCoordinator::new(self)
    }
}

/// Collects overrides for a [`Context`]; see [`Context::builder`].
#[derive(Debug)]
pub struct ContextBuilder {
    root: PathBuf,
    env: Option<String>,
    strict: Option<bool>,
    store: Option<ConfigStore>,
    hooks: HookRegistry,
    runner: Arc<dyn CommandRunner>,
    pipeline: Box<dyn PipelineDetector>,
}

impl ContextBuilder {
    fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            env: None,
            strict: None,
            store: None,
            hooks: HookRegistry::new(),
            runner: Arc::new(SystemRunner),
            pipeline: Box::new(ConfigPipelineDetector),
        }
    }

    /// Override `BUNDLEKIT_ENV`.
    pub fn env(mut self, env: impl Into<String>) -> Self {
        self.env = Some(env.into());
        self
    }

    /// Override `BUNDLEKIT_STRICT`.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Use an already built store instead of loading the config file.
    pub fn store(mut self, store: ConfigStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn hooks(mut self, hooks: HookRegistry) -> Self {
        self.hooks = hooks;
        self
    }

    /// Replace the subprocess runner, e.g. with a scripted one in tests.
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    /// Choose the manifest layout with `pipeline` instead of the config's
    /// `manifest_layout` key.
    pub fn pipeline(mut self, pipeline: impl PipelineDetector + 'static) -> Self {
        self.pipeline = Box::new(pipeline);
        self
    }

    /// Load the config (unless a store was given) and apply the overrides.
    ///
    /// # Errors
    ///
    /// Config loading errors, such as malformed YAML.
    pub fn build(self) -> Result<Context> {
        let mut store = match self.store {
            Some(store) => store,
            None => ConfigStore::load(&self.root)?,
        };
        if let Some(env) = self.env {
            store = store.with_env(env);
        }
        if let Some(strict) = self.strict {
            store = store.with_strict(strict);
        }
        tracing::debug!(
            root = %self.root.display(),
            env = store.current_env(),
            strict = store.is_strict(),
            "context ready"
        );

        Ok(Context {
            root: self.root,
            store,
            hooks: self.hooks,
            runner: self.runner,
            pipeline: self.pipeline,
        })
    }
}
