//! The authoritative per-environment config view.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;

use crate::document::{DEFAULT_BUNDLER, DEFAULT_SECTION, RawConfigDocument};
use crate::environment::{current_env, strict_mode_from_env};
use crate::error::{ConfigError, Result};
use crate::merge::merge_layers;
use crate::resolved::ResolvedConfig;
use crate::validation::validate;

/// Loads the config document once and hands out cached, validated
/// [`ResolvedConfig`] snapshots per environment.
///
/// # Example
///
/// ```
/// use bundlekit_config::ConfigStore;
/// use serde_json::json;
///
/// let store = ConfigStore::from_value(json!({
///     "default": { "bundler": "esbuild", "outdir": "public/builds" },
///     "production": { "minify": true }
/// }))
/// .unwrap();
///
/// let production = store.resolve("production").unwrap();
/// assert_eq!(production.outdir(), Some("public/builds"));
/// assert!(production.build_flags().contains(&"--minify".to_string()));
/// ```
#[derive(Debug)]
pub struct ConfigStore {
    root: Option<PathBuf>,
    document: RwLock<RawConfigDocument>,
    cache: RwLock<HashMap<String, Arc<ResolvedConfig>>>,
    current_env: String,
    strict: bool,
}

impl ConfigStore {
    /// Load `config/bundlekit.yml` under `root`.
    ///
    /// The current environment and strict mode are read from the process
    /// environment; see [`with_env`](Self::with_env) and
    /// [`with_strict`](Self::with_strict) to override them.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let document = RawConfigDocument::load(&root)?;
        let mut store = Self::from_document(document);
        store.root = Some(root);
        Ok(store)
    }

    /// Store over an in-memory document. [`reload`](Self::reload) only clears
    /// the cache for such stores.
    pub fn from_document(document: RawConfigDocument) -> Self {
        Self {
            root: None,
            document: RwLock::new(document),
            cache: RwLock::new(HashMap::new()),
            current_env: current_env(),
            strict: strict_mode_from_env(),
        }
    }

    pub fn from_value(value: Value) -> Result<Self> {
        Ok(Self::from_document(RawConfigDocument::from_value(value)?))
    }

    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.current_env = env.into();
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn current_env(&self) -> &str {
        &self.current_env
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Re-read the document (when file-backed) and drop every cached config.
    ///
    /// Must not race with in-flight [`resolve`](Self::resolve) calls without
    /// external locking.
    pub fn reload(&self) -> Result<()> {
        if let Some(root) = &self.root {
            let document = RawConfigDocument::load(root)?;
            *self.document.write() = document;
        }
        self.cache.write().clear();
        tracing::debug!("config cache cleared");
        Ok(())
    }

    /// Resolved config for `env`, computed and validated on first access.
    ///
    /// Layers merge as `default` ← section named after the environment's
    /// bundler ← section named after `env`.
    pub fn resolve(&self, env: &str) -> Result<Arc<ResolvedConfig>> {
        if let Some(cached) = self.cache.read().get(env) {
            return Ok(Arc::clone(cached));
        }

        let resolved = {
            let document = self.document.read();
            let bundler = bundler_name_in(&document, env);
            let empty = Value::Null;
            let layers = [
                document.section(DEFAULT_SECTION).unwrap_or(&empty),
                document.section(&bundler).unwrap_or(&empty),
                document.section(env).unwrap_or(&empty),
            ];
            ResolvedConfig::new(env, merge_layers(layers))
        };

        validate(&resolved, self.strict)?;

        let resolved = Arc::new(resolved);
        let mut cache = self.cache.write();
        let entry = cache
            .entry(env.to_string())
            .or_insert_with(|| Arc::clone(&resolved));
        Ok(Arc::clone(entry))
    }

    /// Resolved config for the current environment.
    pub fn resolve_current(&self) -> Result<Arc<ResolvedConfig>> {
        self.resolve(&self.current_env)
    }

    /// Bundler selected for `env`, read straight from the document so it
    /// never triggers resolution.
    pub fn bundler_name(&self, env: &str) -> String {
        bundler_name_in(&self.document.read(), env)
    }

    /// Run validation for `env` (resolution validates implicitly).
    pub fn validate(&self, env: &str) -> Result<()> {
        self.resolve(env).map(|_| ())
    }

    pub fn build_arguments(&self, env: &str) -> Result<Vec<String>> {
        Ok(self.resolve(env)?.build_arguments())
    }

    pub fn build_flags(&self, env: &str) -> Result<Vec<String>> {
        Ok(self.resolve(env)?.build_flags())
    }

    /// Any key of the current environment's resolved config.
    pub fn get(&self, key: &str) -> Result<Value> {
        self.resolve_current()?.require_key(key).cloned()
    }

    /// Always fails: configuration is changed by editing the document.
    pub fn set(&self, key: &str, _value: Value) -> Result<()> {
        Err(ConfigError::immutable(key))
    }
}

fn bundler_name_in(document: &RawConfigDocument, env: &str) -> String {
    [env, DEFAULT_SECTION]
        .into_iter()
        .filter_map(|section| document.lookup(section, "bundler"))
        .filter_map(Value::as_str)
        .find(|name| !name.is_empty())
        .unwrap_or(DEFAULT_BUNDLER)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bundler_name_prefers_environment_section() {
        let store = ConfigStore::from_value(json!({
            "default": {"bundler": "rollup"},
            "production": {"bundler": "webpack"}
        }))
        .unwrap();

        assert_eq!(store.bundler_name("production"), "webpack");
        assert_eq!(store.bundler_name("development"), "rollup");
    }

    #[test]
    fn bundler_name_defaults_to_bun() {
        let store = ConfigStore::from_value(json!({})).unwrap();
        assert_eq!(store.bundler_name("development"), "bun");
    }

    #[test]
    fn resolve_uses_bundler_section_between_default_and_env() {
        let store = ConfigStore::from_value(json!({
            "default": {"bundler": "esbuild", "format": "cjs", "target": "node"},
            "esbuild": {"format": "esm", "platform": "browser"},
            "development": {"platform": "neutral"}
        }))
        .unwrap();

        let config = store.resolve("development").unwrap();
        assert_eq!(config.get_key("format"), Some(&json!("esm")));
        assert_eq!(config.get_key("target"), Some(&json!("node")));
        assert_eq!(config.get_key("platform"), Some(&json!("neutral")));
    }

    #[test]
    fn resolve_is_cached_per_environment() {
        let store = ConfigStore::from_value(json!({"default": {"outdir": "out"}})).unwrap();
        let first = store.resolve("development").unwrap();
        let second = store.resolve("development").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn reload_clears_cache() {
        let store = ConfigStore::from_value(json!({"default": {"outdir": "out"}})).unwrap();
        let first = store.resolve("development").unwrap();
        store.reload().unwrap();
        let second = store.resolve("development").unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn get_reads_current_environment() {
        let store = ConfigStore::from_value(json!({
            "default": {"outdir": "out"},
            "test": {"publicPath": "/assets"}
        }))
        .unwrap()
        .with_env("test");

        assert_eq!(store.get("publicPath").unwrap(), json!("/assets"));
        assert!(matches!(
            store.get("nope"),
            Err(ConfigError::UnknownKey { .. })
        ));
        assert!(matches!(
            store.set("outdir", json!("elsewhere")),
            Err(ConfigError::Immutable { .. })
        ));
    }
}
