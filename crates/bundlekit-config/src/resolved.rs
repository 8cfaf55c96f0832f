//! The frozen, per-environment view of the config document.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{ConfigError, Result};

/// Keys with dedicated accessors.
///
/// Anything else in a resolved config is still reachable through
/// [`ResolvedConfig::get_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    Bundler,
    Target,
    Format,
    Minify,
    Sourcemap,
    Splitting,
    Entrypoint,
    Entrypoints,
    Outdir,
    Platform,
    Mode,
    AnalyzeBundle,
    Commands,
    ManifestLayout,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 14] = [
        ConfigKey::Bundler,
        ConfigKey::Target,
        ConfigKey::Format,
        ConfigKey::Minify,
        ConfigKey::Sourcemap,
        ConfigKey::Splitting,
        ConfigKey::Entrypoint,
        ConfigKey::Entrypoints,
        ConfigKey::Outdir,
        ConfigKey::Platform,
        ConfigKey::Mode,
        ConfigKey::AnalyzeBundle,
        ConfigKey::Commands,
        ConfigKey::ManifestLayout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::Bundler => "bundler",
            ConfigKey::Target => "target",
            ConfigKey::Format => "format",
            ConfigKey::Minify => "minify",
            ConfigKey::Sourcemap => "sourcemap",
            ConfigKey::Splitting => "splitting",
            ConfigKey::Entrypoint => "entrypoint",
            ConfigKey::Entrypoints => "entrypoints",
            ConfigKey::Outdir => "outdir",
            ConfigKey::Platform => "platform",
            ConfigKey::Mode => "mode",
            ConfigKey::AnalyzeBundle => "analyze_bundle",
            ConfigKey::Commands => "commands",
            ConfigKey::ManifestLayout => "manifest_layout",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| format!("'{s}' is not a known config key"))
    }
}

/// Merged `default` ← bundler ← environment settings for one environment.
///
/// There is no way to mutate a `ResolvedConfig` once built; [`set`] exists
/// only to report [`ConfigError::Immutable`] to callers that try.
///
/// [`set`]: ResolvedConfig::set
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    env: String,
    values: Map<String, Value>,
}

impl ResolvedConfig {
    pub fn new(env: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            env: env.into(),
            values,
        }
    }

    /// Environment this config was resolved for.
    pub fn env(&self) -> &str {
        &self.env
    }

    pub fn get(&self, key: ConfigKey) -> Option<&Value> {
        self.values.get(key.as_str())
    }

    /// Uniform accessor for any key, known or not.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Like [`get_key`](Self::get_key) but absence is an error.
    pub fn require_key(&self, key: &str) -> Result<&Value> {
        self.get_key(key).ok_or_else(|| ConfigError::UnknownKey {
            key: key.to_string(),
            env: self.env.clone(),
        })
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Always fails: resolved configs are frozen.
    pub fn set(&self, key: &str, _value: Value) -> Result<()> {
        Err(ConfigError::immutable(key))
    }

    /// String value of `key`, ignoring non-string values.
    pub fn str_value(&self, key: ConfigKey) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Whether `key` holds a truthy value: anything but absent, `null`,
    /// `false` or an empty string.
    pub fn is_enabled(&self, key: ConfigKey) -> bool {
        self.get(key).is_some_and(is_truthy)
    }

    pub fn bundler(&self) -> Option<&str> {
        self.str_value(ConfigKey::Bundler).filter(|s| !s.is_empty())
    }

    pub fn outdir(&self) -> Option<&str> {
        self.str_value(ConfigKey::Outdir).filter(|s| !s.is_empty())
    }

    /// Entrypoints in order: a non-empty `entrypoints` list wins over a
    /// single `entrypoint` string.
    pub fn entrypoints(&self) -> Vec<String> {
        if let Some(Value::Array(items)) = self.get(ConfigKey::Entrypoints) {
            let list: Vec<String> = items.iter().filter_map(render_scalar).collect();
            if !list.is_empty() {
                return list;
            }
        }
        match self.str_value(ConfigKey::Entrypoint) {
            Some(entry) if !entry.is_empty() => vec![entry.to_string()],
            _ => Vec::new(),
        }
    }

    /// Flag tokens derived from `target`, `format`, `minify`, `sourcemap`
    /// and `splitting`, in that order. Falsy values are omitted.
    pub fn build_flags(&self) -> Vec<String> {
        let mut flags = Vec::new();

        for key in [ConfigKey::Target, ConfigKey::Format] {
            if let Some(value) = self.get(key).filter(|v| is_truthy(v)) {
                if let Some(rendered) = render_scalar(value) {
                    flags.push(format!("--{key}={rendered}"));
                }
            }
        }

        for key in [ConfigKey::Minify, ConfigKey::Sourcemap, ConfigKey::Splitting] {
            if self.is_enabled(key) {
                flags.push(format!("--{key}"));
            }
        }

        flags
    }

    /// Full subprocess argument list: entrypoints, `--outdir=<dir>`, then
    /// [`build_flags`](Self::build_flags).
    pub fn build_arguments(&self) -> Vec<String> {
        let mut args = self.entrypoints();
        if let Some(outdir) = self.outdir() {
            args.push(format!("--outdir={outdir}"));
        }
        args.extend(self.build_flags());
        args
    }

    /// Plain JSON copy of the values, for printing.
    pub fn to_value(&self) -> Value {
        Value::Object(self.values.clone())
    }
}

pub(crate) fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn render_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
