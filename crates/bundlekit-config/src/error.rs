//! Error types for configuration loading, resolution and validation.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    /// The config document exists but could not be parsed.
    #[error("invalid YAML in {}: {message}", path.display())]
    #[diagnostic(
        code(bundlekit::config::syntax),
        help("Fix the syntax of the config file or delete it to use the built-in defaults")
    )]
    Syntax { path: PathBuf, message: String },

    /// A resolved environment is missing a value it cannot run without.
    #[error("{env} config must specify '{key}'")]
    #[diagnostic(code(bundlekit::config::validation))]
    Validation {
        env: String,
        key: String,
        #[help]
        hint: Option<String>,
    },

    /// The selected bundler is not a known adapter and strict mode is on.
    #[error("unknown bundler '{name}'. Known bundlers: {}", known.join(", "))]
    #[diagnostic(
        code(bundlekit::config::unknown_bundler),
        help("Unset BUNDLEKIT_STRICT to downgrade this to a warning")
    )]
    UnknownBundler {
        name: String,
        known: Vec<&'static str>,
    },

    /// Resolved configs are frozen once built.
    #[error("config is immutable, refusing to set '{key}'")]
    #[diagnostic(
        code(bundlekit::config::immutable),
        help("Set values in config/bundlekit.yml instead")
    )]
    Immutable { key: String },

    /// Dynamic lookup of a key that the resolved config does not carry.
    #[error("no config key '{key}' for environment '{env}'")]
    #[diagnostic(code(bundlekit::config::unknown_key))]
    UnknownKey { key: String, env: String },

    #[error("I/O error: {0}")]
    #[diagnostic(code(bundlekit::config::io))]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub fn syntax(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn validation(env: &str, key: &str) -> Self {
        Self::Validation {
            env: env.to_string(),
            key: key.to_string(),
            hint: Some(format!("Add '{key}' to the default or {env} section")),
        }
    }

    pub fn immutable(key: impl Into<String>) -> Self {
        Self::Immutable { key: key.into() }
    }
}
