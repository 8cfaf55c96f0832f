//! Raw config document loading.
//!
//! The document lives at `config/bundlekit.yml` under the project root and is
//! a mapping of section name to settings: `default`, one section per bundler
//! and one per environment. A missing file falls back to
//! [`RawConfigDocument::builtin`].

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format as _, Yaml};
use serde_json::{Map, Value, json};

use crate::error::{ConfigError, Result};

/// Project-relative location of the config document.
pub const CONFIG_PATH: &str = "config/bundlekit.yml";

pub const DEFAULT_SECTION: &str = "default";

/// Bundler used when neither the environment nor `default` names one.
pub const DEFAULT_BUNDLER: &str = "bun";

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    File(PathBuf),
    Builtin,
}

/// Section-name to settings mapping, exactly as loaded.
#[derive(Debug, Clone)]
pub struct RawConfigDocument {
    sections: Map<String, Value>,
    source: DocumentSource,
}

impl RawConfigDocument {
    /// Load `config/bundlekit.yml` below `root`, or the built-in defaults when
    /// the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Syntax`] when the file cannot be parsed.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let path = root.as_ref().join(CONFIG_PATH);
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no config document, using built-in defaults");
            return Ok(Self::builtin());
        }
        let content = fs::read_to_string(&path)?;
        Self::parse(&content, &path)
    }

    /// Parse YAML `content`; `path` is only used in error messages.
    pub fn parse(content: &str, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if content.trim().is_empty() {
            return Ok(Self {
                sections: Map::new(),
                source: DocumentSource::File(path),
            });
        }

        let value: Value = Figment::from(Yaml::string(content))
            .extract()
            .map_err(|e| ConfigError::syntax(&path, e.to_string()))?;

        match value {
            Value::Object(sections) => Ok(Self {
                sections,
                source: DocumentSource::File(path),
            }),
            Value::Null => Ok(Self {
                sections: Map::new(),
                source: DocumentSource::File(path),
            }),
            other => Err(ConfigError::syntax(
                &path,
                format!("expected a mapping of sections, found {}", type_name(&other)),
            )),
        }
    }

    /// Build a document from an in-memory value (used by embedders and tests).
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(sections) => Ok(Self {
                sections,
                source: DocumentSource::Builtin,
            }),
            other => Err(ConfigError::syntax(
                "<memory>",
                format!("expected a mapping of sections, found {}", type_name(&other)),
            )),
        }
    }

    /// The document used when no config file exists.
    pub fn builtin() -> Self {
        let value = json!({
            "default": {
                "bundler": DEFAULT_BUNDLER,
                "target": "browser",
                "format": "esm",
                "minify": false,
                "sourcemap": false,
                "entrypoint": "./app/javascript/application.js",
                "outdir": "app/assets/builds"
            },
            "bun": {
                "target": "browser",
                "format": "esm"
            },
            "esbuild": {
                "target": "browser",
                "format": "esm",
                "platform": "browser"
            },
            "rollup": {
                "format": "esm",
                "sourcemap": true
            },
            "webpack": {
                "mode": "production",
                "target": "web"
            },
            "development": {
                "sourcemap": true
            },
            "production": {
                "minify": true,
                "sourcemap": false,
                "analyze_bundle": false
            }
        });

        let sections = match value {
            Value::Object(sections) => sections,
            _ => Map::new(),
        };
        Self {
            sections,
            source: DocumentSource::Builtin,
        }
    }

    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// A section by name, if present.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.sections.get(name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    /// `key` from section `section` when that section is a mapping.
    pub fn lookup(&self, section: &str, key: &str) -> Option<&Value> {
        self.section(section).and_then(|s| s.get(key))
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_falls_back_to_builtin_when_missing() {
        let dir = TempDir::new().unwrap();
        let doc = RawConfigDocument::load(dir.path()).unwrap();
        assert_eq!(doc.source(), &DocumentSource::Builtin);
        assert_eq!(doc.lookup("default", "bundler"), Some(&json!("bun")));
    }

    #[test]
    fn load_reads_yaml_sections() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("config")).unwrap();
        fs::write(
            dir.path().join(CONFIG_PATH),
            "default:\n  bundler: rollup\n  outdir: dist\nproduction:\n  minify: true\n",
        )
        .unwrap();

        let doc = RawConfigDocument::load(dir.path()).unwrap();
        assert!(matches!(doc.source(), DocumentSource::File(_)));
        assert_eq!(doc.lookup("default", "bundler"), Some(&json!("rollup")));
        assert_eq!(doc.lookup("production", "minify"), Some(&json!(true)));
        assert!(!doc.has_section("development"));
    }

    #[test]
    fn malformed_yaml_is_a_syntax_error() {
        let result = RawConfigDocument::parse("default:\n  bundler: [bun\n", "broken.yml");
        match result {
            Err(ConfigError::Syntax { path, message }) => {
                assert_eq!(path, PathBuf::from("broken.yml"));
                assert!(!message.is_empty());
            }
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn scalar_document_is_rejected() {
        assert!(matches!(
            RawConfigDocument::from_value(json!("bun")),
            Err(ConfigError::Syntax { .. })
        ));
    }

    #[test]
    fn empty_file_is_an_empty_document() {
        let doc = RawConfigDocument::parse("   \n", "empty.yml").unwrap();
        assert_eq!(doc.section_names().count(), 0);
    }
}
