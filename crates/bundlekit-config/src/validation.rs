//! Checks applied to every freshly resolved config.

use crate::environment::is_production_like;
use crate::error::{ConfigError, Result};
use crate::resolved::ResolvedConfig;

/// Adapter names the core knows how to drive.
pub const KNOWN_BUNDLERS: &[&str] = &["bun", "esbuild", "rollup", "webpack"];

pub fn is_known_bundler(name: &str) -> bool {
    KNOWN_BUNDLERS.contains(&name)
}

/// Validate a resolved config.
///
/// Production-like environments must name an `outdir` and a `bundler`. An
/// unknown bundler name is logged as a warning, or rejected when `strict`.
pub fn validate(config: &ResolvedConfig, strict: bool) -> Result<()> {
    let env = config.env();

    if is_production_like(env) {
        if config.outdir().is_none() {
            return Err(ConfigError::validation(env, "outdir"));
        }
        if config.bundler().is_none() {
            return Err(ConfigError::validation(env, "bundler"));
        }
    }

    if let Some(name) = config.bundler() {
        if !is_known_bundler(name) {
            if strict {
                return Err(ConfigError::UnknownBundler {
                    name: name.to_string(),
                    known: KNOWN_BUNDLERS.to_vec(),
                });
            }
            tracing::warn!(
                bundler = name,
                env,
                "unknown bundler '{}'. Known bundlers: {}",
                name,
                KNOWN_BUNDLERS.join(", ")
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn resolved(env: &str, value: Value) -> ResolvedConfig {
        match value {
            Value::Object(map) => ResolvedConfig::new(env, map),
            _ => unreachable!("fixture must be a mapping"),
        }
    }

    #[test]
    fn production_requires_outdir() {
        let config = resolved("production", json!({"bundler": "bun"}));
        let err = validate(&config, false).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref key, .. } if key == "outdir"));
    }

    #[test]
    fn production_rejects_empty_bundler() {
        let config = resolved("production", json!({"bundler": "", "outdir": "out"}));
        let err = validate(&config, false).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref key, .. } if key == "bundler"));
    }

    #[test]
    fn development_tolerates_missing_values() {
        let config = resolved("development", json!({}));
        assert!(validate(&config, false).is_ok());
    }

    #[test]
    fn unknown_bundler_warns_unless_strict() {
        let config = resolved("development", json!({"bundler": "parcel"}));
        assert!(validate(&config, false).is_ok());
        assert!(matches!(
            validate(&config, true),
            Err(ConfigError::UnknownBundler { ref name, .. }) if name == "parcel"
        ));
    }
}
