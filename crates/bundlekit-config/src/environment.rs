//! Process-environment inputs: the active environment name and strict mode.

/// Selects the active environment (`development`, `production`, ...).
pub const ENV_VAR: &str = "BUNDLEKIT_ENV";

/// When set, unknown bundler names fail validation instead of warning.
pub const STRICT_VAR: &str = "BUNDLEKIT_STRICT";

pub const DEFAULT_ENV: &str = "development";

/// Environments that must carry a complete `outdir` and `bundler`.
const PRODUCTION_LIKE: &[&str] = &["production", "staging"];

/// Current environment name from `BUNDLEKIT_ENV`, falling back to `development`.
pub fn current_env() -> String {
    std::env::var(ENV_VAR)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ENV.to_string())
}

/// Whether `BUNDLEKIT_STRICT` is present in the process environment.
pub fn strict_mode_from_env() -> bool {
    std::env::var_os(STRICT_VAR).is_some()
}

pub fn is_production_like(env: &str) -> bool {
    PRODUCTION_LIKE.contains(&env)
}
