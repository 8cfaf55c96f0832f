//! Environment-layered configuration for bundlekit.
//!
//! A single YAML document (`config/bundlekit.yml`) carries a `default`
//! section, one section per bundler and one per environment. [`ConfigStore`]
//! merges them into a frozen [`ResolvedConfig`] per environment and derives
//! the argument list handed to the bundler subprocess.

pub mod document;
pub mod environment;
pub mod error;
pub mod merge;
pub mod resolved;
pub mod store;
pub mod validation;

// Re-export main types
pub use document::{CONFIG_PATH, DEFAULT_BUNDLER, DocumentSource, RawConfigDocument};
pub use environment::{current_env, is_production_like, strict_mode_from_env};
pub use error::*;
pub use resolved::{ConfigKey, ResolvedConfig};
pub use store::ConfigStore;
pub use validation::{KNOWN_BUNDLERS, is_known_bundler, validate};
