//! Deciding which manifest layout the asset server expects.

use std::fmt;

use bundlekit_config::{ConfigKey, ResolvedConfig};

use crate::manifest::ManifestLayout;

/// Reports the manifest layout for a build.
pub trait PipelineDetector: Send + Sync + fmt::Debug {
    fn detect(&self, config: &ResolvedConfig) -> ManifestLayout;
}

/// Always the same layout, e.g. from a command-line flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPipeline(pub ManifestLayout);

impl PipelineDetector for FixedPipeline {
    fn detect(&self, _config: &ResolvedConfig) -> ManifestLayout {
        self.0
    }
}

/// Reads `manifest_layout` from the resolved config; compact when absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfigPipelineDetector;

impl PipelineDetector for ConfigPipelineDetector {
    fn detect(&self, config: &ResolvedConfig) -> ManifestLayout {
        let Some(name) = config.str_value(ConfigKey::ManifestLayout) else {
            return ManifestLayout::default();
        };
        name.parse().unwrap_or_else(|err| {
            tracing::warn!(env = config.env(), "{err}; using compact");
            ManifestLayout::default()
        })
    }
}
