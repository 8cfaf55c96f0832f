use std::path::PathBuf;

use serde_json::{Map, Value, json};

use super::{ManifestEntry, ManifestLayout, ManifestWriter, OutputDir, content_digest};

/// Manifest file name for an output directory, given as configured.
///
/// Embeds a digest of the configured string so several output directories
/// can share a parent. The project root never enters the name.
pub fn legacy_manifest_name(configured_outdir: &str) -> String {
    let digest = content_digest(configured_outdir.as_bytes());
    format!(".sprockets-manifest-{digest}.json")
}

/// `files` keyed by `<digest>-<basename>` with size and mtime, plus an
/// `assets` table for the conventional `application.js`/`application.css`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LegacyManifest;

impl ManifestWriter for LegacyManifest {
    fn layout(&self) -> ManifestLayout {
        ManifestLayout::Legacy
    }

    fn manifest_path(&self, outdir: &OutputDir) -> PathBuf {
        outdir.path().join(legacy_manifest_name(outdir.configured()))
    }

    fn render(&self, entries: &[ManifestEntry]) -> Value {
        let mut files = Map::new();
        let mut assets = Map::new();

        for entry in entries {
            let digested = format!("{}-{}", entry.digest, entry.file_name());
            let logical_path = match conventional_name(&entry.relative_path) {
                Some(name) => {
                    assets.insert(name.to_string(), Value::String(digested.clone()));
                    name.to_string()
                }
                None => entry.logical_path.clone(),
            };
            files.insert(
                digested,
                json!({
                    "logical_path": logical_path,
                    "pathname": entry.relative_path,
                    "digest": entry.digest,
                    "size": entry.size,
                    "mtime": entry.modified,
                }),
            );
        }

        json!({ "files": files, "assets": assets })
    }
}

fn conventional_name(relative_path: &str) -> Option<&'static str> {
    if !relative_path.contains("application") {
        return None;
    }
    if relative_path.ends_with(".js") {
        Some("application.js")
    } else if relative_path.ends_with(".css") {
        Some("application.css")
    } else {
        None
    }
}
