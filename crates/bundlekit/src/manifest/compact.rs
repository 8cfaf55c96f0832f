use std::path::PathBuf;

use serde_json::{Map, Value, json};

use super::{ManifestEntry, ManifestLayout, ManifestWriter, OutputDir};

pub const COMPACT_MANIFEST_NAME: &str = ".manifest.json";

/// `{ "<relative path>": { logical_path, pathname, digest } }`
#[derive(Debug, Default, Clone, Copy)]
pub struct CompactManifest;

impl ManifestWriter for CompactManifest {
    fn layout(&self) -> ManifestLayout {
        ManifestLayout::Compact
    }

    fn manifest_path(&self, outdir: &OutputDir) -> PathBuf {
        outdir.path().join(COMPACT_MANIFEST_NAME)
    }

    fn render(&self, entries: &[ManifestEntry]) -> Value {
        let manifest: Map<String, Value> = entries
            .iter()
            .map(|entry| {
                (
                    entry.relative_path.clone(),
                    json!({
                        "logical_path": entry.logical_path,
                        "pathname": entry.relative_path,
                        "digest": entry.digest,
                    }),
                )
            })
            .collect();
        Value::Object(manifest)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;
    use crate::manifest::content_digest;
    use tempfile::TempDir;

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn entries_keyed_by_relative_path() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("application.js"), "X").unwrap();
        fs::write(dir.path().join("application.css"), "body{}").unwrap();
        fs::write(dir.path().join("application.js.map"), "{}").unwrap();

        let path = CompactManifest.generate(&OutputDir::at(dir.path())).unwrap();
        assert_eq!(path, dir.path().join(".manifest.json"));

        let manifest = read(&path);
        let entry = &manifest["application.js"];
        assert_eq!(entry["digest"], content_digest(b"X"));
        assert_eq!(entry["pathname"], "application.js");
        assert!(manifest.get("application.css").is_some());
        assert!(manifest.get("application.js.map").is_none());
        assert_eq!(manifest.as_object().unwrap().len(), 2);
    }

    #[test]
    fn empty_outdir_gives_empty_manifest() {
        let dir = TempDir::new().unwrap();
        let path = CompactManifest.generate(&OutputDir::at(dir.path())).unwrap();
        assert_eq!(read(&path), json!({}));
    }

    #[test]
    fn previous_manifest_is_overwritten() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(COMPACT_MANIFEST_NAME), r#"{"stale.js": {}}"#).unwrap();
        fs::write(dir.path().join("app.js"), "fresh").unwrap();

        let manifest = read(&CompactManifest.generate(&OutputDir::at(dir.path())).unwrap());
        assert!(manifest.get("stale.js").is_none());
        assert!(manifest.get("app.js").is_some());
    }
}
