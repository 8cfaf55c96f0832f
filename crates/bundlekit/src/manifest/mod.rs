//! Manifest files that let the asset server find built output.
//!
//! Both layouts index the `.js` and `.css` files under the output directory
//! (source maps are never listed) and rewrite their manifest from scratch on
//! every build.

mod compact;
mod legacy;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;
use walkdir::WalkDir;

pub use compact::{COMPACT_MANIFEST_NAME, CompactManifest};
pub use legacy::{LegacyManifest, legacy_manifest_name};

/// Extensions indexed by the manifest.
pub const MANIFEST_EXTENSIONS: [&str; 2] = ["js", "css"];

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("output directory {} does not exist", .0.display())]
    MissingOutdir(PathBuf),

    #[error("failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// The two manifest conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestLayout {
    /// One entry per file keyed by relative path, in `.manifest.json`.
    #[default]
    Compact,
    /// `files` plus `assets` tables with size and mtime, in a file named
    /// after the output directory.
    Legacy,
}

impl ManifestLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            ManifestLayout::Compact => "compact",
            ManifestLayout::Legacy => "legacy",
        }
    }

    pub fn writer(self) -> Box<dyn ManifestWriter> {
        match self {
            ManifestLayout::Compact => Box::new(CompactManifest),
            ManifestLayout::Legacy => Box::new(LegacyManifest),
        }
    }
}

impl fmt::Display for ManifestLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManifestLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "compact" => Ok(ManifestLayout::Compact),
            "legacy" => Ok(ManifestLayout::Legacy),
            other => Err(format!(
                "unknown manifest layout '{other}' (expected 'compact' or 'legacy')"
            )),
        }
    }
}

/// An output directory, both as written in the config and as found on disk.
///
/// The configured string names the legacy manifest, so the same project
/// writes the same manifest file whichever root it is run from.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use bundlekit::manifest::OutputDir;
///
/// let outdir = OutputDir::new(Path::new("/srv/app"), "public/builds");
/// assert_eq!(outdir.path(), Path::new("/srv/app/public/builds"));
/// assert_eq!(outdir.configured(), "public/builds");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDir {
    path: PathBuf,
    configured: String,
}

impl OutputDir {
    /// `configured` resolved against the project `root`.
    pub fn new(root: &Path, configured: &str) -> Self {
        Self {
            path: root.join(configured),
            configured: configured.to_string(),
        }
    }

    /// A directory used as-is; its own path doubles as the configured name.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let configured = path.to_string_lossy().into_owned();
        Self { path, configured }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn configured(&self) -> &str {
        &self.configured
    }
}

/// One built file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub logical_path: String,
    /// Path relative to the output directory, `/`-separated.
    pub relative_path: String,
    /// Hex SHA-256 of the file content.
    pub digest: String,
    pub size: u64,
    /// RFC 3339 modification time.
    pub modified: String,
}

impl ManifestEntry {
    pub fn file_name(&self) -> &str {
        self.relative_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.relative_path)
    }
}

pub trait ManifestWriter: fmt::Debug + Send + Sync {
    fn layout(&self) -> ManifestLayout;

    /// Where the manifest for `outdir` is written.
    fn manifest_path(&self, outdir: &OutputDir) -> PathBuf;

    fn render(&self, entries: &[ManifestEntry]) -> Value;

    /// Scan `outdir`, render and write the manifest, replacing any previous
    /// one. Returns the path written.
    fn generate(&self, outdir: &OutputDir) -> Result<PathBuf, ManifestError> {
        let entries = collect_entries(outdir.path())?;
        let path = self.manifest_path(outdir);
        let json = serde_json::to_string_pretty(&self.render(&entries))?;
        fs::write(&path, json).map_err(|source| ManifestError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(
            layout = %self.layout(),
            entries = entries.len(),
            "generated manifest {}",
            path.display()
        );
        Ok(path)
    }
}

/// Hex SHA-256 of `data`.
pub fn content_digest(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

pub fn is_manifest_asset(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext))
}

/// Every `.js`/`.css` file under `outdir`, sorted by relative path.
pub fn collect_entries(outdir: &Path) -> Result<Vec<ManifestEntry>, ManifestError> {
    if !outdir.is_dir() {
        return Err(ManifestError::MissingOutdir(outdir.to_path_buf()));
    }

    let mut entries = Vec::new();
    for entry in WalkDir::new(outdir).sort_by_file_name() {
        let entry = entry.map_err(|source| ManifestError::Scan {
            path: outdir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || !is_manifest_asset(path) {
            continue;
        }

        let io_err = |source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = fs::read(path).map_err(io_err)?;
        let metadata = entry.metadata().map_err(|source| ManifestError::Scan {
            path: path.to_path_buf(),
            source,
        })?;
        let modified: DateTime<Utc> = metadata.modified().map_err(io_err)?.into();

        let relative_path = relative_slash_path(outdir, path);
        entries.push(ManifestEntry {
            logical_path: relative_path.clone(),
            relative_path,
            digest: content_digest(&content),
            size: metadata.len(),
            modified: modified.to_rfc3339(),
        });
    }
    Ok(entries)
}

fn relative_slash_path(base: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn layout_parses() {
        assert_eq!("compact".parse::<ManifestLayout>().unwrap(), ManifestLayout::Compact);
        assert_eq!("legacy".parse::<ManifestLayout>().unwrap(), ManifestLayout::Legacy);
        assert!("propshaft".parse::<ManifestLayout>().is_err());
        assert_eq!(ManifestLayout::default(), ManifestLayout::Compact);
    }

    #[test]
    fn output_dir_at_uses_its_path_as_name() {
        let outdir = OutputDir::at("/tmp/builds");
        assert_eq!(outdir.configured(), "/tmp/builds");
        assert_eq!(outdir.path(), Path::new("/tmp/builds"));
    }

    #[test]
    fn digest_is_hex_sha256() {
        assert_eq!(
            content_digest(b"X"),
            "4b68ab3847feda7d6c62c1fbcbeebfa35eab7351ed5e78f4ddadea5df64b8015"
        );
    }

    #[test]
    fn collects_nested_assets_but_not_maps() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("chunks")).unwrap();
        fs::write(dir.path().join("application.js"), "X").unwrap();
        fs::write(dir.path().join("application.js.map"), "{}").unwrap();
        fs::write(dir.path().join("chunks/vendor.css"), "body{}").unwrap();
        fs::write(dir.path().join("README.txt"), "notes").unwrap();

        let entries = collect_entries(dir.path()).unwrap();
        let paths: Vec<_> = entries.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(paths, ["application.js", "chunks/vendor.css"]);
        assert_eq!(entries[1].file_name(), "vendor.css");
        assert_eq!(entries[0].size, 1);
    }

    #[test]
    fn missing_outdir_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = collect_entries(&dir.path().join("builds")).unwrap_err();
        assert!(matches!(err, ManifestError::MissingOutdir(_)));
    }
}
