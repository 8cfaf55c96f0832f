//! Output size accounting.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use flate2::Compression;
use flate2::write::GzEncoder;
use walkdir::WalkDir;

/// Extensions counted towards the bundle size.
pub const SIZE_EXTENSIONS: [&str; 3] = ["js", "css", "map"];
/// Extensions compressed for the gzip estimate.
pub const GZIP_EXTENSIONS: [&str; 2] = ["js", "css"];

/// Total size of a build's output, or `Unknown` when it could not be
/// measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BundleSize {
    Known { bytes: u64, gzip_bytes: Option<u64> },
    Unknown,
}

impl BundleSize {
    pub fn bytes(&self) -> Option<u64> {
        match self {
            BundleSize::Known { bytes, .. } => Some(*bytes),
            BundleSize::Unknown => None,
        }
    }

    pub fn gzip_bytes(&self) -> Option<u64> {
        match self {
            BundleSize::Known { gzip_bytes, .. } => *gzip_bytes,
            BundleSize::Unknown => None,
        }
    }
}

impl fmt::Display for BundleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BundleSize::Unknown => f.write_str("unknown"),
            BundleSize::Known {
                bytes,
                gzip_bytes: None,
            } => f.write_str(&format_size(*bytes)),
            BundleSize::Known {
                bytes,
                gzip_bytes: Some(gzip),
            } => write!(f, "{} (gzip: {})", format_size(*bytes), format_size(*gzip)),
        }
    }
}

/// Format bytes in human-readable form: B, KB, MB or GB with two decimals.
///
/// Each step divides by 1024.
///
/// # Examples
///
/// ```
/// use bundlekit::format_size;
///
/// assert_eq!(format_size(512), "512 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// assert_eq!(format_size(3 * 1024 * 1024), "3.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Measure `outdir`, degrading to [`BundleSize::Unknown`] on any error.
pub fn measure_bundle(outdir: &Path, analyze: bool) -> BundleSize {
    match try_measure_bundle(outdir, analyze) {
        Ok(size) => size,
        Err(err) => {
            tracing::debug!(outdir = %outdir.display(), "bundle size unavailable: {err}");
            BundleSize::Unknown
        }
    }
}

/// Sum the `.js`, `.css` and `.map` files under `outdir`; with `analyze`,
/// also sum the gzip size of each `.js`/`.css` file.
pub fn try_measure_bundle(outdir: &Path, analyze: bool) -> io::Result<BundleSize> {
    if !outdir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} is not a directory", outdir.display()),
        ));
    }

    let mut bytes = 0;
    let mut gzip_bytes = analyze.then_some(0);

    for entry in WalkDir::new(outdir) {
        let entry = entry.map_err(io::Error::other)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(ext) = entry.path().extension().and_then(|e| e.to_str()) else {
            continue;
        };
        if !SIZE_EXTENSIONS.contains(&ext) {
            continue;
        }

        bytes += entry.metadata().map_err(io::Error::other)?.len();
        if let Some(total) = gzip_bytes.as_mut() {
            if GZIP_EXTENSIONS.contains(&ext) {
                *total += gzip_len(&fs::read(entry.path())?)?;
            }
        }
    }

    Ok(BundleSize::Known { bytes, gzip_bytes })
}

fn gzip_len(content: &[u8]) -> io::Result<u64> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(content)?;
    Ok(encoder.finish()?.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_size(3 * 1024 * 1024 * 1024), "3.00 GB");
    }

    #[test]
    fn only_build_files_are_counted() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("empty.txt"), "").unwrap();
        assert_eq!(measure_bundle(dir.path(), false).to_string(), "0 B");

        fs::write(dir.path().join("notes.txt"), "x".repeat(4096)).unwrap();
        fs::write(dir.path().join("app.js"), "x".repeat(1024)).unwrap();
        fs::write(dir.path().join("app.js.map"), "x".repeat(1024)).unwrap();
        let size = measure_bundle(dir.path(), false);
        assert_eq!(size.bytes(), Some(2048));
        assert_eq!(size.to_string(), "2.00 KB");
    }

    #[test]
    fn missing_outdir_is_unknown() {
        let dir = TempDir::new().unwrap();
        let size = measure_bundle(&dir.path().join("builds"), true);
        assert_eq!(size, BundleSize::Unknown);
        assert_eq!(size.to_string(), "unknown");
    }

    #[test]
    fn analysis_adds_gzip_estimate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1);\n".repeat(500)).unwrap();
        fs::write(dir.path().join("app.js.map"), "{}".repeat(500)).unwrap();

        let size = measure_bundle(dir.path(), true);
        let gzip = size.gzip_bytes().unwrap();
        assert!(gzip > 0 && gzip < 8000);
        assert!(size.to_string().contains("(gzip: "));

        assert_eq!(measure_bundle(dir.path(), false).gzip_bytes(), None);
    }
}
