use bundlekit::BuildResult;
use owo_colors::Style;

use super::paint;

/// Format a millisecond duration as `ms`, seconds or `m s`.
///
/// ```
/// use bundlekit_cli::ui::format_duration_ms;
///
/// assert_eq!(format_duration_ms(50.25), "50.25ms");
/// assert_eq!(format_duration_ms(1500.0), "1.50s");
/// assert_eq!(format_duration_ms(90_000.0), "1m 30s");
/// ```
pub fn format_duration_ms(ms: f64) -> String {
    if ms < 1000.0 {
        format!("{ms:.2}ms")
    } else if ms < 60_000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        let secs = (ms / 1000.0) as u64;
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Print the outcome of a build to stderr.
pub fn print_build_summary(bundler: &str, result: &BuildResult) {
    let dimmed = Style::new().dimmed();
    eprintln!(
        "{} {} {} {}",
        paint("✓", Style::new().green().bold()),
        paint(&format!("Built with {bundler}"), Style::new().bold()),
        paint(&format!("({})", result.config.env()), dimmed),
        paint(
            &format!("in {}", format_duration_ms(result.duration_ms)),
            Style::new().green()
        )
    );
    eprintln!("  {} {}", paint("size", dimmed), result.size);
    if let Some(manifest) = &result.manifest {
        eprintln!("  {} {}", paint("manifest", dimmed), manifest.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_durations_keep_decimals() {
        assert_eq!(format_duration_ms(0.0), "0.00ms");
        assert_eq!(format_duration_ms(999.994), "999.99ms");
    }

    #[test]
    fn long_durations_use_minutes() {
        assert_eq!(format_duration_ms(61_000.0), "1m 1s");
        assert_eq!(format_duration_ms(125_500.0), "2m 5s");
    }
}
