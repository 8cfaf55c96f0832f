//! One-line status messages on stderr.

use owo_colors::Style;

use super::paint;

/// Print a success message to stderr.
///
/// # Arguments
///
/// * `message` - Message to display
///
/// # Examples
///
/// ```no_run
/// use bundlekit_cli::ui::success;
///
/// success("Dependencies installed");
/// ```
pub fn success(message: &str) {
    eprintln!("{} {}", paint("✓", Style::new().green().bold()), message);
}

/// Print an info message to stderr.
///
/// # Examples
///
/// ```no_run
/// use bundlekit_cli::ui::info;
///
/// info("Watching (development); press Ctrl-C to stop");
/// ```
pub fn info(message: &str) {
    eprintln!("{} {}", paint("ℹ", Style::new().blue().bold()), message);
}

/// Print a warning to stderr, message included in yellow.
///
/// # Arguments
///
/// * `message` - Message to display
pub fn warning(message: &str) {
    let style = Style::new().yellow();
    eprintln!("{} {}", paint("⚠", style.bold()), paint(message, style));
}
