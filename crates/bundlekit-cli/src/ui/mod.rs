//! Terminal output: status lines on stderr and the build summary.

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration_ms, print_build_summary};
pub use messages::{info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Decide whether status lines are colored.
///
/// `--no-color` and `NO_COLOR` disable colors, `FORCE_COLOR` forces them,
/// otherwise stderr's terminal capabilities decide.
pub fn init_colors(no_color: bool) {
    let enabled = !no_color
        && std::env::var_os("NO_COLOR").is_none()
        && (std::env::var_os("FORCE_COLOR").is_some() || console::user_attended_stderr());
    COLORS.store(enabled, Ordering::Relaxed);
}

pub fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}

/// `text` with `style` applied when colors are enabled.
pub(crate) fn paint(text: &str, style: owo_colors::Style) -> String {
    use owo_colors::OwoColorize;

    if colors_enabled() {
        text.style(style).to_string()
    } else {
        text.to_string()
    }
}
