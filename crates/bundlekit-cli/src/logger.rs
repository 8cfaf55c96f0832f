//! Logging setup for the CLI.
//!
//! Library crates only emit `tracing` events; this module installs the one
//! subscriber, writing to stderr so stdout stays free for command output
//! such as `bundlekit config`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "bundlekit=debug,bundlekit_config=debug,bundlekit_cli=debug";
const QUIET_FILTER: &str = "error";
const DEFAULT_FILTER: &str = "bundlekit=info,bundlekit_config=info,bundlekit_cli=info";

/// Build the level filter for the global flags.
///
/// `--verbose` wins over `--quiet`; with neither, `RUST_LOG` is honoured and
/// info is the fallback.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && console::colors_enabled_stderr())
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_debug_for_workspace_crates() {
        let filter = filter_for(true, true).to_string();
        assert!(filter.contains("bundlekit=debug"));
        assert!(filter.contains("bundlekit_config=debug"));
    }

    #[test]
    fn quiet_keeps_errors_only() {
        let filter = filter_for(false, true).to_string();
        assert!(filter.contains("error"));
        assert!(!filter.contains("debug"));
    }
}
