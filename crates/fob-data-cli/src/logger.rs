//! Logging setup for the fob-data CLI.
//!
//! Loader progress (`[fob-data] posts.data.ts`), claim decisions and watch
//! events are `tracing` events emitted under the `fob_data` target by the
//! plugin. This module installs the subscriber that prints them.
//!
//! # Example
//!
//! ```rust,no_run
//! use fob_data_cli::logger::init_logger;
//! use tracing::info;
//!
//! init_logger(false, false, false);
//!
//! info!(target: "fob_data", "[fob-data] posts.data.ts");
//! ```

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "fob_data=debug,fob_plugin_data=debug,fob_data_cli=debug";
const QUIET_FILTER: &str = "fob_data=error,fob_plugin_data=error,fob_data_cli=error";
const DEFAULT_FILTER: &str = "fob_data=info,fob_plugin_data=info,fob_data_cli=info";

/// Initialize the tracing subscriber with the specified options.
///
/// Should be called once at the start of the program, before any logging occurs.
///
/// # Verbosity Levels
///
/// 1. `--verbose` flag: DEBUG for fob-data targets
/// 2. `--quiet` flag: ERROR only
/// 3. `RUST_LOG` environment variable: Custom filter
/// 4. Default: INFO for fob-data targets
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    init_logger_with_filter(filter_for(verbose, quiet), no_color);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color && should_use_colors())
        .compact();

    // Only the first call installs a subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Check if colored log output should be enabled.
///
/// # Environment Variables
///
/// - `NO_COLOR`: If set, disables colors
/// - `FORCE_COLOR`: If set, forces colors even in non-TTY
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    // Logs go to stderr, so that's the stream whose capabilities matter
    console::Term::stderr().features().colors_supported()
}
