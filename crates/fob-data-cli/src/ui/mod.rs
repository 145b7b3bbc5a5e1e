//! Terminal output for the fob-data CLI.
//!
//! Status lines go to stderr so compiled modules printed on stdout can be
//! piped. Colors follow `--no-color`, `NO_COLOR`, `FORCE_COLOR` and whether
//! stderr is attended.
//!
//! ```no_run
//! use fob_data_cli::ui;
//!
//! ui::init_colors(false);
//! ui::success("posts.data.ts → dist/posts.js");
//! ui::error("site.data.ts: exported value `site` could not be safely serialized");
//! ```

mod format;
mod messages;

use std::sync::atomic::{AtomicBool, Ordering};

pub use format::{format_duration, format_size};
pub use messages::{compiled, error, info, success, warning};

static COLORS: AtomicBool = AtomicBool::new(false);

/// Check if color output should be enabled.
///
/// Respects NO_COLOR and FORCE_COLOR environment variables, falls back to
/// terminal capability detection.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }

    console::user_attended_stderr()
}

/// Decide once whether status lines are colored.
pub fn init_colors(no_color: bool) {
    COLORS.store(!no_color && should_use_color(), Ordering::Relaxed);
}

pub(crate) fn colors_enabled() -> bool {
    COLORS.load(Ordering::Relaxed)
}
