//! Status message functions for terminal output.

use owo_colors::OwoColorize;
use std::time::Duration;

use super::{colors_enabled, format_duration, format_size};

/// Print a success message to stderr.
pub fn success(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✓".green().bold(), message);
    } else {
        eprintln!("✓ {}", message);
    }
}

/// Print an info message to stderr.
pub fn info(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "ℹ".blue().bold(), message);
    } else {
        eprintln!("ℹ {}", message);
    }
}

/// Print a warning message to stderr.
///
/// ```no_run
/// use fob_data_cli::ui::warning;
///
/// warning("posts.data.ts failed to recompile; keeping previous output");
/// ```
pub fn warning(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
    } else {
        eprintln!("⚠ {}", message);
    }
}

/// Print an error message to stderr.
pub fn error(message: &str) {
    if colors_enabled() {
        eprintln!("{} {}", "✗".red().bold(), message.red());
    } else {
        eprintln!("✗ {}", message);
    }
}

/// Report one compiled loader: its name, where it went, size and time.
pub fn compiled(loader: &str, output: Option<&str>, bytes: u64, elapsed: Duration) {
    let target = output.map(|out| format!(" → {out}")).unwrap_or_default();
    let stats = format!("({}, {})", format_size(bytes), format_duration(elapsed));

    if colors_enabled() {
        eprintln!(
            "{} {}{} {}",
            "✓".green().bold(),
            loader.bright_white().bold(),
            target,
            stats.dimmed()
        );
    } else {
        eprintln!("✓ {}{} {}", loader, target, stats);
    }
}
