//! Loader discovery and file watching for `fob-data watch`.

mod discovery;
mod watcher;

pub use discovery::discover_loaders;
pub use watcher::{FileChange, FileWatcher};

/// Directory names never descended into or reported
pub const SKIPPED_DIRS: &[&str] = &["node_modules", "target"];

/// Hidden entries and dependency folders under `root`.
pub(crate) fn is_skipped_component(name: &str) -> bool {
    (name.starts_with('.') && name != "." && name != "..") || SKIPPED_DIRS.contains(&name)
}
