//! Debounced file watcher feeding `fob-data watch`.
//!
//! Watches the project root recursively. Hidden entries, dependency folders
//! and the output directory are filtered out before events reach the
//! channel, so writing compiled modules never triggers another round.

use crate::error::{CliError, Result};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

use super::is_skipped_component;

const CHANNEL_CAPACITY: usize = 256;

/// File change event type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileChange {
    Modified(PathBuf),
    Created(PathBuf),
    Removed(PathBuf),
}

impl FileChange {
    /// Get the path affected by this change.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Modified(p) | FileChange::Created(p) | FileChange::Removed(p) => p,
        }
    }

    fn from_event(kind: &EventKind, path: PathBuf) -> Option<Self> {
        match kind {
            EventKind::Create(_) => Some(FileChange::Created(path)),
            EventKind::Modify(_) => Some(FileChange::Modified(path)),
            EventKind::Remove(_) => Some(FileChange::Removed(path)),
            _ => None,
        }
    }
}

/// Per-path debounce: a path fires at most once per window.
#[derive(Debug)]
struct Debouncer {
    window: Duration,
    last_seen: HashMap<PathBuf, Instant>,
}

impl Debouncer {
    fn new(window: Duration) -> Self {
        Self {
            window,
            last_seen: HashMap::new(),
        }
    }

    fn admit(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.last_seen.get(path) {
            if now.duration_since(*last) < self.window {
                return false;
            }
        }
        self.last_seen.insert(path.to_path_buf(), now);
        true
    }
}

/// Recursive watcher over the project root.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root`. Paths under any of `skip` are never reported.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::FileNotFound`] when `root` is missing and
    /// [`CliError::Watch`] when the platform watcher can't be started.
    pub fn new(
        root: PathBuf,
        skip: Vec<PathBuf>,
        debounce_ms: u64,
    ) -> Result<(Self, mpsc::Receiver<FileChange>)> {
        if !root.is_dir() {
            return Err(CliError::FileNotFound(root));
        }

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let mut debouncer = Debouncer::new(Duration::from_millis(debounce_ms));
        let watched_root = root.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| {
            let event = match res {
                Ok(event) => event,
                Err(err) => {
                    tracing::warn!(target: "fob_data", "watch error: {err}");
                    return;
                }
            };

            for path in event.paths {
                if Self::should_ignore(&path, &watched_root, &skip) {
                    continue;
                }
                if !debouncer.admit(&path, Instant::now()) {
                    continue;
                }
                let Some(change) = FileChange::from_event(&event.kind, path) else {
                    continue;
                };
                // The receiver is gone once the watch loop exits
                if tx.blocking_send(change).is_err() {
                    return;
                }
            }
        })?;

        watcher.watch(&root, RecursiveMode::Recursive)?;

        Ok((
            Self {
                _watcher: watcher,
                root,
            },
            rx,
        ))
    }

    fn should_ignore(path: &Path, root: &Path, skip: &[PathBuf]) -> bool {
        let Ok(relative) = path.strip_prefix(root) else {
            return true;
        };

        if skip.iter().any(|dir| path.starts_with(dir)) {
            return true;
        }

        relative
            .components()
            .filter_map(|component| component.as_os_str().to_str())
            .any(is_skipped_component)
    }

    /// Get the root directory being watched.
    pub fn root(&self) -> &Path {
        &self.root
    }
}
