//! Module claiming and ignore globs.
//!
//! Decides which module ids the plugin owns: absolute paths (query stripped)
//! ending in `.data.{js,cjs,mjs,ts,cts,mts}` that no ignore glob matches.
//! Anything inside a `node_modules` directory is always ignored.

use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

use crate::error::{DataError, Result};

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

fn data_module_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\.data\.(?:c|m)?(?:j|t)s$").expect("static regex"))
}

/// Convert a path to forward-slash form
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Drop a `?query` suffix from a module id
pub fn strip_query(id: &str) -> &str {
    match id.find('?') {
        Some(index) => &id[..index],
        None => id,
    }
}

/// Whether the file name carries the data loader extension
pub fn is_data_module(path: &str) -> bool {
    data_module_regex().is_match(path)
}

fn is_absolute(path: &str) -> bool {
    // Windows drive paths are absolute even when checked on another platform
    let bytes = path.as_bytes();
    path.starts_with('/')
        || Path::new(path).is_absolute()
        || (bytes.len() > 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/')
}

/// Compiled ignore globs, resolved against the project root
#[derive(Debug, Clone)]
pub struct IgnoreFilter {
    patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    /// Compile user patterns. Relative patterns are anchored at `root`.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidIgnorePattern`] for malformed globs.
    pub fn new(root: &Path, patterns: &[String]) -> Result<Self> {
        let root = normalize_path(root);
        let root = root.trim_end_matches('/');

        let patterns = patterns
            .iter()
            .map(|raw| {
                let normalized = raw.replace('\\', "/");
                let absolute = if is_absolute(&normalized) {
                    normalized
                } else {
                    let relative = normalized.trim_start_matches("./");
                    format!("{}/{}", Pattern::escape(root), relative)
                };
                Pattern::new(&absolute).map_err(|source| DataError::InvalidIgnorePattern {
                    pattern: raw.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { patterns })
    }

    /// Whether an absolute path is ignored
    pub fn is_ignored(&self, path: &str) -> bool {
        let path = path.replace('\\', "/");
        if in_node_modules(&path) {
            return true;
        }
        self.patterns
            .iter()
            .any(|pattern| pattern.matches_with(&path, MATCH_OPTIONS))
    }

    /// Decide whether the plugin claims a module id, returning the file path it loads
    pub fn claim<'a>(&self, id: &'a str) -> Option<&'a str> {
        let path = strip_query(id);
        if !is_absolute(&path.replace('\\', "/")) || !is_data_module(path) {
            return None;
        }
        if self.is_ignored(path) {
            return None;
        }
        Some(path)
    }
}

fn in_node_modules(path: &str) -> bool {
    let mut segments = path.split('/').peekable();
    while let Some(segment) = segments.next() {
        if segment == "node_modules" && segments.peek().is_some() {
            return true;
        }
    }
    false
}
