//! Import resolution for loader evaluation.
//!
//! Resolution order: built-in modules, alias prefixes (longest first),
//! relative or absolute paths, then extension and index file probing.

use path_clean::PathClean;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::error::{DataError, Result};

use super::host::BUILTIN_MODULES;

/// Outcome of resolving an import specifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// Canonical name of a Node built-in (`fs`, `path`, ...)
    Builtin(&'static str),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub(crate) struct Resolver {
    root: PathBuf,
    /// `(find, replacement)` sorted so longer prefixes win
    aliases: Vec<(String, String)>,
    extensions: Vec<String>,
}

impl Resolver {
    pub fn new(config: &BuildConfig) -> Self {
        let mut aliases: Vec<(String, String)> = config
            .resolve
            .alias
            .iter()
            .map(|(find, replacement)| (find.clone(), replacement.clone()))
            .collect();
        aliases.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            root: config.root.clone(),
            aliases,
            extensions: config.resolve.extensions.clone(),
        }
    }

    pub fn resolve(&self, specifier: &str, importer: &Path) -> Result<Resolved> {
        if let Some(builtin) = builtin_module(specifier) {
            return Ok(Resolved::Builtin(builtin));
        }

        let candidate = if let Some(aliased) = self.apply_alias(specifier) {
            if Path::new(&aliased).is_absolute() {
                PathBuf::from(aliased)
            } else {
                self.root.join(aliased)
            }
        } else if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".." {
            importer
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(specifier)
        } else if Path::new(specifier).is_absolute() {
            PathBuf::from(specifier)
        } else if let Some(path) = specifier.strip_prefix("file://") {
            PathBuf::from(path)
        } else {
            // Bare package specifiers are not evaluated
            return Err(DataError::resolve(specifier, importer));
        };

        self.probe(&candidate.clean())
            .map(Resolved::File)
            .ok_or_else(|| DataError::resolve(specifier, importer))
    }

    fn apply_alias(&self, specifier: &str) -> Option<String> {
        self.aliases.iter().find_map(|(find, replacement)| {
            if specifier == find {
                Some(replacement.clone())
            } else {
                let rest = specifier.strip_prefix(find.as_str())?;
                if rest.starts_with('/') || find.ends_with('/') {
                    Some(format!("{replacement}{rest}"))
                } else {
                    None
                }
            }
        })
    }

    fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(candidate.to_path_buf());
        }

        // `./util.js` written against a `util.ts` source
        if let Some(ext) = candidate.extension().and_then(|ext| ext.to_str()) {
            let swapped = match ext {
                "js" => Some("ts"),
                "mjs" => Some("mts"),
                "cjs" => Some("cts"),
                _ => None,
            };
            if let Some(swapped) = swapped {
                let alternative = candidate.with_extension(swapped);
                if alternative.is_file() {
                    return Some(alternative);
                }
            }
        }

        if let Some(found) = self.try_extensions(candidate) {
            return Some(found);
        }

        if candidate.is_dir() {
            return self.try_extensions(&candidate.join("index"));
        }

        None
    }

    fn try_extensions(&self, candidate: &Path) -> Option<PathBuf> {
        self.extensions.iter().find_map(|ext| {
            let mut with_ext = candidate.as_os_str().to_owned();
            with_ext.push(".");
            with_ext.push(ext.trim_start_matches('.'));
            let path = PathBuf::from(with_ext);
            path.is_file().then_some(path)
        })
    }
}

fn builtin_module(specifier: &str) -> Option<&'static str> {
    let name = specifier.strip_prefix("node:").unwrap_or(specifier);
    BUILTIN_MODULES
        .iter()
        .map(|(builtin, _)| *builtin)
        .find(|builtin| *builtin == name)
}
