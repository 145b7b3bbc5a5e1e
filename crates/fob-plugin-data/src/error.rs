//! Error types for data loader evaluation and compilation

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T, E = DataError> = std::result::Result<T, E>;

/// Errors that can occur while claiming, evaluating or compiling a data loader
#[derive(Error, Debug, Diagnostic)]
pub enum DataError {
    /// An exported value cannot be represented as embedded JSON
    #[error("exported value `{export}` could not be safely serialized: found {found}{}", location(.path))]
    #[diagnostic(
        code(fob::data::serialization),
        help("Export plain data (objects, arrays, strings, numbers, booleans, null) or add a `toJSON()` method")
    )]
    Serialization {
        export: String,
        found: String,
        path: String,
    },

    /// The loader (or a module it imports) failed to parse
    #[error("failed to compile {}: {message}", .file.display())]
    #[diagnostic(code(fob::data::compile))]
    Compilation { file: PathBuf, message: String },

    /// The loader (or a module it imports) threw while running
    #[error("failed to evaluate {}: {message}", .file.display())]
    #[diagnostic(code(fob::data::evaluate))]
    Evaluation { file: PathBuf, message: String },

    /// An import specifier could not be resolved to a file
    #[error("cannot resolve `{specifier}` imported from {}", .importer.display())]
    #[diagnostic(
        code(fob::data::resolve),
        help("Data loaders may import relative files, aliased paths, JSON files and the `fs`, `path`, `url`, `process` and `module` built-ins")
    )]
    Resolve {
        specifier: String,
        importer: PathBuf,
    },

    /// Reading a loader or one of its dependencies failed
    #[error("failed to read {}: {source}", .path.display())]
    #[diagnostic(code(fob::data::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user-supplied ignore glob is malformed
    #[error("invalid ignore pattern `{pattern}`: {source}")]
    #[diagnostic(
        code(fob::data::ignore_pattern),
        help("Ignore patterns use glob syntax, e.g. `fixtures/**` or `**/*.draft.data.ts`")
    )]
    InvalidIgnorePattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The merged build configuration has an unexpected shape
    #[error("invalid build configuration: {0}")]
    #[diagnostic(code(fob::data::config))]
    Config(String),
}

fn location(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at `{path}`")
    }
}

impl DataError {
    pub fn serialization(export: impl Into<String>, found: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Serialization {
            export: export.into(),
            found: found.into(),
            path: path.into(),
        }
    }

    pub fn compilation(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Compilation {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn evaluation(file: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Evaluation {
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn resolve(specifier: impl Into<String>, importer: impl Into<PathBuf>) -> Self {
        Self::Resolve {
            specifier: specifier.into(),
            importer: importer.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error came from the serialization contract rather than execution
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}
