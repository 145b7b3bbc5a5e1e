//! Error handling for the fob-data CLI.
//!
//! # Architecture
//!
//! - **Top-level errors** (`CliError`) represent broad categories of failures
//! - **Loader errors** are [`fob_plugin_data::DataError`]s, kept intact so
//!   their miette diagnostics reach the terminal
//! - **Configuration errors** (`ConfigError`) carry the file they came from
//! - **Context helpers** ([`ResultExt`]) attach paths and hints

use fob_plugin_data::DataError;
use std::path::PathBuf;
use thiserror::Error;

mod diagnostics;

pub use diagnostics::{cli_error_to_miette, config_error_to_miette};

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Evaluation, serialization or compile failure of a loader
    #[error(transparent)]
    Data(#[from] DataError),

    /// Configuration-related errors (invalid file, bad values)
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A file passed on the command line is not a loader the plugin claims
    #[error("Not a data loader: {}\n\nHint: Loaders are named `*.data.{{js,mjs,cjs,ts,mts,cts}}` and must not match an ignore pattern", .0.display())]
    NotALoader(PathBuf),

    /// Two loaders would be written to the same output file
    #[error("Loaders compile to the same file {}: {} and {}\n\nHint: Rename one of the loaders", .output.display(), .first.display(), .second.display())]
    OutputCollision {
        output: PathBuf,
        first: PathBuf,
        second: PathBuf,
    },

    /// Some loaders of a batch failed; each failure was already reported
    #[error("{failed} of {total} loaders failed")]
    Failed { failed: usize, total: usize },

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File watching errors
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with custom messages
    #[error("{0}")]
    Custom(String),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file passed with `--config` doesn't exist
    #[error("Config file not found: {}\n\nHint: Create fob-data.toml or drop the --config flag", .0.display())]
    NotFound(PathBuf),

    /// Config file has an unsupported extension
    #[error("Unsupported config format: {}\n\nHint: Use a .toml or .json file", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Sources could not be merged or extracted
    #[error("{source}")]
    Invalid {
        /// File the failing value came from, when known
        path: Option<PathBuf>,
        #[source]
        source: Box<figment::Error>,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;

/// Extension trait for adding context to `Result` types.
pub trait ResultExt<T> {
    /// Turn a not-found I/O error into [`CliError::FileNotFound`] for `path`.
    ///
    /// ```rust,no_run
    /// # use std::path::Path;
    /// # use fob_data_cli::error::{Result, ResultExt};
    /// # fn run() -> Result<()> {
    /// let path = Path::new("posts.data.ts");
    /// std::fs::read_to_string(path).with_path(path)?;
    /// # Ok(())
    /// # }
    /// ```
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T>;

    /// Append a hint to the error message.
    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T>;

    /// Prefix the error message.
    fn context(self, msg: impl std::fmt::Display) -> Result<T>;
}

impl<T, E: Into<CliError>> ResultExt<T> for std::result::Result<T, E> {
    fn with_path(self, path: impl AsRef<std::path::Path>) -> Result<T> {
        self.map_err(|e| match e.into() {
            CliError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                CliError::FileNotFound(path.as_ref().to_path_buf())
            }
            other => other,
        })
    }

    fn with_hint(self, hint: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}\n\nHint: {}", err, hint))
        })
    }

    fn context(self, msg: impl std::fmt::Display) -> Result<T> {
        self.map_err(|e| {
            let err: CliError = e.into();
            CliError::Custom(format!("{}: {}", msg, err))
        })
    }
}
