//! Command-line host for fob data loaders.
//!
//! Drives [`fob_plugin_data::FobDataPlugin`] without a bundler: loaders are
//! compiled to static modules on disk, their dependency sets can be
//! inspected, and a watch mode recompiles exactly the loaders a file change
//! affects.
//!
//! # Architecture
//!
//! - [`cli`] - argument definitions (clap derive)
//! - [`config`] - layered configuration (`fob-data.toml`, `package.json`, env, flags)
//! - [`commands`] - `compile`, `deps` and `watch`
//! - [`watch`] - file discovery and the debounced file watcher
//! - [`error`] - error types and miette conversion
//! - [`logger`] / [`ui`] - tracing setup and terminal output
//!
//! # Example
//!
//! ```rust,no_run
//! use fob_data_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     // Command implementations...
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;

pub use error::{CliError, ConfigError, Result, ResultExt};
