//! Miette diagnostic conversion for CLI errors.

use crate::error::{CliError, ConfigError};
use miette::Report;

/// Convert CliError to miette Report
///
/// Loader errors already implement [`miette::Diagnostic`]; they are reported
/// as-is so their codes and help text survive.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Data(e) => Report::new(e),
        CliError::Config(e) => config_error_to_miette(e),
        CliError::Failed { failed, total } => {
            miette::miette!("{} of {} loaders failed to compile", failed, total)
        }
        _ => miette::miette!("{}", err),
    }
}

/// Convert ConfigError to miette Report
pub fn config_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::Invalid { path, source } => {
            let origin = path
                .map(|p| format!(" in {}", p.display()))
                .unwrap_or_default();
            miette::miette!(
                help = "Check field names and types; see `fob-data --help` for the supported keys",
                "Invalid configuration{}: {}",
                origin,
                source
            )
        }
        other => miette::miette!("Configuration error: {}", other),
    }
}
