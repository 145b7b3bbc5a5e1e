//! Command-line interface definition for fob-data.
//!
//! # Command Structure
//!
//! - `fob-data compile` - Evaluate loaders and emit their static modules
//! - `fob-data deps` - Print the files a loader depends on
//! - `fob-data watch` - Compile every loader, then recompile on change

mod commands;
mod validation;

use clap::Parser;

pub use commands::{Command, CompileArgs, DepsArgs, ProjectArgs, WatchArgs};
pub use validation::parse_debounce;

/// fob-data - build-time data loaders
#[derive(Parser, Debug)]
#[command(
    name = "fob-data",
    version,
    about = "Evaluate build-time data loaders",
    long_about = "fob-data evaluates `*.data.{js,ts}` loader modules at build time and replaces them\n\
                  with static modules embedding their exports as JSON. It tracks the files each\n\
                  loader reads so watch mode only recompiles what a change affects."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    ///
    /// Outputs plain text without ANSI color codes. `NO_COLOR` is honored too.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
