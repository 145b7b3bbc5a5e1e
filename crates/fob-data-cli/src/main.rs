//! fob-data CLI - evaluate data loaders outside a bundler.
//!
//! Parses arguments, initializes logging and dispatches to the command.

use clap::Parser;
use fob_data_cli::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Compile(compile_args) => commands::compile_execute(compile_args, args.quiet).await,
        cli::Command::Deps(deps_args) => commands::deps_execute(deps_args, args.quiet).await,
        cli::Command::Watch(watch_args) => commands::watch_execute(watch_args, args.quiet).await,
    };

    // CLI errors become miette diagnostics; loader errors keep their codes and help
    result.map_err(error::cli_error_to_miette)
}
