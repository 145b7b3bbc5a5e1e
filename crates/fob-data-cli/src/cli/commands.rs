use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::parse_debounce;

/// Available fob-data subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Compile data loaders into static modules
    ///
    /// Evaluates each loader, checks that its exports are plain data and
    /// prints the replacement module, or writes `<stem>.js` files into
    /// `--out-dir`.
    Compile(CompileArgs),

    /// Print the files a loader depends on
    ///
    /// Lists the loader itself, every module it imported and every file it
    /// read while being evaluated.
    Deps(DepsArgs),

    /// Compile all loaders, then recompile on change
    ///
    /// Discovers loaders under the project root, compiles them, and watches
    /// the tree. A change recompiles exactly the loaders that depend on the
    /// changed file; failed recompiles keep the previous output.
    Watch(WatchArgs),
}

/// Options shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the configured root or the current directory)
    ///
    /// Ignore globs, path aliases and `process.cwd()` inside loaders are
    /// resolved against this directory.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to a configuration file (`.toml` or `.json`)
    ///
    /// When omitted, `fob-data.toml` and then the `fobData` field of
    /// `package.json` in the project root are used if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Arguments for the compile command
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Loader files to compile
    ///
    /// Examples:
    ///   fob-data compile src/posts.data.ts
    ///   fob-data compile src/*.data.ts --out-dir dist/data
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Write compiled modules here instead of printing them
    ///
    /// Output keeps the loader's directory layout relative to the root.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the deps command
#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Loader file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the dependency list as a JSON array of absolute paths
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub project: ProjectArgs,
}

/// Arguments for the watch command
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Write compiled modules here; without it, watch only reports results
    #[arg(short = 'd', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Delay before a repeated change to the same file triggers again
    #[arg(long, value_parser = parse_debounce, value_name = "MS")]
    pub debounce_ms: Option<u64>,

    #[command(flatten)]
    pub project: ProjectArgs,
}
