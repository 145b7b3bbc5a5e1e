//! Command implementations for the fob-data CLI.
//!
//! - [`compile`] - Evaluate loaders and emit static modules
//! - [`deps`] - Print a loader's dependency set
//! - [`watch`] - Compile everything, then recompile on change
//!
//! Each command provides an `execute` function taking its parsed arguments.

pub mod compile;
pub mod deps;
pub(crate) mod utils;
pub mod watch;

pub use compile::execute as compile_execute;
pub use deps::execute as deps_execute;
pub use watch::execute as watch_execute;
