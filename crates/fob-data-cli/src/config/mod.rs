//! Configuration for the fob-data CLI with multi-source loading.
//!
//! Merges settings from CLI args, environment variables, and config files.
//! Priority: CLI > Environment (`FOB_DATA_*`) > File > Defaults
//!
//! The file is either the one passed with `--config`, `fob-data.toml` in the
//! project directory, or the `fobData` field of its `package.json`.

mod loading;
mod tests;

use fob_plugin_data::{DataPluginOptions, GuardMode, LogLevel, ResolvedConfig};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};

pub use loading::{ConfigOverrides, CONFIG_FILE_NAME, PACKAGE_JSON_KEY};

/// Largest accepted debounce window
pub const MAX_DEBOUNCE_MS: u64 = 10_000;

fn default_debounce_ms() -> u64 {
    100
}

/// fob-data configuration - loaded from fob-data.toml, package.json or CLI args.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DataConfig {
    /// Project root; relative values are resolved against the project directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Where compiled modules are written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    /// Extra ignore globs, anchored at the root when relative
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Serialization guard policy
    #[serde(default)]
    pub guard: GuardMode,

    #[serde(default)]
    pub log_level: LogLevel,

    /// Import aliases (`"@data" = "src/data"`)
    #[serde(default)]
    pub alias: IndexMap<String, String>,

    /// Global constants visible to loaders
    #[serde(default)]
    pub define: IndexMap<String, Value>,

    /// Watch mode debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: None,
            out_dir: None,
            ignore: Vec::new(),
            guard: GuardMode::default(),
            log_level: LogLevel::default(),
            alias: IndexMap::new(),
            define: IndexMap::new(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl DataConfig {
    /// Project root. Always absolute after [`DataConfig::load`].
    pub fn root(&self) -> &Path {
        self.root.as_deref().unwrap_or_else(|| Path::new("."))
    }

    /// Output directory resolved against the root.
    pub fn out_dir(&self) -> Option<PathBuf> {
        self.out_dir.as_ref().map(|dir| self.root().join(dir))
    }

    /// Plugin options derived from this configuration.
    pub fn plugin_options(&self) -> DataPluginOptions {
        let mut options = DataPluginOptions::new()
            .with_guard(self.guard)
            .with_root(self.root());
        options.ignore = self.ignore.clone();
        if !self.define.is_empty() {
            options = options.with_config(json!({ "define": self.define }));
        }
        options
    }

    /// Host snapshot handed to the plugin once per session.
    pub fn resolved(&self, quiet: bool) -> ResolvedConfig {
        let log_level = if quiet {
            LogLevel::Silent
        } else {
            self.log_level
        };
        let mut resolved = ResolvedConfig::new(self.root()).with_log_level(log_level);
        for (find, replacement) in &self.alias {
            resolved = resolved.with_alias(find.clone(), replacement.clone());
        }
        resolved
    }
}
