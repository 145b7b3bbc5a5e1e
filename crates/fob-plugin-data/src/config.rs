//! Plugin options, the host configuration snapshot, and build config merging.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::error::{DataError, Result};
use crate::filter::normalize_path;
use crate::guard::GuardMode;

/// Log level reported by the host
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging output
    Silent,
    Error,
    Warn,
    /// Errors, warnings, and info (default)
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Silent => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "off" => Ok(LogLevel::Silent),
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            other => Err(format!("Invalid log level: {}", other)),
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_filter())
    }
}

/// User-facing plugin options
///
/// ```rust
/// use fob_plugin_data::{DataPluginOptions, GuardMode};
///
/// let options = DataPluginOptions::new()
///     .with_ignore("fixtures/**")
///     .with_guard(GuardMode::Shallow);
/// assert_eq!(options.ignore, vec!["fixtures/**".to_string()]);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataPluginOptions {
    /// Extra glob patterns; relative ones are anchored at the project root
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Build configuration overrides, merged under the host snapshot at each load
    #[serde(default)]
    pub config: Value,

    /// How deep the serialization guard inspects exports
    #[serde(default)]
    pub guard: GuardMode,

    /// Project root used until the host resolves its configuration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
}

impl DataPluginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ignore(mut self, pattern: impl Into<String>) -> Self {
        self.ignore.push(pattern.into());
        self
    }

    pub fn with_config(mut self, config: Value) -> Self {
        self.config = config;
        self
    }

    pub fn with_guard(mut self, guard: GuardMode) -> Self {
        self.guard = guard;
        self
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }
}

/// Snapshot of the host's resolved configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub root: PathBuf,
    pub log_level: LogLevel,
    /// Import alias table (`"@data" → "/abs/src/data"`), matched by prefix
    pub alias: IndexMap<String, String>,
}

impl ResolvedConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_level: LogLevel::default(),
            alias: IndexMap::new(),
        }
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn with_alias(mut self, find: impl Into<String>, replacement: impl Into<String>) -> Self {
        self.alias.insert(find.into(), replacement.into());
        self
    }

    fn to_value(&self) -> Value {
        json!({
            "root": normalize_path(&self.root),
            "logLevel": self.log_level,
            "resolve": { "alias": self.alias },
        })
    }
}

/// Module resolution settings used while evaluating loaders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveConfig {
    #[serde(default)]
    pub alias: IndexMap<String, String>,

    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            alias: IndexMap::new(),
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    ["mjs", "js", "mts", "ts", "cjs", "cts", "json"]
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

/// Merged configuration handed to the loader executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    pub root: PathBuf,

    #[serde(default)]
    pub log_level: LogLevel,

    #[serde(default)]
    pub resolve: ResolveConfig,

    /// Global constants visible to loader code
    #[serde(default)]
    pub define: IndexMap<String, Value>,
}

impl BuildConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            log_level: LogLevel::default(),
            resolve: ResolveConfig::default(),
            define: IndexMap::new(),
        }
    }

    /// Merge user overrides with the host snapshot; the snapshot wins on conflicts.
    pub fn merged(user: &Value, snapshot: &ResolvedConfig) -> Result<Self> {
        let mut base = match user {
            Value::Null => Value::Object(Default::default()),
            Value::Object(_) => user.clone(),
            other => {
                return Err(DataError::Config(format!(
                    "expected an object for `config`, found {other}"
                )))
            }
        };
        merge_values(&mut base, &snapshot.to_value());
        serde_json::from_value(base).map_err(|e| DataError::Config(e.to_string()))
    }
}

/// Recursive merge where `update` wins; objects merge key by key, arrays are replaced.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, Value::Object(update_map)) => {
            let mut new_obj = serde_json::Map::with_capacity(update_map.len());
            for (key, value) in update_map {
                new_obj.insert(key.clone(), value.clone());
            }
            *target_slot = Value::Object(new_obj);
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}
