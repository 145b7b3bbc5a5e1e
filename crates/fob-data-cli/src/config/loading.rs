use crate::cli::ProjectArgs;
use crate::config::{DataConfig, MAX_DEBOUNCE_MS};
use crate::error::{ConfigError, Result};
use fob_plugin_data::LogLevel;
use figment::{
    providers::{Env, Format as _, Json, Serialized, Toml},
    Figment,
};
use path_clean::PathClean;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project directory
pub const CONFIG_FILE_NAME: &str = "fob-data.toml";

/// Field of `package.json` holding the configuration
pub const PACKAGE_JSON_KEY: &str = "fobData";

const ENV_PREFIX: &str = "FOB_DATA_";

/// Values given on the command line; unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub debounce_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<LogLevel>,
}

impl DataConfig {
    /// Load configuration from multiple sources.
    /// Priority: CLI args > environment variables > config file > defaults
    pub fn load(project: &ProjectArgs, overrides: ConfigOverrides) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let project_dir = project
            .root
            .as_ref()
            .map(|root| cwd.join(root).clean())
            .unwrap_or_else(|| cwd.clone());

        let mut figment = Figment::new();

        let config_file = match &project.config {
            Some(path) => Some(explicit_source(&cwd.join(path).clean())?),
            None => discovered_source(&project_dir),
        };
        let config_path = config_file.as_ref().map(|(path, _)| path.clone());
        if let Some((_, provider)) = config_file {
            figment = figment.merge(provider);
        }

        // FOB_DATA_OUT_DIR → outDir, FOB_DATA_DEBOUNCE_MS → debounceMs
        figment = figment.merge(
            Env::prefixed(ENV_PREFIX)
                .lowercase(false)
                .map(|key| env_key(key.as_str()).into()),
        );

        let overrides = ConfigOverrides {
            root: project.root.as_ref().map(|_| project_dir.clone()).or(overrides.root),
            ..overrides
        };
        figment = figment.merge(Serialized::defaults(overrides));

        let mut config: DataConfig = figment.extract().map_err(|e| ConfigError::Invalid {
            path: config_path,
            source: Box::new(e),
        })?;

        let root = config
            .root
            .as_ref()
            .map(|root| project_dir.join(root).clean())
            .unwrap_or(project_dir);
        config.root = Some(root);

        config.validate()?;
        Ok(config)
    }

    /// Check values the type system can't express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(ConfigError::InvalidValue {
                field: "debounceMs".to_string(),
                value: self.debounce_ms.to_string(),
                hint: format!("Use a value between 0 and {MAX_DEBOUNCE_MS}"),
            });
        }

        if let Some(find) = self.alias.keys().find(|find| find.is_empty()) {
            return Err(ConfigError::InvalidValue {
                field: "alias".to_string(),
                value: format!("{find:?}"),
                hint: "Alias keys must be non-empty import prefixes like \"@data\"".to_string(),
            });
        }

        Ok(())
    }
}

/// Provider for a file passed with `--config`, chosen by extension.
fn explicit_source(path: &Path) -> Result<(PathBuf, Figment), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Figment::from(Toml::file(path)),
        Some("json") if path.file_name().is_some_and(|name| name == "package.json") => {
            Figment::from(Json::file(path)).focus(PACKAGE_JSON_KEY)
        }
        Some("json") => Figment::from(Json::file(path)),
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };
    Ok((path.to_path_buf(), figment))
}

/// `fob-data.toml`, else the `fobData` field of `package.json`.
fn discovered_source(project_dir: &Path) -> Option<(PathBuf, Figment)> {
    let toml_path = project_dir.join(CONFIG_FILE_NAME);
    if toml_path.is_file() {
        return Some((toml_path.clone(), Figment::from(Toml::file(toml_path))));
    }

    let package_json = project_dir.join("package.json");
    package_json.is_file().then(|| {
        let figment = Figment::from(Json::file(&package_json)).focus(PACKAGE_JSON_KEY);
        (package_json, figment)
    })
}

/// `OUT_DIR` → `outDir`
pub(crate) fn env_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper = false;
    for ch in key.chars() {
        if ch == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.extend(ch.to_lowercase());
        }
    }
    out
}
