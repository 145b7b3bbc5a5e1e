#[cfg(test)]
mod tests {
    use crate::cli::ProjectArgs;
    use crate::config::loading::env_key;
    use crate::config::*;
    use crate::error::{CliError, ConfigError};
    use fob_plugin_data::{GuardMode, LogLevel};
    use serde_json::json;
    use serial_test::serial;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn project(dir: &Path) -> ProjectArgs {
        ProjectArgs {
            root: Some(dir.to_path_buf()),
            config: None,
        }
    }

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("OUT_DIR"), "outDir");
        assert_eq!(env_key("debounce_ms"), "debounceMs");
        assert_eq!(env_key("GUARD"), "guard");
        assert_eq!(env_key("LOG_LEVEL"), "logLevel");
    }

    #[test]
    fn test_serialization() {
        let config = DataConfig {
            out_dir: Some("dist".into()),
            guard: GuardMode::Shallow,
            ..DataConfig::default()
        };
        let json_val = serde_json::to_value(&config).unwrap();
        assert_eq!(json_val["outDir"], json!("dist"));
        assert_eq!(json_val["guard"], json!("shallow"));
        assert_eq!(json_val["debounceMs"], json!(100));
        assert!(json_val.get("root").is_none());
        assert!(json_val.get("out_dir").is_none());
    }

    #[test]
    #[serial]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let config = DataConfig::load(&project(dir.path()), ConfigOverrides::default()).unwrap();

        assert_eq!(config.root(), dir.path());
        assert_eq!(config.out_dir, None);
        assert_eq!(config.guard, GuardMode::Deep);
        assert_eq!(config.debounce_ms, 100);
    }

    #[test]
    #[serial]
    fn test_toml_file_is_discovered() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("fob-data.toml"),
            r#"
outDir = "build/data"
ignore = ["drafts/**"]
guard = "shallow"
debounceMs = 250

[alias]
"@data" = "src/data"

[define]
SITE_NAME = "Fob"
"#,
        )
        .unwrap();

        let config = DataConfig::load(&project(dir.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.out_dir(), Some(dir.path().join("build/data")));
        assert_eq!(config.ignore, vec!["drafts/**"]);
        assert_eq!(config.guard, GuardMode::Shallow);
        assert_eq!(config.debounce_ms, 250);
        assert_eq!(config.alias["@data"], "src/data");
        assert_eq!(config.define["SITE_NAME"], json!("Fob"));
    }

    #[test]
    #[serial]
    fn test_package_json_field() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "name": "site", "fobData": { "ignore": ["fixtures/**"], "logLevel": "warn" } }"#,
        )
        .unwrap();

        let config = DataConfig::load(&project(dir.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.ignore, vec!["fixtures/**"]);
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    #[serial]
    fn test_toml_wins_over_package_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fob-data.toml"), "guard = \"shallow\"\n").unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{ "fobData": { "ignore": ["never/**"] } }"#,
        )
        .unwrap();

        let config = DataConfig::load(&project(dir.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.guard, GuardMode::Shallow);
        assert!(config.ignore.is_empty());
    }

    #[test]
    #[serial]
    fn test_explicit_json_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.config.json");
        fs::write(&path, r#"{ "outDir": "out" }"#).unwrap();

        let args = ProjectArgs {
            root: Some(dir.path().to_path_buf()),
            config: Some(path),
        };
        let config = DataConfig::load(&args, ConfigOverrides::default()).unwrap();
        assert_eq!(config.out_dir(), Some(dir.path().join("out")));
    }

    #[test]
    #[serial]
    fn test_missing_explicit_config() {
        let dir = TempDir::new().unwrap();
        let args = ProjectArgs {
            root: Some(dir.path().to_path_buf()),
            config: Some(dir.path().join("missing.toml")),
        };

        let err = DataConfig::load(&args, ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, CliError::Config(ConfigError::NotFound(_))));
    }

    #[test]
    #[serial]
    fn test_unsupported_config_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fob-data.yaml");
        fs::write(&path, "guard: deep\n").unwrap();

        let args = ProjectArgs {
            root: Some(dir.path().to_path_buf()),
            config: Some(path),
        };
        let err = DataConfig::load(&args, ConfigOverrides::default()).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(ConfigError::UnsupportedFormat(_))
        ));
    }

    #[test]
    #[serial]
    fn test_unknown_field_is_invalid() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fob-data.toml"), "outdir = \"dist\"\n").unwrap();

        let err = DataConfig::load(&project(dir.path()), ConfigOverrides::default()).unwrap_err();
        match err {
            CliError::Config(ConfigError::Invalid { path, .. }) => {
                assert_eq!(path, Some(dir.path().join("fob-data.toml")));
            }
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fob-data.toml"), "debounceMs = 250\n").unwrap();

        std::env::set_var("FOB_DATA_DEBOUNCE_MS", "400");
        std::env::set_var("FOB_DATA_OUT_DIR", "env-out");
        let result = DataConfig::load(&project(dir.path()), ConfigOverrides::default());
        std::env::remove_var("FOB_DATA_DEBOUNCE_MS");
        std::env::remove_var("FOB_DATA_OUT_DIR");

        let config = result.unwrap();
        assert_eq!(config.debounce_ms, 400);
        assert_eq!(config.out_dir(), Some(dir.path().join("env-out")));
    }

    #[test]
    #[serial]
    fn test_cli_overrides_env() {
        let dir = TempDir::new().unwrap();

        std::env::set_var("FOB_DATA_DEBOUNCE_MS", "400");
        let overrides = ConfigOverrides {
            debounce_ms: Some(50),
            out_dir: Some("cli-out".into()),
            ..ConfigOverrides::default()
        };
        let result = DataConfig::load(&project(dir.path()), overrides);
        std::env::remove_var("FOB_DATA_DEBOUNCE_MS");

        let config = result.unwrap();
        assert_eq!(config.debounce_ms, 50);
        assert_eq!(config.out_dir(), Some(dir.path().join("cli-out")));
    }

    #[test]
    #[serial]
    fn test_cli_root_wins_over_file_root() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("fob-data.toml"), "root = \"site\"\n").unwrap();

        let config = DataConfig::load(&project(dir.path()), ConfigOverrides::default()).unwrap();
        assert_eq!(config.root(), dir.path());
    }

    #[test]
    #[serial]
    fn test_root_override_is_relative_to_project() {
        let overrides = ConfigOverrides {
            root: Some("site".into()),
            ..ConfigOverrides::default()
        };
        let args = ProjectArgs {
            root: None,
            config: None,
        };

        let cwd = std::env::current_dir().unwrap();
        let config = DataConfig::load(&args, overrides).unwrap();
        assert_eq!(config.root(), cwd.join("site"));
    }

    #[test]
    fn test_validation() {
        assert!(DataConfig::default().validate().is_ok());

        let too_slow = DataConfig {
            debounce_ms: 20_000,
            ..DataConfig::default()
        };
        assert!(matches!(
            too_slow.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));

        let mut empty_alias = DataConfig::default();
        empty_alias.alias.insert(String::new(), "src".into());
        assert!(empty_alias.validate().is_err());
    }

    #[test]
    fn test_plugin_options_and_snapshot() {
        let mut config = DataConfig {
            root: Some("/project".into()),
            ignore: vec!["drafts/**".into()],
            guard: GuardMode::Shallow,
            log_level: LogLevel::Debug,
            ..DataConfig::default()
        };
        config.alias.insert("@data".into(), "src/data".into());
        config.define.insert("DEBUG".into(), json!(true));

        let options = config.plugin_options();
        assert_eq!(options.ignore, vec!["drafts/**"]);
        assert_eq!(options.guard, GuardMode::Shallow);
        assert_eq!(options.root.as_deref(), Some(Path::new("/project")));
        assert_eq!(options.config, json!({ "define": { "DEBUG": true } }));

        let snapshot = config.resolved(false);
        assert_eq!(snapshot.root, Path::new("/project"));
        assert_eq!(snapshot.log_level, LogLevel::Debug);
        assert_eq!(snapshot.alias["@data"], "src/data");

        assert_eq!(config.resolved(true).log_level, LogLevel::Silent);
    }
}
