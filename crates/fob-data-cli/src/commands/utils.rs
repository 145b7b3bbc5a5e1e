//! Shared pieces of the command implementations.
//!
//! A [`Session`] is one configured plugin instance: configuration loaded
//! from every source, plugin constructed from it, and the host snapshot
//! (root, log level, aliases) applied.

use crate::cli::ProjectArgs;
use crate::config::{ConfigOverrides, DataConfig};
use crate::error::{CliError, Result};
use fob_plugin_data::{DataModule, FobDataPlugin};
use indexmap::IndexMap;
use path_clean::PathClean;
use std::fs;
use std::path::{Path, PathBuf};

/// Configured plugin plus the configuration it came from.
pub struct Session {
    pub config: DataConfig,
    pub plugin: FobDataPlugin,
}

impl Session {
    pub fn open(project: &ProjectArgs, overrides: ConfigOverrides, quiet: bool) -> Result<Self> {
        let config = DataConfig::load(project, overrides)?;
        let plugin = FobDataPlugin::new(config.plugin_options())?;
        plugin.config_resolved(config.resolved(quiet))?;

        tracing::debug!(
            target: "fob_data_cli",
            root = %config.root().display(),
            guard = ?config.guard,
            "session opened"
        );

        Ok(Self { config, plugin })
    }

    pub fn root(&self) -> &Path {
        self.config.root()
    }

    /// Absolute path of a loader named on the command line.
    ///
    /// # Errors
    ///
    /// [`CliError::FileNotFound`] when the file is missing and
    /// [`CliError::NotALoader`] when the plugin does not claim it.
    pub fn resolve_loader(&self, file: &Path) -> Result<PathBuf> {
        let path = resolve_path(file, &get_cwd()?).clean();
        if !path.is_file() {
            return Err(CliError::FileNotFound(path));
        }
        if !self.plugin.claims(&path.to_string_lossy()) {
            return Err(CliError::NotALoader(path));
        }
        Ok(path)
    }

    /// Evaluate and compile one loader, recording its result.
    pub async fn compile(&self, loader: &Path) -> Result<DataModule> {
        self.plugin
            .load_data_module(&loader.to_string_lossy())
            .await?
            .ok_or_else(|| CliError::NotALoader(loader.to_path_buf()))
    }

    /// `path` relative to the root when inside it, else unchanged.
    pub fn display_path(&self, path: &Path) -> String {
        path.strip_prefix(self.root())
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Where the compiled module of `loader` goes under `out_dir`.
    ///
    /// Keeps the loader's directory relative to the root and drops the
    /// `.data.<ext>` suffix: `src/posts.data.ts` becomes `<out_dir>/src/posts.js`.
    pub fn output_path(&self, out_dir: &Path, loader: &Path) -> PathBuf {
        let relative_dir = loader
            .parent()
            .and_then(|dir| dir.strip_prefix(self.root()).ok())
            .unwrap_or_else(|| Path::new(""));
        let file_name = loader
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        out_dir
            .join(relative_dir)
            .join(format!("{}.js", loader_stem(&file_name)))
    }

    /// Output path of every loader, keyed by loader.
    ///
    /// # Errors
    ///
    /// [`CliError::OutputCollision`] when two loaders map to the same file,
    /// e.g. `posts.data.js` and `posts.data.ts` side by side.
    pub fn output_paths<'a>(
        &self,
        out_dir: &Path,
        loaders: impl IntoIterator<Item = &'a Path>,
    ) -> Result<IndexMap<PathBuf, PathBuf>> {
        let mut owners: IndexMap<PathBuf, PathBuf> = IndexMap::new();
        for loader in loaders {
            let output = self.output_path(out_dir, loader);
            match owners.get(&output) {
                Some(first) if first.as_path() != loader => {
                    return Err(CliError::OutputCollision {
                        output,
                        first: first.clone(),
                        second: loader.to_path_buf(),
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(output, loader.to_path_buf());
                }
            }
        }
        Ok(owners
            .into_iter()
            .map(|(output, loader)| (loader, output))
            .collect())
    }
}

/// File name without the `.data.<ext>` suffix.
pub fn loader_stem(file_name: &str) -> &str {
    // ASCII lowercasing keeps byte offsets valid for the original
    match file_name.to_ascii_lowercase().rfind(".data.") {
        Some(index) => &file_name[..index],
        None => file_name,
    }
}

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Get the current working directory.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to get current directory: {}", e),
        ))
    })
}

/// Write a compiled module, creating parent directories.
pub fn write_module(path: &Path, code: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if parent.exists() && !parent.is_dir() {
            return Err(CliError::Custom(format!(
                "Output path exists but is not a directory: {}",
                parent.display()
            )));
        }
        fs::create_dir_all(parent)?;
    }
    fs::write(path, code)?;
    Ok(())
}
