use fob_plugin_data::FobDataPlugin;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::is_skipped_component;

/// Every file under `root` the plugin claims, in path order.
///
/// Hidden directories, `node_modules` and anything under `skip` (usually the
/// output directory) are not entered.
pub fn discover_loaders(root: &Path, plugin: &FobDataPlugin, skip: &[PathBuf]) -> Vec<PathBuf> {
    let mut loaders: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() == 0 {
                return true;
            }
            let skipped_name = entry
                .file_name()
                .to_str()
                .is_some_and(|name| entry.file_type().is_dir() && is_skipped_component(name));
            !skipped_name && !skip.iter().any(|dir| entry.path().starts_with(dir))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::debug!(target: "fob_data", "skipping unreadable entry: {err}");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| plugin.claims(&path.to_string_lossy()))
        .collect();

    loaders.sort();
    loaders
}
