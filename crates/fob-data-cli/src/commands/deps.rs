//! `fob-data deps`: list the files a loader depends on.

use crate::cli::DepsArgs;
use crate::commands::utils::Session;
use crate::config::ConfigOverrides;
use crate::error::{CliError, Result};
use fob_plugin_data::ModuleId;

/// Execute the deps command.
///
/// The loader is compiled first; its recorded dependency set is printed one
/// root-relative path per line, or as a JSON array of absolute paths.
pub async fn execute(args: DepsArgs, quiet: bool) -> Result<()> {
    let session = Session::open(&args.project, ConfigOverrides::default(), quiet)?;
    let loader = session.resolve_loader(&args.file)?;
    let module = session.compile(&loader).await?;

    let result = session
        .plugin
        .store()
        .get(&module.module_id)
        .ok_or_else(|| CliError::Custom(format!("no result recorded for {}", module.module_id)))?;

    let dependencies: Vec<&ModuleId> = result.dependencies.iter().collect();
    if args.json {
        let paths: Vec<&str> = dependencies.iter().map(|id| id.as_str()).collect();
        println!("{}", serde_json::to_string_pretty(&paths)?);
    } else {
        for id in dependencies {
            println!("{}", session.display_path(&id.to_path_buf()));
        }
    }
    Ok(())
}
