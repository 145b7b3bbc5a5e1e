//! `fob-data compile`: evaluate loaders and emit their static modules.

use crate::cli::CompileArgs;
use crate::commands::utils::{get_cwd, resolve_path, write_module, Session};
use crate::config::ConfigOverrides;
use crate::error::{CliError, Result};
use crate::ui;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

/// Execute the compile command.
///
/// Without `--out-dir` the compiled modules go to stdout, each preceded by a
/// `// <path>` line when more than one loader was given. A single failing
/// loader returns its own error; in a batch every failure is reported and
/// the command fails with [`CliError::Failed`].
pub async fn execute(args: CompileArgs, quiet: bool) -> Result<()> {
    let cwd = get_cwd()?;
    let overrides = ConfigOverrides {
        out_dir: args.out_dir.as_deref().map(|dir| resolve_path(dir, &cwd)),
        ..ConfigOverrides::default()
    };
    let session = Session::open(&args.project, overrides, quiet)?;

    let loaders = args
        .files
        .iter()
        .map(|file| session.resolve_loader(file))
        .collect::<Result<Vec<PathBuf>>>()?;

    // Collisions are refused before anything is evaluated or written.
    let outputs = match session.config.out_dir() {
        Some(out_dir) => {
            Some(session.output_paths(&out_dir, loaders.iter().map(PathBuf::as_path))?)
        }
        None => None,
    };
    let total = loaders.len();
    let mut failed = 0;
    let mut stdout = std::io::stdout();

    for loader in &loaders {
        let started = Instant::now();
        let name = session.display_path(loader);

        let module = match session.compile(loader).await {
            Ok(module) => module,
            Err(err) if total == 1 => return Err(err),
            Err(err) => {
                ui::error(&format!("{name}: {err}"));
                failed += 1;
                continue;
            }
        };

        match &outputs {
            Some(outputs) => {
                let output = &outputs[loader];
                write_module(output, &module.code)?;
                if !quiet {
                    ui::compiled(
                        &name,
                        Some(session.display_path(output).as_str()),
                        module.code.len() as u64,
                        started.elapsed(),
                    );
                }
            }
            None => {
                if total > 1 {
                    writeln!(stdout, "// {name}")?;
                }
                stdout.write_all(module.code.as_bytes())?;
            }
        }
    }
    stdout.flush()?;

    if failed > 0 {
        return Err(CliError::Failed { failed, total });
    }
    Ok(())
}
