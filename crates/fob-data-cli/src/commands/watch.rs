//! `fob-data watch`: compile every loader, then recompile on change.
//!
//! The plugin's result store knows which files each loader read. A change is
//! routed through [`FobDataPlugin::handle_hot_update`] with the discovered
//! loaders as the module graph, so only the loaders that depend on the
//! changed file are evaluated again. A failed recompile is reported and the
//! previous output (and dependency tracking) stays in place.
//!
//! [`FobDataPlugin::handle_hot_update`]: fob_plugin_data::FobDataPlugin::handle_hot_update

use crate::cli::WatchArgs;
use crate::commands::utils::{get_cwd, resolve_path, write_module, Session};
use crate::config::ConfigOverrides;
use crate::error::Result;
use crate::ui;
use crate::watch::{discover_loaders, FileChange, FileWatcher};
use fob_plugin_data::{HotUpdateContext, ModuleId};
use indexmap::{IndexMap, IndexSet};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::signal;
use tokio::sync::mpsc;

/// Known loaders, keyed the way the result store keys them
type LoaderGraph = IndexMap<ModuleId, PathBuf>;

/// Execute the watch command.
pub async fn execute(args: WatchArgs, quiet: bool) -> Result<()> {
    let cwd = get_cwd()?;
    let overrides = ConfigOverrides {
        out_dir: args.out_dir.as_deref().map(|dir| resolve_path(dir, &cwd)),
        debounce_ms: args.debounce_ms,
        ..ConfigOverrides::default()
    };
    let session = Session::open(&args.project, overrides, quiet)?;
    let root = session.root().to_path_buf();
    let out_dir = session.config.out_dir();
    let skip: Vec<PathBuf> = out_dir.iter().cloned().collect();

    let mut graph: LoaderGraph = discover_loaders(&root, &session.plugin, &skip)
        .into_iter()
        .map(|path| (ModuleId::new(&path), path))
        .collect();
    if let Some(out_dir) = out_dir.as_deref() {
        session.output_paths(out_dir, graph.values().map(PathBuf::as_path))?;
    }

    if graph.is_empty() {
        ui::warning(&format!("No data loaders found under {}", root.display()));
    } else if !quiet {
        ui::info(&format!("Compiling {} data loaders...", graph.len()));
    }

    let started = Instant::now();
    let mut failed = 0;
    for loader in graph.values() {
        if !rebuild(&session, out_dir.as_deref(), loader, quiet).await {
            failed += 1;
        }
    }
    if !quiet && !graph.is_empty() {
        let compiled = graph.len() - failed;
        ui::success(&format!(
            "Compiled {} of {} loaders in {}",
            compiled,
            graph.len(),
            ui::format_duration(started.elapsed())
        ));
    }

    let debounce = Duration::from_millis(session.config.debounce_ms);
    let (watcher, mut change_rx) = FileWatcher::new(root, skip, session.config.debounce_ms)?;
    if !quiet {
        ui::info(&format!("Watching for changes in: {}", watcher.root().display()));
        ui::info("Press Ctrl+C to stop");
    }

    loop {
        tokio::select! {
            Some(change) = change_rx.recv() => {
                let changes = settle(change, &mut change_rx, debounce).await;
                let targets = plan(&session, out_dir.as_deref(), &mut graph, &changes);
                for loader in targets {
                    rebuild(&session, out_dir.as_deref(), &loader, quiet).await;
                }
            }

            _ = signal::ctrl_c() => {
                if !quiet {
                    ui::info("Stopping watch...");
                }
                break;
            }

            else => break,
        }
    }

    Ok(())
}

/// Let a burst of events finish, then take everything queued.
async fn settle(
    first: FileChange,
    rx: &mut mpsc::Receiver<FileChange>,
    window: Duration,
) -> Vec<FileChange> {
    tokio::time::sleep(window).await;
    let mut changes = vec![first];
    while let Ok(change) = rx.try_recv() {
        if !changes.contains(&change) {
            changes.push(change);
        }
    }
    changes
}

/// Loaders to recompile for a batch of changes, in first-seen order.
///
/// New loader files join the graph unless their output would overwrite
/// another loader's; removed ones are dropped from it and never rebuilt.
fn plan(
    session: &Session,
    out_dir: Option<&Path>,
    graph: &mut LoaderGraph,
    changes: &[FileChange],
) -> Vec<PathBuf> {
    let mut targets: IndexSet<PathBuf> = IndexSet::new();

    for change in changes {
        let path = change.path();
        let id = ModuleId::new(path);

        let changed_loader = match change {
            FileChange::Removed(_) => {
                graph.shift_remove(&id);
                None
            }
            FileChange::Created(_) | FileChange::Modified(_) => {
                if !session.plugin.claims(&path.to_string_lossy()) {
                    None
                } else if let Err(err) = check_output(session, out_dir, graph, path) {
                    ui::warning(&err.to_string());
                    None
                } else {
                    graph
                        .entry(id.clone())
                        .or_insert_with(|| path.to_path_buf());
                    Some(path.to_path_buf())
                }
            }
        };

        let ctx = HotUpdateContext::new(path, changed_loader.into_iter().collect(), &*graph);
        let affected = session.plugin.handle_hot_update(ctx);
        tracing::debug!(
            target: "fob_data_cli",
            file = %path.display(),
            affected = affected.len(),
            "file changed"
        );
        targets.extend(affected);
    }

    targets.into_iter().filter(|path| path.is_file()).collect()
}

/// Refuse a loader whose output file already belongs to another loader.
fn check_output(
    session: &Session,
    out_dir: Option<&Path>,
    graph: &LoaderGraph,
    loader: &Path,
) -> Result<()> {
    if let Some(out_dir) = out_dir {
        let known = graph.values().map(PathBuf::as_path);
        session.output_paths(out_dir, known.chain(std::iter::once(loader)))?;
    }
    Ok(())
}

/// Recompile one loader and write its output. Returns whether it succeeded.
async fn rebuild(session: &Session, out_dir: Option<&Path>, loader: &Path, quiet: bool) -> bool {
    let started = Instant::now();
    let name = session.display_path(loader);

    let module = match session.compile(loader).await {
        Ok(module) => module,
        Err(err) => {
            tracing::warn!(target: "fob_data", loader = %name, "recompile failed; keeping previous result");
            ui::warning(&format!("{name}: {err}"));
            return false;
        }
    };

    let output = out_dir.map(|dir| session.output_path(dir, loader));
    if let Some(output) = &output {
        if let Err(err) = write_module(output, &module.code) {
            ui::error(&format!("{}: {err}", session.display_path(output)));
            return false;
        }
    }

    if !quiet {
        let output = output.as_deref().map(|path| session.display_path(path));
        ui::compiled(
            &name,
            output.as_deref(),
            module.code.len() as u64,
            started.elapsed(),
        );
    }
    true
}
