//! Rolldown plugin for build-time data loaders
//!
//! Modules named `*.data.{js,cjs,mjs,ts,cts,mts}` are evaluated while the
//! bundle is built. Their exports are captured, checked for plain-data
//! serializability and replaced by a static module embedding the values as
//! JSON literals, so loader code (and whatever it reads) never ships.
//!
//! ## Architecture
//!
//! ```text
//! load(id) → IgnoreFilter::claim → LoaderExecutor::execute → compile (guard) → ResultStore::record
//!                                                                              ↑
//! handle_hot_update(file) ─────────────── ResultStore::affected_by ────────────┘
//! ```
//!
//! Every evaluation records the files it touched. When one of them changes,
//! [`FobDataPlugin::handle_hot_update`] adds the loaders that depend on it to
//! the host's invalidation set.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_data::{DataPluginOptions, FobDataPlugin, ResolvedConfig};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let plugin = FobDataPlugin::new(DataPluginOptions::new().with_ignore("fixtures/**"))?;
//! plugin.config_resolved(ResolvedConfig::new("/path/to/project"))?;
//! let plugin = Arc::new(plugin);
//! // Add to your Rolldown bundler configuration
//! # Ok(())
//! # }
//! ```

pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod filter;
pub mod guard;
pub mod hot_update;
pub mod store;
pub mod value;

pub use compiler::compile;
pub use config::{BuildConfig, DataPluginOptions, LogLevel, ResolveConfig, ResolvedConfig};
pub use error::{DataError, Result};
pub use executor::{LoaderExecutor, QuickJsExecutor};
pub use filter::IgnoreFilter;
pub use guard::{assert_serializable, GuardMode};
pub use hot_update::{HotUpdateContext, ModuleLookup};
pub use store::{LoaderResult, ModuleId, ResultStore};
pub use value::{ExportValue, Exports};

use anyhow::Context;
use parking_lot::RwLock;
use rolldown_common::side_effects::HookSideEffects;
use rolldown_common::ModuleType;
use rolldown_plugin::{HookLoadArgs, HookLoadOutput, HookLoadReturn, Plugin, PluginContext};
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

/// Compiled replacement for a claimed loader module
#[derive(Debug, Clone, PartialEq)]
pub struct DataModule {
    pub module_id: ModuleId,
    pub code: String,
}

#[derive(Debug)]
struct PluginState {
    snapshot: ResolvedConfig,
    filter: IgnoreFilter,
}

/// Rolldown plugin that evaluates data loaders at build time
///
/// Cloning is cheap and clones share the result store, so a host can keep a
/// handle for hot updates while Rolldown owns another.
#[derive(Debug, Clone)]
pub struct FobDataPlugin {
    options: Arc<DataPluginOptions>,
    state: Arc<RwLock<PluginState>>,
    store: Arc<ResultStore>,
    executor: Arc<dyn LoaderExecutor>,
}

impl FobDataPlugin {
    /// Create a plugin evaluating loaders on the embedded QuickJS engine.
    ///
    /// Until [`config_resolved`](Self::config_resolved) is called, the project
    /// root is `options.root` or the current directory.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::InvalidIgnorePattern`] for malformed ignore globs.
    pub fn new(options: DataPluginOptions) -> Result<Self> {
        let root = match &options.root {
            Some(root) => root.clone(),
            None => std::env::current_dir().map_err(|e| DataError::io(".", e))?,
        };
        let snapshot = ResolvedConfig::new(root);
        let filter = IgnoreFilter::new(&snapshot.root, &options.ignore)?;

        Ok(Self {
            options: Arc::new(options),
            state: Arc::new(RwLock::new(PluginState { snapshot, filter })),
            store: Arc::new(ResultStore::new()),
            executor: Arc::new(QuickJsExecutor::new()),
        })
    }

    /// Replace the loader executor
    pub fn with_executor(mut self, executor: Arc<dyn LoaderExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Share an existing result store
    pub fn with_store(mut self, store: Arc<ResultStore>) -> Self {
        self.store = store;
        self
    }

    /// Store the host's configuration snapshot and re-anchor ignore globs at its root.
    pub fn config_resolved(&self, snapshot: ResolvedConfig) -> Result<()> {
        let filter = IgnoreFilter::new(&snapshot.root, &self.options.ignore)?;
        tracing::debug!(
            target: "fob_data",
            root = %snapshot.root.display(),
            log_level = %snapshot.log_level,
            aliases = snapshot.alias.len(),
            "configuration resolved"
        );
        *self.state.write() = PluginState { snapshot, filter };
        Ok(())
    }

    pub fn snapshot(&self) -> ResolvedConfig {
        self.state.read().snapshot.clone()
    }

    pub fn options(&self) -> &DataPluginOptions {
        &self.options
    }

    pub fn store(&self) -> &Arc<ResultStore> {
        &self.store
    }

    /// Whether the plugin owns `id`
    pub fn claims(&self, id: &str) -> bool {
        self.state.read().filter.claim(id).is_some()
    }

    /// Evaluate and compile a loader module.
    ///
    /// Returns `Ok(None)` for ids the plugin does not claim. The result is
    /// recorded only after compilation succeeds, so a failed load keeps the
    /// previous result and its dependency tracking.
    pub async fn load_data_module(&self, id: &str) -> Result<Option<DataModule>> {
        let (path, snapshot) = {
            let state = self.state.read();
            match state.filter.claim(id) {
                Some(path) => (path.to_string(), state.snapshot.clone()),
                None => {
                    tracing::debug!(target: "fob_data", id, "not a data loader");
                    return Ok(None);
                }
            }
        };

        if snapshot.log_level >= LogLevel::Info {
            tracing::info!(target: "fob_data", "[fob-data] {}", relative_to(&snapshot.root, &path));
        }

        let config = BuildConfig::merged(&self.options.config, &snapshot)?;
        let result = self.executor.execute(Path::new(&path), &config).await?;
        let code = compile(&result.exports, self.options.guard)?;

        tracing::debug!(
            target: "fob_data",
            module = %result.module_id,
            exports = result.exports.len(),
            dependencies = result.dependencies.len(),
            "loader compiled"
        );

        let module_id = result.module_id.clone();
        self.store.record(result);
        Ok(Some(DataModule { module_id, code }))
    }

    /// Expand the host's invalidation set with loaders depending on `ctx.file`.
    pub fn handle_hot_update<L: ModuleLookup>(&self, ctx: HotUpdateContext<'_, L>) -> Vec<L::Module> {
        hot_update::expand_invalidation(&self.store, ctx)
    }
}

fn relative_to(root: &Path, path: &str) -> String {
    let root = filter::normalize_path(root);
    let root = root.trim_end_matches('/');
    let path = path.replace('\\', "/");
    let relative = path
        .strip_prefix(root)
        .filter(|rest| rest.starts_with('/'))
        .map(|rest| rest.trim_start_matches('/').to_string());
    relative.unwrap_or(path)
}

impl Plugin for FobDataPlugin {
    fn name(&self) -> Cow<'static, str> {
        "fob-data".into()
    }

    fn register_hook_usage(&self) -> rolldown_plugin::HookUsage {
        use rolldown_plugin::HookUsage;
        HookUsage::Load
    }

    /// Load hook - replaces claimed loaders with their compiled exports
    ///
    /// - `Ok(Some(output))` - compiled data module, free of side effects
    /// - `Ok(None)` - not a data loader, let Rolldown handle it
    /// - `Err(e)` - evaluation, serialization or compile failure
    fn load(
        &self,
        _ctx: &PluginContext,
        args: &HookLoadArgs<'_>,
    ) -> impl std::future::Future<Output = HookLoadReturn> + Send {
        let id = args.id.to_string();
        let plugin = self.clone();

        async move {
            let Some(module) = plugin
                .load_data_module(&id)
                .await
                .with_context(|| format!("Failed to load data module: {}", id))?
            else {
                return Ok(None);
            };

            Ok(Some(HookLoadOutput {
                code: module.code.into(),
                module_type: Some(ModuleType::Js),
                side_effects: Some(HookSideEffects::False),
                ..Default::default()
            }))
        }
    }
}
