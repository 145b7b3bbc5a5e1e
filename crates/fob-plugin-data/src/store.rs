//! Result store and dependency invalidation.
//!
//! The store remembers the last successful evaluation of every loader module
//! together with the files that evaluation touched. On a file-change event,
//! [`ResultStore::affected_by`] answers which loaders must be recompiled.

use indexmap::{IndexMap, IndexSet};
use parking_lot::RwLock;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::filter::normalize_path;
use crate::value::Exports;

/// Absolute, forward-slash normalized path identifying a module or file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(String);

impl ModuleId {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self(normalize_path(path.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_path_buf(&self) -> PathBuf {
        PathBuf::from(&self.0)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&Path> for ModuleId {
    fn from(path: &Path) -> Self {
        Self::new(path)
    }
}

impl From<&str> for ModuleId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl AsRef<str> for ModuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Outcome of evaluating one loader module
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderResult {
    pub module_id: ModuleId,
    pub exports: Exports,
    /// Files whose modification makes this result stale; always contains `module_id`
    pub dependencies: IndexSet<ModuleId>,
}

impl LoaderResult {
    /// Build a result, making sure the loader's own file is a dependency.
    pub fn new(
        module_id: ModuleId,
        exports: Exports,
        dependencies: impl IntoIterator<Item = ModuleId>,
    ) -> Self {
        let mut deps = IndexSet::new();
        deps.insert(module_id.clone());
        deps.extend(dependencies);
        Self {
            module_id,
            exports,
            dependencies: deps,
        }
    }

    pub fn depends_on(&self, file: &ModuleId) -> bool {
        self.dependencies.contains(file)
    }
}

/// Process-lifetime table of the latest result per loader module.
///
/// Last write wins; failed loads never touch the table, so a stale but valid
/// result keeps its dependency tracking until the next successful load.
#[derive(Debug, Default)]
pub struct ResultStore {
    results: RwLock<IndexMap<ModuleId, Arc<LoaderResult>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store or replace the result for `result.module_id`
    pub fn record(&self, result: LoaderResult) {
        let id = result.module_id.clone();
        self.results.write().insert(id, Arc::new(result));
    }

    /// Loader modules whose recorded dependencies contain `changed_file`.
    ///
    /// Returned in store insertion order. Pure read; the store is not modified.
    pub fn affected_by(&self, changed_file: impl AsRef<Path>) -> IndexSet<ModuleId> {
        let changed = ModuleId::new(changed_file);
        self.results
            .read()
            .iter()
            .filter(|(_, result)| result.depends_on(&changed))
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn get(&self, module_id: &ModuleId) -> Option<Arc<LoaderResult>> {
        self.results.read().get(module_id).cloned()
    }

    pub fn module_ids(&self) -> Vec<ModuleId> {
        self.results.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.results.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.read().is_empty()
    }
}
