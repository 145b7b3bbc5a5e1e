//! Hot-update invalidation.
//!
//! The host reports a changed file together with the modules it already
//! considers stale. The plugin adds every loader module whose last evaluation
//! touched that file, provided the host can resolve the loader to one of its
//! own module nodes.

use indexmap::{IndexMap, IndexSet};
use std::hash::Hash;
use std::path::PathBuf;

use crate::store::{ModuleId, ResultStore};

/// Host capability mapping a module id to the host's module node.
pub trait ModuleLookup {
    type Module: Clone + Eq + Hash;

    fn get_module_by_id(&self, id: &ModuleId) -> Option<Self::Module>;
}

impl<M: Clone + Eq + Hash> ModuleLookup for IndexMap<ModuleId, M> {
    type Module = M;

    fn get_module_by_id(&self, id: &ModuleId) -> Option<M> {
        self.get(id).cloned()
    }
}

/// Change notification handed over by the host
pub struct HotUpdateContext<'a, L: ModuleLookup> {
    pub file: PathBuf,
    /// Modules the host already invalidated
    pub modules: Vec<L::Module>,
    pub lookup: &'a L,
}

impl<'a, L: ModuleLookup> HotUpdateContext<'a, L> {
    pub fn new(file: impl Into<PathBuf>, modules: Vec<L::Module>, lookup: &'a L) -> Self {
        Self {
            file: file.into(),
            modules,
            lookup,
        }
    }
}

/// Union of the host's modules and the loaders affected by `ctx.file`.
///
/// Host modules come first, in the host's order; affected loaders follow in
/// store order. Duplicates are dropped and ids the lookup cannot resolve are
/// skipped.
pub fn expand_invalidation<L: ModuleLookup>(
    store: &ResultStore,
    ctx: HotUpdateContext<'_, L>,
) -> Vec<L::Module> {
    let affected = store.affected_by(&ctx.file);
    let mut modules: IndexSet<L::Module> = ctx.modules.into_iter().collect();

    for id in &affected {
        match ctx.lookup.get_module_by_id(id) {
            Some(module) => {
                modules.insert(module);
            }
            None => {
                tracing::debug!(target: "fob_data::hot_update", module = %id, "affected loader not in module graph");
            }
        }
    }

    modules.into_iter().collect()
}
