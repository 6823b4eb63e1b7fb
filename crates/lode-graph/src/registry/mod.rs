//! The process-wide module registry.
//!
//! Single source of truth for per-module state: dependency lists,
//! lifecycle, exports, and the blacklist. The registry performs no
//! matching logic; other components read it or submit transitions through
//! its methods, which enforce the monotonic state machine.

mod mutations;
mod queries;

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use lode::{DepView, ModuleId};

use crate::record::ModuleRecord;

/// Shared handle to registry state.
///
/// Cloning the handle shares the underlying state; method impls are split
/// across `mutations.rs` and `queries.rs`.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    pub(crate) inner: Arc<RwLock<RegistryInner>>,
}

#[derive(Debug, Default)]
pub(crate) struct RegistryInner {
    pub(crate) records: FxHashMap<ModuleId, ModuleRecord>,
    /// Ids excluded from all matching and dispatch. Holds both modules
    /// condemned by export classification this run and ids seeded from a
    /// previous run's cache.
    pub(crate) blacklist: FxHashSet<ModuleId>,
}

impl Registry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DepView for Registry {
    fn dependencies(&self, id: ModuleId) -> Option<Arc<Vec<ModuleId>>> {
        let inner = self.inner.read();
        inner.records.get(&id).map(|record| record.dependencies.clone())
    }
}
