use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::id::ModuleId;

/// Read-only access to declared dependency lists.
///
/// The filter engine walks dependency patterns through this trait so it
/// never depends on a concrete registry; the registry implements it, and
/// tests implement it over a plain map.
pub trait DepView {
    /// The ordered dependency list declared for `id`, if the module is
    /// known. Order is significant - patterns match positionally.
    fn dependencies(&self, id: ModuleId) -> Option<Arc<Vec<ModuleId>>>;
}

impl DepView for FxHashMap<ModuleId, Arc<Vec<ModuleId>>> {
    fn dependencies(&self, id: ModuleId) -> Option<Arc<Vec<ModuleId>>> {
        self.get(&id).cloned()
    }
}

impl DepView for FxHashMap<ModuleId, Vec<ModuleId>> {
    fn dependencies(&self, id: ModuleId) -> Option<Arc<Vec<ModuleId>>> {
        self.get(&id).map(|deps| Arc::new(deps.clone()))
    }
}

impl<V: DepView + ?Sized> DepView for &V {
    fn dependencies(&self, id: ModuleId) -> Option<Arc<Vec<ModuleId>>> {
        (**self).dependencies(id)
    }
}
