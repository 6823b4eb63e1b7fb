use std::sync::Arc;

use lode::{ModuleId, ModuleState, Value};

/// Per-module bookkeeping held by the registry.
///
/// Records are created the first time the loader shim sees an id and are
/// never destroyed; they live for the process even when blacklisted. The
/// dependency list is behind `Arc` so handing it to the pattern matcher is
/// a pointer copy.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub id: ModuleId,
    /// Ordered dependency ids as declared at definition time.
    pub dependencies: Arc<Vec<ModuleId>>,
    pub state: ModuleState,
    /// Set once the factory has run. Kept even for blacklisted modules so
    /// the bundle itself can still require them; filter-facing queries
    /// never surface it in that case.
    pub exports: Option<Value>,
}

impl ModuleRecord {
    pub(crate) fn new(id: ModuleId, dependencies: Vec<ModuleId>) -> Self {
        Self {
            id,
            dependencies: Arc::new(dependencies),
            state: ModuleState::Uninitialized,
            exports: None,
        }
    }
}
