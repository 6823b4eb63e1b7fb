//! Query methods for Registry.

use lode::{ModuleId, ModuleState, Value};

use super::Registry;
use crate::record::ModuleRecord;

impl Registry {
    /// Retrieve a module record by id.
    ///
    /// Returns an owned copy; the dependency list inside is Arc-shared so
    /// the clone is inexpensive.
    pub fn record(&self, id: ModuleId) -> Option<ModuleRecord> {
        let inner = self.inner.read();
        inner.records.get(&id).cloned()
    }

    /// Current lifecycle state of a module.
    pub fn state(&self, id: ModuleId) -> Option<ModuleState> {
        let inner = self.inner.read();
        inner.records.get(&id).map(|record| record.state)
    }

    /// Whether an id has ever been defined.
    pub fn contains(&self, id: ModuleId) -> bool {
        let inner = self.inner.read();
        inner.records.contains_key(&id)
    }

    /// Snapshot of initialized, non-blacklisted ids in ascending order.
    ///
    /// This is the scan set for synchronous lookups; sorting keeps scans
    /// deterministic across runs with the same graph.
    pub fn initialized_ids(&self) -> Vec<ModuleId> {
        let inner = self.inner.read();
        let mut ids: Vec<ModuleId> = inner
            .records
            .values()
            .filter(|record| {
                record.state == ModuleState::Initialized
                    && !inner.blacklist.contains(&record.id)
            })
            .map(|record| record.id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Exports as visible to the filter engine.
    ///
    /// `None` unless the module reached `Initialized` and is not
    /// blacklisted - a condemned module's value is never exposed to
    /// filters again.
    pub fn exports_for_matching(&self, id: ModuleId) -> Option<Value> {
        let inner = self.inner.read();
        if inner.blacklist.contains(&id) {
            return None;
        }
        inner
            .records
            .get(&id)
            .filter(|record| record.state == ModuleState::Initialized)
            .and_then(|record| record.exports.clone())
    }

    /// Exports regardless of blacklisting (loader-internal; the bundle
    /// still needs the value when it requires a condemned module).
    pub(crate) fn raw_exports(&self, id: ModuleId) -> Option<Value> {
        let inner = self.inner.read();
        inner.records.get(&id).and_then(|record| record.exports.clone())
    }

    /// Whether an id is excluded from matching and dispatch.
    pub fn is_blacklisted(&self, id: ModuleId) -> bool {
        let inner = self.inner.read();
        inner.blacklist.contains(&id)
    }

    /// Snapshot of blacklisted ids in ascending order (persisted by the
    /// result cache).
    pub fn blacklisted_ids(&self) -> Vec<ModuleId> {
        let inner = self.inner.read();
        let mut ids: Vec<ModuleId> = inner.blacklist.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Total number of known module records.
    pub fn len(&self) -> usize {
        let inner = self.inner.read();
        inner.records.len()
    }

    /// Whether no module has been defined yet.
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.read();
        inner.records.is_empty()
    }
}
