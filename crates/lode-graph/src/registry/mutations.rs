//! Mutation methods for Registry.

use lode::{Error, ModuleId, ModuleState, Result, Value};

use super::Registry;
use crate::record::ModuleRecord;

impl Registry {
    /// Record a module definition's dependency list.
    ///
    /// Returns `true` if this was the first definition for the id. A
    /// repeated definition keeps the original record untouched - the
    /// loader warns and discards the duplicate factory.
    pub fn note_defined(&self, id: ModuleId, dependencies: Vec<ModuleId>) -> bool {
        let mut inner = self.inner.write();
        if inner.records.contains_key(&id) {
            return false;
        }
        inner.records.insert(id, ModuleRecord::new(id, dependencies));
        true
    }

    /// Mark a module as entering its factory.
    pub fn begin_init(&self, id: ModuleId) -> Result<()> {
        self.transition(id, ModuleState::Initializing, |_| {})
    }

    /// Mark a module as initialized with its produced exports.
    pub fn finish_init(&self, id: ModuleId, exports: Value) -> Result<()> {
        self.transition(id, ModuleState::Initialized, |record| {
            record.exports = Some(exports);
        })
    }

    /// Permanently condemn a module whose exports were unusable.
    ///
    /// The exports (when the factory did run) are retained so the bundle
    /// can still require the module; they are invisible to filters.
    pub fn blacklist(&self, id: ModuleId, exports: Option<Value>) -> Result<()> {
        self.transition(id, ModuleState::Blacklisted, |record| {
            record.exports = exports;
        })?;
        self.inner.write().blacklist.insert(id);
        Ok(())
    }

    /// Exclude ids recorded by a previous run without touching lifecycle.
    ///
    /// Seeded modules still initialize normally when the bundle requires
    /// them; they are simply never matched or dispatched.
    pub fn seed_blacklist<I>(&self, ids: I)
    where
        I: IntoIterator<Item = ModuleId>,
    {
        let mut inner = self.inner.write();
        inner.blacklist.extend(ids);
    }

    fn transition<F>(&self, id: ModuleId, to: ModuleState, apply: F) -> Result<()>
    where
        F: FnOnce(&mut ModuleRecord),
    {
        let mut inner = self.inner.write();
        let record = inner
            .records
            .get_mut(&id)
            .ok_or(Error::UnknownModule(id))?;

        if !record.state.can_transition_to(to) {
            return Err(Error::InvalidTransition {
                id,
                from: record.state,
                to,
            });
        }

        record.state = to;
        apply(record);
        Ok(())
    }
}
