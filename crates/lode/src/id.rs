use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical identifier for a module in a bundled graph.
///
/// Bundlers address modules by opaque non-negative integers. The newtype
/// keeps those ids from mixing with ordinary counters and gives relative
/// addressing a single, checked implementation: dependency patterns express
/// expected ids as signed offsets from an anchor id so a fingerprint
/// survives renumbering between builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(u32);

impl ModuleId {
    /// Create a module identifier from its raw bundler-assigned number.
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// The raw integer the bundler uses for this module.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Resolve a signed offset against this id.
    ///
    /// Returns `None` when the offset leaves the id space (negative or
    /// overflowing), which a well-formed pattern never does.
    pub fn checked_offset(self, offset: i32) -> Option<ModuleId> {
        if offset >= 0 {
            self.0.checked_add(offset as u32).map(ModuleId)
        } else {
            self.0.checked_sub(offset.unsigned_abs()).map(ModuleId)
        }
    }
}

impl From<u32> for ModuleId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
