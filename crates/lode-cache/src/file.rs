//! On-disk cache shape.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use lode::{MatchKind, ModuleId};

/// Current cache format version.
///
/// Incremented whenever the serialized shape or its meaning changes.
/// Files carrying any other version are discarded wholesale rather than
/// migrated; the cache is purely an accelerator and is cheap to rebuild.
pub const FORMAT_VERSION: u32 = 1;

/// Recorded outcome for one filter key.
///
/// `Matches` holds every module the filter matched along with which
/// export face matched. `NoMatch` records that an exhaustive scan found
/// nothing, so the next session can skip the scan entirely; it is only
/// written when the caller explicitly asked for an exhaustive search,
/// since an early-exit lookup proves nothing about the rest of the
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "Option<FxHashMap<ModuleId, MatchKind>>",
    into = "Option<FxHashMap<ModuleId, MatchKind>>"
)]
pub enum FindEntry {
    Matches(FxHashMap<ModuleId, MatchKind>),
    NoMatch,
}

impl FindEntry {
    pub fn is_no_match(&self) -> bool {
        matches!(self, Self::NoMatch)
    }
}

// On the wire a no-match is `null`, a match set is a plain map.
impl From<Option<FxHashMap<ModuleId, MatchKind>>> for FindEntry {
    fn from(entry: Option<FxHashMap<ModuleId, MatchKind>>) -> Self {
        match entry {
            Some(matches) => Self::Matches(matches),
            None => Self::NoMatch,
        }
    }
}

impl From<FindEntry> for Option<FxHashMap<ModuleId, MatchKind>> {
    fn from(entry: FindEntry) -> Self {
        match entry {
            FindEntry::Matches(matches) => Some(matches),
            FindEntry::NoMatch => None,
        }
    }
}

/// The full persisted cache document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFile {
    /// Format version; see [`FORMAT_VERSION`].
    pub version: u32,

    /// Module ids condemned in a previous session. Seeded into the
    /// registry blacklist at startup so known-bad modules never reach
    /// filter evaluation.
    pub blacklist: Vec<ModuleId>,

    /// Filter outcomes keyed by filter key string.
    pub finds: FxHashMap<String, FindEntry>,
}

impl CacheFile {
    pub fn empty() -> Self {
        Self {
            version: FORMAT_VERSION,
            blacklist: Vec::new(),
            finds: FxHashMap::default(),
        }
    }
}

impl Default for CacheFile {
    fn default() -> Self {
        Self::empty()
    }
}
