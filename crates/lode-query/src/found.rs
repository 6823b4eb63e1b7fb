//! Lookup results.

use lode::{MatchKind, ModuleId, Value};

/// A module that satisfied a filter.
///
/// `value` is the thing the filter actually matched: for a
/// [`MatchKind::Default`] hit that is the default export itself, not
/// the surrounding ES namespace, so callers can use it directly.
#[derive(Debug, Clone)]
pub struct Found {
    pub id: ModuleId,
    pub kind: MatchKind,
    pub value: Value,
}

impl Found {
    pub(crate) fn resolve(id: ModuleId, kind: MatchKind, exports: &Value) -> Self {
        let value = match kind {
            MatchKind::Default => exports
                .default_export()
                .cloned()
                .unwrap_or_else(|| exports.clone()),
            MatchKind::Plain | MatchKind::Namespace => exports.clone(),
        };
        Self { id, kind, value }
    }
}
