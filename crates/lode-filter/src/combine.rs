//! Cost-aware AND evaluation with per-id memoization.

use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use lode::{ModuleId, Value};

use crate::candidate::Candidate;
use crate::filter::Filter;

/// Evaluation state for an AND composite.
///
/// `first` is the operand that actually runs first; when the operands
/// differ in flag that is always the dependency-only one, and its verdict
/// is memoized per module id. Dependency lists never change after
/// definition, so the memo can only go stale if a pattern filter is
/// evaluated before the module is defined - and an undefined module never
/// reaches evaluation.
#[derive(Clone)]
pub(crate) struct AndState {
    first: Box<Filter>,
    second: Box<Filter>,
    memo: Option<Arc<Mutex<FxHashMap<ModuleId, bool>>>>,
}

impl AndState {
    /// Order the operands for evaluation. The caller's original order is
    /// preserved in the composite key, not here.
    pub(crate) fn new(lhs: Filter, rhs: Filter) -> Self {
        if lhs.needs_exports() != rhs.needs_exports() {
            let (cheap, costly) = if lhs.needs_exports() {
                (rhs, lhs)
            } else {
                (lhs, rhs)
            };
            Self {
                first: Box::new(cheap),
                second: Box::new(costly),
                memo: Some(Arc::new(Mutex::new(FxHashMap::default()))),
            }
        } else {
            Self {
                first: Box::new(lhs),
                second: Box::new(rhs),
                memo: None,
            }
        }
    }

    pub(crate) fn test(&self, candidate: &Candidate<'_>, value: Option<&Value>) -> bool {
        let first_ok = match &self.memo {
            Some(memo) => *memo
                .lock()
                .entry(candidate.id)
                .or_insert_with(|| self.first.test(candidate, value)),
            None => self.first.test(candidate, value),
        };
        first_ok && self.second.test(candidate, value)
    }
}
