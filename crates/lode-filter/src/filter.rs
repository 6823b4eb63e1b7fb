//! The `Filter` type: metadata plus predicate.

use std::fmt;
use std::sync::Arc;

use lode::{MatchKind, Value};

use crate::candidate::Candidate;
use crate::combine::AndState;
use crate::pattern::Pattern;
use crate::scope::Scope;

/// Caller-supplied predicate for `Filter::custom`.
///
/// Receives the candidate plus the export face currently under test
/// (`None` for dependency-only evaluation).
pub type CustomPredicate = Arc<dyn Fn(&Candidate<'_>, Option<&Value>) -> bool + Send + Sync>;

#[derive(Clone)]
pub(crate) enum FilterKind {
    Props(Vec<String>),
    WithoutProps(Vec<String>),
    SingleProp(String),
    DeclaredName(String),
    Deps(Pattern),
    And(AndState),
    Or(Box<Filter>, Box<Filter>),
    Custom(CustomPredicate),
}

/// A pure structural predicate over `(id, exports?)`.
///
/// The key is derived from construction arguments alone - never from
/// runtime behavior - so it identifies the filter across process restarts
/// and is what the result cache is keyed by.
#[derive(Clone)]
pub struct Filter {
    key: Arc<str>,
    needs_exports: bool,
    scope: Scope,
    /// Skip the ES default-export face during interop evaluation.
    skip_default: bool,
    kind: FilterKind,
}

impl Filter {
    /// Exports must carry every one of these property names.
    pub fn by_props<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let key = format!("props({})", names.join(","));
        Self::exports_filter(key, FilterKind::Props(names))
    }

    /// Exports must carry none of these property names.
    pub fn without_props<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let key = format!("without({})", names.join(","));
        Self::exports_filter(key, FilterKind::WithoutProps(names))
    }

    /// Exports must have exactly one own property, with this name.
    pub fn by_single_prop(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = format!("single({name})");
        Self::exports_filter(key, FilterKind::SingleProp(name))
    }

    /// The exported value's declared function/class name must equal this.
    pub fn by_declared_name(name: impl Into<String>) -> Self {
        let name = name.into();
        let key = format!("name({name})");
        Self::exports_filter(key, FilterKind::DeclaredName(name))
    }

    /// The module's declared dependency list must match this pattern.
    pub fn by_dependencies(pattern: Pattern) -> Self {
        let key = format!("deps({pattern})");
        Self {
            key: key.into(),
            needs_exports: false,
            scope: Scope::STRUCTURAL,
            skip_default: false,
            kind: FilterKind::Deps(pattern),
        }
    }

    /// An arbitrary caller predicate.
    ///
    /// The caller owns key uniqueness: two custom filters with the same
    /// `key` are treated as identical by the result cache.
    pub fn custom<F>(key: impl Into<String>, needs_exports: bool, predicate: F) -> Self
    where
        F: Fn(&Candidate<'_>, Option<&Value>) -> bool + Send + Sync + 'static,
    {
        Self {
            key: format!("custom({})", key.into()).into(),
            needs_exports,
            scope: if needs_exports {
                Scope::EXPORTS
            } else {
                Scope::STRUCTURAL
            },
            skip_default: false,
            kind: FilterKind::Custom(Arc::new(predicate)),
        }
    }

    /// Both filters must match.
    ///
    /// When the operands differ in flag, the dependency-only one runs
    /// first and its per-id verdict is memoized against the expensive
    /// operand. The key preserves the caller's operand order.
    pub fn and(self, other: Filter) -> Self {
        let key = format!("and({},{})", self.key, other.key);
        Self {
            key: key.into(),
            needs_exports: self.needs_exports || other.needs_exports,
            scope: self.scope.union(other.scope),
            skip_default: self.skip_default || other.skip_default,
            kind: FilterKind::And(AndState::new(self, other)),
        }
    }

    /// Either filter may match; the cheaper one is consulted first.
    pub fn or(self, other: Filter) -> Self {
        let key = format!("or({},{})", self.key, other.key);
        Self {
            key: key.into(),
            needs_exports: self.needs_exports && other.needs_exports,
            scope: self.scope.union(other.scope),
            skip_default: self.skip_default && other.skip_default,
            kind: FilterKind::Or(Box::new(self), Box::new(other)),
        }
    }

    /// Opt out of ES default-export interop: evaluate against the full
    /// namespace only.
    pub fn raw(mut self) -> Self {
        if !self.skip_default {
            self.key = format!("raw({})", self.key).into();
            self.skip_default = true;
        }
        self
    }

    fn exports_filter(key: String, kind: FilterKind) -> Self {
        Self {
            key: key.into(),
            needs_exports: true,
            scope: Scope::EXPORTS,
            skip_default: false,
            kind,
        }
    }

    /// Deterministic string identity (cache key).
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Whether evaluation requires initialized exports.
    pub fn needs_exports(&self) -> bool {
        self.needs_exports
    }

    /// Registry states worth evaluating this filter against.
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Evaluate against a candidate, honoring ES-module interop.
    ///
    /// When the exports carry the ES marker the default export is tried
    /// first (unless [`raw`](Self::raw)), then the full namespace; the
    /// returned flag says which face matched so the caller can pick the
    /// right value. Absence of a match is `None`, never an error.
    pub fn matches(&self, candidate: &Candidate<'_>) -> Option<MatchKind> {
        if !self.needs_exports {
            return self
                .test(candidate, candidate.exports)
                .then_some(MatchKind::Plain);
        }

        let exports = candidate.exports?;
        if exports.is_es_module() {
            if !self.skip_default {
                if let Some(default) = exports.default_export() {
                    if self.test(candidate, Some(default)) {
                        return Some(MatchKind::Default);
                    }
                }
            }
            self.test(candidate, Some(exports))
                .then_some(MatchKind::Namespace)
        } else {
            self.test(candidate, Some(exports))
                .then_some(MatchKind::Plain)
        }
    }

    /// Raw boolean predicate against one export face.
    pub(crate) fn test(&self, candidate: &Candidate<'_>, value: Option<&Value>) -> bool {
        match &self.kind {
            FilterKind::Props(names) => {
                value.is_some_and(|v| names.iter().all(|name| v.has(name)))
            }
            FilterKind::WithoutProps(names) => {
                value.is_some_and(|v| names.iter().all(|name| !v.has(name)))
            }
            FilterKind::SingleProp(name) => {
                value.is_some_and(|v| v.prop_count() == Some(1) && v.has(name))
            }
            FilterKind::DeclaredName(name) => {
                value.is_some_and(|v| v.declared_name() == Some(name.as_str()))
            }
            FilterKind::Deps(pattern) => pattern.matches(candidate.id, candidate.view),
            FilterKind::And(state) => state.test(candidate, value),
            FilterKind::Or(lhs, rhs) => {
                let (first, second) = if lhs.needs_exports && !rhs.needs_exports {
                    (rhs, lhs)
                } else {
                    (lhs, rhs)
                };
                first.test(candidate, value) || second.test(candidate, value)
            }
            FilterKind::Custom(predicate) => predicate(candidate, value),
        }
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter")
            .field("key", &self.key)
            .field("needs_exports", &self.needs_exports)
            .finish_non_exhaustive()
    }
}
