//! Sparse, ordered dependency patterns.
//!
//! A pattern is compared positionally against a module's declared
//! dependency list. Slots may pin an exact id, accept anything, resolve a
//! signed offset from either the current recursion parent or the original
//! root of the comparison, or recurse into the dependency's own list.
//! Relative and nested slots are what let a fingerprint say "the
//! dependency two modules after the one being matched, whose own third
//! dependency is exactly module 2" without hard-coding absolute ids.

use std::fmt;

use tracing::warn;

use lode::{DepView, ModuleId};

/// One position in a dependency pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// The dependency at this position must be exactly this id.
    Exact(ModuleId),
    /// Any id matches; the position only has to exist.
    Any,
    /// The dependency must equal an anchor id plus a signed offset. The
    /// anchor is the comparison's original root id when `from_root`,
    /// otherwise the id whose list is being walked at this recursion
    /// level.
    Relative { offset: i32, from_root: bool },
    /// Recurse into this dependency's own list; it becomes the new
    /// parent while the root is preserved.
    Nested(Pattern),
}

impl Slot {
    pub fn exact(raw: u32) -> Self {
        Self::Exact(ModuleId::new(raw))
    }

    pub fn any() -> Self {
        Self::Any
    }

    /// Offset from the id being matched at this recursion level.
    pub fn parent_offset(offset: i32) -> Self {
        Self::Relative {
            offset,
            from_root: false,
        }
    }

    /// Offset from the id the whole comparison started from.
    pub fn root_offset(offset: i32) -> Self {
        Self::Relative {
            offset,
            from_root: true,
        }
    }

    pub fn nested(pattern: Pattern) -> Self {
        Self::Nested(pattern)
    }
}

/// An ordered template over a module's dependency list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    slots: Vec<Slot>,
    loose: bool,
}

impl Pattern {
    /// A pattern requiring the dependency list to have exactly this
    /// length.
    pub fn new(slots: impl IntoIterator<Item = Slot>) -> Self {
        Self {
            slots: slots.into_iter().collect(),
            loose: false,
        }
    }

    /// Relax the length requirement to "at least this long". Slot order
    /// stays significant.
    pub fn loose(mut self) -> Self {
        self.loose = true;
        self
    }

    pub fn is_loose(&self) -> bool {
        self.loose
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Match the pattern against `root`'s dependency list.
    pub fn matches(&self, root: ModuleId, view: &dyn DepView) -> bool {
        self.matches_at(root, root, view)
    }

    fn matches_at(&self, root: ModuleId, parent: ModuleId, view: &dyn DepView) -> bool {
        let Some(deps) = view.dependencies(parent) else {
            return false;
        };

        let long_enough = if self.loose {
            deps.len() >= self.slots.len()
        } else {
            deps.len() == self.slots.len()
        };
        if !long_enough {
            return false;
        }

        self.slots
            .iter()
            .zip(deps.iter())
            .all(|(slot, dep)| match slot {
                Slot::Exact(id) => dep == id,
                Slot::Any => true,
                Slot::Relative { offset, from_root } => {
                    if *offset == 0 {
                        // Offset zero is the leftover sentinel from the
                        // packed encoding; authors almost certainly meant
                        // an exact or wildcard slot. Non-fatal.
                        warn!(
                            pattern = %self,
                            parent = %parent,
                            "relative slot with zero offset; check pattern"
                        );
                    }
                    let anchor = if *from_root { root } else { parent };
                    match anchor.checked_offset(*offset) {
                        Some(expected) => *dep == expected,
                        None => {
                            warn!(
                                pattern = %self,
                                anchor = %anchor,
                                offset,
                                "relative slot resolves outside the id space"
                            );
                            false
                        }
                    }
                }
                Slot::Nested(pattern) => pattern.matches_at(root, *dep, view),
            })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(id) => write!(f, "{id}"),
            Self::Any => f.write_str("*"),
            Self::Relative { offset, from_root } => {
                let anchor = if *from_root { '^' } else { '~' };
                write!(f, "{anchor}{offset:+}")
            }
            Self::Nested(pattern) => write!(f, "[{pattern}]"),
        }
    }
}

impl fmt::Display for Pattern {
    /// Canonical rendering used in filter keys; two patterns render the
    /// same iff they were constructed from the same arguments.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, slot) in self.slots.iter().enumerate() {
            if index > 0 {
                f.write_str(",")?;
            }
            write!(f, "{slot}")?;
        }
        if self.loose {
            if !self.slots.is_empty() {
                f.write_str(",")?;
            }
            f.write_str("..")?;
        }
        Ok(())
    }
}
