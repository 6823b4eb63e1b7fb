//! # lode-filter
//!
//! The filter engine: a small combinator language for structural
//! predicates over `(id, exports?)` pairs.
//!
//! A [`Filter`] is a pure predicate with three pieces of metadata derived
//! entirely from its construction arguments:
//!
//! - a **key**: deterministic string identity, used for cache lookups and
//!   equality across process restarts
//! - a **flag** (`needs_exports`): whether evaluation requires initialized
//!   exports or can run on dependency data alone
//! - a **scope**: which registry lifecycle states the filter is worth
//!   evaluating against
//!
//! Composites (`and`/`or`) derive their metadata from their operands and
//! evaluate the cheaper (dependency-only) operand first; `and`
//! additionally memoizes the cheap operand's verdict per module id so
//! repeated evaluation across initialization events never re-walks
//! dependency lists.
//!
//! Dependency patterns ([`Pattern`]) are sparse, ordered templates over a
//! module's dependency list, with exact, wildcard, relative (parent- or
//! root-anchored), and nested slots. Relative slots are what make a
//! fingerprint survive renumbering between builds: absolute ids shift,
//! the offsets among cooperating modules rarely do.

pub mod candidate;
mod combine;
pub mod filter;
pub mod pattern;
pub mod scope;

pub use candidate::Candidate;
pub use filter::{CustomPredicate, Filter};
pub use pattern::{Pattern, Slot};
pub use scope::Scope;

#[cfg(test)]
mod tests;
