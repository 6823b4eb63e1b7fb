//! # lode
//!
//! Lode foundation crate - shared primitives for structural module discovery.
//!
//! This crate holds the types every other lode crate agrees on: module
//! identities, the lifecycle state machine, the export value model, match
//! result flags, and the dependency-view trait that lets the filter engine
//! walk a graph without depending on a concrete registry.
//!
//! ## Overview
//!
//! A bundled application is a flat set of modules addressed by opaque
//! integer ids. Lode never sees source code or names - only each module's
//! declared dependency list and, once its factory has run, the shape of its
//! exported value. The types here make that observable surface explicit:
//!
//! - [`ModuleId`]: strongly-typed integer identity with checked relative
//!   offset arithmetic (absolute ids shift between builds, relative
//!   structure tends not to)
//! - [`ModuleState`]: the monotonic lifecycle a module moves through
//! - [`Value`]: an explicit enum standing in for a module's exports,
//!   including the "unresolved proxy" case as a first-class variant
//! - [`MatchKind`]: which face of an ES module a filter matched
//! - [`DepView`]: read-only access to dependency lists

pub mod error;
pub mod id;
pub mod match_kind;
pub mod state;
pub mod value;
pub mod view;

pub use error::{Error, Result};
pub use id::ModuleId;
pub use match_kind::MatchKind;
pub use state::ModuleState;
pub use value::{FunctionValue, ObjectBuilder, ObjectValue, Value};
pub use view::DepView;
