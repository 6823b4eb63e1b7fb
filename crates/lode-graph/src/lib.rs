//! # lode-graph
//!
//! Module registry, loader shim, and subscription dispatch.
//!
//! This crate is the stateful half of lode. The [`Loader`] replaces a
//! bundler's module-define entry point: every definition's dependency list
//! is recorded in the [`Registry`] before the factory can run, and every
//! factory call is wrapped so the produced exports are classified before
//! anything else observes them. Usable exports move the module to
//! `Initialized` and fire pending subscriptions synchronously; unusable
//! ones (nullish, primitive, opaque proxy, empty object, sentinel root)
//! blacklist the module for the rest of the run.
//!
//! The registry is pure bookkeeping - it never evaluates filters. The
//! [`Dispatcher`] owns subscription ordering: "any module" listeners fire
//! before exact-id listeners for the same event, each class in
//! registration order, and one-shot listeners leave the pending set before
//! their callback runs so reentrant registration cannot double-fire them.

pub mod loader;
pub mod record;
pub mod registry;
pub mod subscribe;

pub use loader::{Loader, ModuleContext, ModuleFactory};
pub use record::ModuleRecord;
pub use registry::Registry;
pub use subscribe::{Dispatcher, SubscriptionHandle};

#[cfg(test)]
mod tests;
