//! Query facade over the loader, filter engine, and result cache.
//!
//! This crate is the public face of lode. The host wires a [`Loader`]
//! (from `lode-graph`) into its bundle, builds [`Filter`]s (from
//! `lode-filter`), and asks a [`Finder`] four questions:
//!
//! - [`lookup`](Finder::lookup): synchronous scan of what is already
//!   initialized; never triggers module initialization
//! - [`lookup_all`](Finder::lookup_all): lazy iterator over every
//!   current match
//! - [`wait`](Finder::wait): callback the first time a future
//!   initialization matches
//! - [`find`](Finder::find): deferred handle that settles on the first
//!   match, abortable through an [`AbortSignal`]
//!
//! Outcomes are written through the result cache so the next session
//! can answer repeat queries without a scan.
//!
//! [`Loader`]: lode_graph::Loader
//! [`Filter`]: lode_filter::Filter

mod abort;
mod find;
mod finder;
mod found;

pub use abort::{AbortController, AbortSignal};
pub use find::{FindError, FindHandle};
pub use finder::{Finder, Matches, WaitHandle};
pub use found::Found;

#[cfg(test)]
mod tests;
