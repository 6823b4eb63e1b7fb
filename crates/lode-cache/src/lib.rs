//! Persistent result cache for lode.
//!
//! Stores filter outcomes and the module blacklist between sessions so
//! the next run can answer repeat lookups without rescanning the
//! registry. The cache is embedder-controlled: the host decides where
//! (or whether) cache data lives by picking a [`CacheBridge`].
//!
//! # Invalidation
//!
//! Entries are keyed by filter key strings, which are pure functions of
//! filter construction arguments. A bundle update shifts module ids, so
//! cached hits are always re-verified against the live registry before
//! being trusted; stale entries are dropped one at a time. A format
//! version mismatch discards the whole file.

pub mod bridge;
mod config;
mod file;
mod handle;

pub use bridge::{CacheBridge, CacheError, FileBridge, MemoryBridge};
pub use config::CacheConfig;
pub use file::{CacheFile, FindEntry, FORMAT_VERSION};
pub use handle::CacheHandle;
