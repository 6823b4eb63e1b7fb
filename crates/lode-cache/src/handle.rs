//! Shared handle over the loaded cache document.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, info, warn};

use lode::{MatchKind, ModuleId};

use crate::bridge::CacheBridge;
use crate::config::CacheConfig;
use crate::file::{CacheFile, FindEntry, FORMAT_VERSION};

struct HandleInner {
    bridge: Box<dyn CacheBridge>,
    file: CacheFile,
    config: CacheConfig,
    /// When the first unflushed mutation happened. Anchored to the
    /// first mutation rather than the latest so a steady stream of
    /// recordings still flushes once per debounce window.
    dirty_since: Option<Instant>,
}

/// Cheaply cloneable handle over the in-memory cache document.
///
/// The document is loaded once at construction. Mutations mark the
/// handle dirty; persistence is cooperative - the host calls
/// [`tick`](CacheHandle::tick) from its idle loop (or
/// [`flush`](CacheHandle::flush) at shutdown) and the handle writes
/// through its bridge when the debounce window has passed. There is no
/// background thread.
#[derive(Clone)]
pub struct CacheHandle {
    inner: Arc<Mutex<HandleInner>>,
}

impl CacheHandle {
    /// Load the document through `bridge`.
    ///
    /// A missing document, an unreadable document, or a version
    /// mismatch all start from an empty cache; none of them is an
    /// error for the caller.
    pub fn new(bridge: Box<dyn CacheBridge>, config: CacheConfig) -> Self {
        let file = if config.enabled {
            match bridge.read() {
                Ok(Some(file)) if file.version == FORMAT_VERSION => {
                    debug!(
                        finds = file.finds.len(),
                        blacklisted = file.blacklist.len(),
                        "cache loaded"
                    );
                    file
                }
                Ok(Some(file)) => {
                    info!(
                        found = file.version,
                        expected = FORMAT_VERSION,
                        "cache format version mismatch; starting fresh"
                    );
                    CacheFile::empty()
                }
                Ok(None) => CacheFile::empty(),
                Err(e) => {
                    warn!(error = %e, "cache unreadable; starting fresh");
                    CacheFile::empty()
                }
            }
        } else {
            CacheFile::empty()
        };

        Self {
            inner: Arc::new(Mutex::new(HandleInner {
                bridge,
                file,
                config,
                dirty_since: None,
            })),
        }
    }

    /// A handle that never reads or writes anything.
    pub fn disabled() -> Self {
        Self::new(
            Box::new(crate::bridge::MemoryBridge::new()),
            CacheConfig::new().with_enabled(false),
        )
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.lock().config.enabled
    }

    /// The recorded outcome for a filter key, if any.
    pub fn lookup_entry(&self, key: &str) -> Option<FindEntry> {
        let inner = self.inner.lock();
        if !inner.config.enabled {
            return None;
        }
        inner.file.finds.get(key).cloned()
    }

    /// Record that `id` matched the filter identified by `key`.
    pub fn record_match(&self, key: &str, id: ModuleId, kind: MatchKind) {
        self.mutate(|file| {
            let entry = file
                .finds
                .entry(key.to_owned())
                .or_insert_with(|| FindEntry::Matches(FxHashMap::default()));
            // An exhaustive no-match is superseded by an actual match.
            if entry.is_no_match() {
                *entry = FindEntry::Matches(FxHashMap::default());
            }
            if let FindEntry::Matches(matches) = entry {
                matches.insert(id, kind);
            }
            true
        });
    }

    /// Record that an exhaustive scan for `key` matched nothing.
    ///
    /// Only meaningful after a full registry scan; an early-exit lookup
    /// that found nothing must not call this.
    pub fn record_no_match(&self, key: &str) {
        self.mutate(|file| {
            file.finds.insert(key.to_owned(), FindEntry::NoMatch);
            true
        });
    }

    /// Drop one stale id from a key's match set. Removes the whole
    /// entry when the set empties, so the key reads as unknown rather
    /// than as a proven no-match.
    pub fn remove_match(&self, key: &str, id: ModuleId) {
        self.mutate(|file| {
            let Some(FindEntry::Matches(matches)) = file.finds.get_mut(key) else {
                return false;
            };
            if matches.remove(&id).is_none() {
                return false;
            }
            if matches.is_empty() {
                file.finds.remove(key);
            }
            true
        });
    }

    /// Drop everything recorded for a filter key.
    pub fn forget(&self, key: &str) {
        self.mutate(|file| file.finds.remove(key).is_some());
    }

    /// Add a module to the persisted blacklist.
    pub fn note_blacklist(&self, id: ModuleId) {
        self.mutate(|file| {
            if file.blacklist.contains(&id) {
                false
            } else {
                file.blacklist.push(id);
                true
            }
        });
    }

    /// Blacklist carried over from previous sessions, for seeding the
    /// registry at startup.
    pub fn seeded_blacklist(&self) -> Vec<ModuleId> {
        let inner = self.inner.lock();
        if !inner.config.enabled {
            return Vec::new();
        }
        inner.file.blacklist.clone()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.lock().dirty_since.is_some()
    }

    /// Write through the bridge if the debounce window has elapsed.
    /// Returns whether a write happened.
    pub fn tick(&self) -> bool {
        let mut inner = self.inner.lock();
        match inner.dirty_since {
            Some(since) if since.elapsed() >= inner.config.debounce => {
                Self::write_locked(&mut inner);
                true
            }
            _ => false,
        }
    }

    /// Write immediately if dirty, ignoring the debounce window.
    pub fn flush(&self) {
        let mut inner = self.inner.lock();
        if inner.dirty_since.is_some() {
            Self::write_locked(&mut inner);
        }
    }

    fn mutate(&self, op: impl FnOnce(&mut CacheFile) -> bool) {
        let mut inner = self.inner.lock();
        if !inner.config.enabled {
            return;
        }
        if op(&mut inner.file) && inner.dirty_since.is_none() {
            inner.dirty_since = Some(Instant::now());
        }
    }

    fn write_locked(inner: &mut HandleInner) {
        // A failed write is not retried until the next mutation; the
        // cache is an accelerator, not a source of truth.
        if let Err(e) = inner.bridge.write(&inner.file) {
            warn!(error = %e, "cache write failed");
        }
        inner.dirty_since = None;
    }
}
