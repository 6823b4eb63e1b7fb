//! The `Finder`: lookup, wait, and deferred find over a live registry.

use std::sync::Arc;

use tracing::{debug, trace};

use lode::{MatchKind, ModuleId, ModuleState, Value};
use lode_cache::{CacheHandle, FindEntry};
use lode_filter::{Candidate, Filter};
use lode_graph::{Dispatcher, Loader, Registry, SubscriptionHandle};

use crate::abort::AbortSignal;
use crate::find::{FindError, FindHandle};
use crate::found::Found;

/// The query facade.
///
/// Owns the loader and shares its registry and dispatcher. Construction
/// wires the result cache in both directions: the persisted blacklist
/// seeds the registry, and every fresh condemnation flows back into the
/// cache.
pub struct Finder {
    loader: Arc<Loader>,
    registry: Registry,
    dispatcher: Dispatcher,
    cache: CacheHandle,
}

/// Handle returned from [`Finder::wait`].
pub struct WaitHandle {
    sub: SubscriptionHandle,
}

impl WaitHandle {
    /// Cancel the wait if it is still pending. Idempotent.
    pub fn unsubscribe(&self) {
        self.sub.unsubscribe();
    }

    /// Whether the wait is still pending.
    pub fn is_active(&self) -> bool {
        self.sub.is_active()
    }
}

/// Lazy iterator over every current match of a filter.
///
/// Walks a snapshot of candidate ids taken when the iterator was
/// created; modules initialized afterwards are not visited. Matches are
/// recorded to the cache as they are yielded.
pub struct Matches<'a> {
    finder: &'a Finder,
    filter: &'a Filter,
    ids: std::vec::IntoIter<ModuleId>,
}

impl Iterator for Matches<'_> {
    type Item = Found;

    fn next(&mut self) -> Option<Found> {
        for id in self.ids.by_ref() {
            if let Some((kind, exports)) = self.finder.evaluate(self.filter, id) {
                self.finder
                    .cache
                    .record_match(self.filter.key(), id, kind);
                return Some(Found::resolve(id, kind, &exports));
            }
        }
        None
    }
}

impl Finder {
    /// Wire a finder over `loader`, seeding and feeding `cache`.
    pub fn new(loader: Loader, cache: CacheHandle) -> Self {
        let registry = loader.registry();
        let dispatcher = loader.dispatcher();

        let seeded = cache.seeded_blacklist();
        if !seeded.is_empty() {
            debug!(count = seeded.len(), "seeding blacklist from cache");
            registry.seed_blacklist(seeded);
        }
        let sink = cache.clone();
        loader.set_blacklist_sink(move |id| sink.note_blacklist(id));

        Self {
            loader: Arc::new(loader),
            registry,
            dispatcher,
            cache,
        }
    }

    /// A finder with no persistence at all.
    pub fn without_cache(loader: Loader) -> Self {
        Self::new(loader, CacheHandle::disabled())
    }

    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Synchronously find the first module matching `filter`.
    ///
    /// Consults the cache first; cached hits are re-verified against
    /// the live registry before being trusted, and stale entries are
    /// dropped as they are discovered. Falls back to an ascending-id
    /// scan of initialized modules. Never initializes anything: a
    /// module whose factory has not run is invisible here, even to
    /// dependency-only filters - use [`wait`](Self::wait) to catch it.
    pub fn lookup(&self, filter: &Filter) -> Option<Found> {
        match self.cache.lookup_entry(filter.key()) {
            Some(FindEntry::NoMatch) => {
                trace!(key = filter.key(), "cached exhaustive no-match");
                return None;
            }
            Some(FindEntry::Matches(matches)) => {
                let mut cached: Vec<ModuleId> = matches.keys().copied().collect();
                cached.sort_unstable();
                for id in cached {
                    match self.evaluate(filter, id) {
                        Some((kind, exports)) => {
                            trace!(key = filter.key(), module = %id, "cache hit verified");
                            if matches.get(&id) != Some(&kind) {
                                self.cache.record_match(filter.key(), id, kind);
                            }
                            return Some(Found::resolve(id, kind, &exports));
                        }
                        None => {
                            // A defined-but-uninitialized module is not
                            // stale, just not visible yet this session.
                            let stale = match self.registry.state(id) {
                                Some(ModuleState::Initialized) | None => true,
                                Some(_) => self.registry.is_blacklisted(id),
                            };
                            if stale {
                                debug!(key = filter.key(), module = %id, "dropping stale cache entry");
                                self.cache.remove_match(filter.key(), id);
                            }
                        }
                    }
                }
            }
            None => {}
        }

        let hit = self.registry.initialized_ids().into_iter().find_map(|id| {
            self.evaluate(filter, id)
                .map(|(kind, exports)| (id, kind, exports))
        });
        hit.map(|(id, kind, exports)| {
            self.cache.record_match(filter.key(), id, kind);
            Found::resolve(id, kind, &exports)
        })
    }

    /// Every current match of `filter`, lazily.
    pub fn lookup_all<'a>(&'a self, filter: &'a Filter) -> Matches<'a> {
        Matches {
            finder: self,
            filter,
            ids: self.registry.initialized_ids().into_iter(),
        }
    }

    /// Collect every current match, recording a proven no-match when
    /// the full scan comes up empty.
    ///
    /// This is the only path that writes a negative cache entry, since
    /// only a completed scan proves the filter matches nothing.
    pub fn lookup_exhaustive(&self, filter: &Filter) -> Vec<Found> {
        let found: Vec<Found> = self.lookup_all(filter).collect();
        if found.is_empty() {
            self.cache.record_no_match(filter.key());
        }
        found
    }

    /// Invoke `callback` the first time a future initialization
    /// matches `filter`.
    ///
    /// Modules that initialized before registration are invisible here;
    /// callers who also want the present must [`lookup`](Self::lookup)
    /// first. The filter is evaluated against each initialization as it
    /// happens; the callback runs at most once and the subscription
    /// removes itself after firing.
    pub fn wait<F>(&self, filter: Filter, callback: F) -> WaitHandle
    where
        F: FnOnce(Found) + Send + 'static,
    {
        let registry = self.registry.clone();
        let cache = self.cache.clone();
        let mut callback = Some(callback);
        let sub = self.dispatcher.on_any(
            true,
            Box::new(move |id, exports| {
                let candidate = Candidate::new(id, &registry, Some(exports));
                match filter.matches(&candidate) {
                    Some(kind) => {
                        cache.record_match(filter.key(), id, kind);
                        if let Some(callback) = callback.take() {
                            callback(Found::resolve(id, kind, exports));
                        }
                        false
                    }
                    None => true,
                }
            }),
        );
        WaitHandle { sub }
    }

    /// Deferred find: a handle that settles with the first match.
    pub fn find(&self, filter: Filter) -> FindHandle {
        self.find_abortable(filter, None)
    }

    /// Deferred find that can be cancelled through `signal`.
    ///
    /// Aborting settles the handle with [`FindError::Aborted`] and
    /// removes the underlying subscription, leaving nothing behind. An
    /// already-aborted signal settles the handle before any lookup.
    pub fn find_abortable(&self, filter: Filter, signal: Option<AbortSignal>) -> FindHandle {
        let key = filter.key().to_owned();

        if let Some(signal) = &signal {
            if signal.is_aborted() {
                return FindHandle::settled(Err(FindError::Aborted { filter_key: key }));
            }
        }

        if let Some(found) = self.lookup(&filter) {
            return FindHandle::settled(Ok(found));
        }

        let handle = FindHandle::new();
        let registry = self.registry.clone();
        let cache = self.cache.clone();
        let settled = handle.clone();
        let sub = self.dispatcher.on_any(
            true,
            Box::new(move |id, exports| {
                if settled.is_settled() {
                    return false;
                }
                let candidate = Candidate::new(id, &registry, Some(exports));
                match filter.matches(&candidate) {
                    Some(kind) => {
                        cache.record_match(filter.key(), id, kind);
                        settled.settle(Ok(Found::resolve(id, kind, exports)));
                        false
                    }
                    None => true,
                }
            }),
        );

        if let Some(signal) = signal {
            let settled = handle.clone();
            signal.on_abort(move || {
                sub.unsubscribe();
                settled.settle(Err(FindError::Aborted { filter_key: key }));
            });
        }
        handle
    }

    /// Give the cache a chance to persist. Call from an idle loop.
    pub fn tick(&self) -> bool {
        self.cache.tick()
    }

    /// Persist the cache immediately. Call at shutdown.
    pub fn flush_cache(&self) {
        self.cache.flush()
    }

    /// Evaluate `filter` against the current registry state of `id`.
    ///
    /// Only `Initialized`, non-blacklisted modules are eligible - a
    /// cached id whose factory has not run this session must read as
    /// not-yet-found, never as a match with an undefined value.
    fn evaluate(&self, filter: &Filter, id: ModuleId) -> Option<(MatchKind, Value)> {
        if self.registry.is_blacklisted(id) {
            return None;
        }
        if self.registry.state(id) != Some(ModuleState::Initialized) {
            return None;
        }
        let exports = self.registry.exports_for_matching(id);
        if filter.needs_exports() && exports.is_none() {
            return None;
        }
        let candidate = Candidate::new(id, &self.registry, exports.as_ref());
        let kind = filter.matches(&candidate)?;
        Some((kind, exports.unwrap_or_default()))
    }
}
