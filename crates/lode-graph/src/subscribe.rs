//! Subscription registration and dispatch.
//!
//! Subscriptions are callbacks against one of three events: "any module
//! initializes", "module `id` initializes", or "an import at path `p`
//! finished". Dispatch happens synchronously inside the loader's require
//! path, so the dispatcher must tolerate reentrancy: callbacks may
//! register new subscriptions, unsubscribe, or trigger further module
//! initializations while a dispatch pass is in flight.
//!
//! Invariants:
//! - "any" listeners fire before exact-id listeners for the same event
//! - within a class, listeners fire in registration order
//! - a listener fires at most once per registration (one-shot entries are
//!   removed from the pending set before their callback runs)

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use rustc_hash::FxHashSet;

use lode::{ModuleId, Value};

/// Callback for initialization events.
///
/// The return value is only consulted for persistent "any" listeners:
/// returning `false` drops the subscription after this event. One-shot
/// listeners are already gone by the time they run, so their return value
/// is ignored.
pub type InitCallback = Box<dyn FnMut(ModuleId, &Value) -> bool + Send>;

/// Callback for import-finished events.
pub type ImportCallback = Box<dyn FnMut(&str) + Send>;

enum Entry {
    Any {
        persistent: bool,
        callback: InitCallback,
    },
    Module {
        id: ModuleId,
        callback: InitCallback,
    },
    Import {
        path: String,
        callback: ImportCallback,
    },
}

#[derive(Default)]
struct DispatchInner {
    next_seq: u64,
    entries: BTreeMap<u64, Entry>,
    /// Entries currently checked out of the map for invocation.
    in_flight: FxHashSet<u64>,
    /// In-flight entries that were unsubscribed mid-dispatch; they must
    /// not be reinserted when their invocation finishes.
    cancelled: FxHashSet<u64>,
}

impl DispatchInner {
    fn register(&mut self, entry: Entry) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(seq, entry);
        seq
    }
}

/// Shared handle to the pending subscription set.
#[derive(Clone, Default)]
pub struct Dispatcher {
    inner: Arc<Mutex<DispatchInner>>,
}

/// Disposable handle returned from subscription registration.
pub struct SubscriptionHandle {
    seq: u64,
    inner: Weak<Mutex<DispatchInner>>,
}

impl SubscriptionHandle {
    /// Remove the subscription. Idempotent; safe to call after the
    /// subscription already fired or from inside a dispatch pass.
    pub fn unsubscribe(&self) {
        if let Some(inner) = self.inner.upgrade() {
            let mut guard = inner.lock();
            if guard.entries.remove(&self.seq).is_none() && guard.in_flight.contains(&self.seq) {
                guard.cancelled.insert(self.seq);
            }
        }
    }

    /// Whether the subscription is still pending (or mid-invocation).
    pub fn is_active(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| {
            let guard = inner.lock();
            guard.entries.contains_key(&self.seq)
                || (guard.in_flight.contains(&self.seq) && !guard.cancelled.contains(&self.seq))
        })
    }
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to every initialization event.
    ///
    /// Non-persistent registrations fire once and are dropped; persistent
    /// ones keep firing until unsubscribed (or their callback returns
    /// `false`).
    pub fn on_any(&self, persistent: bool, callback: InitCallback) -> SubscriptionHandle {
        let seq = self.inner.lock().register(Entry::Any {
            persistent,
            callback,
        });
        self.handle(seq)
    }

    /// Subscribe to the initialization of one specific module.
    pub fn on_module(&self, id: ModuleId, callback: InitCallback) -> SubscriptionHandle {
        let seq = self.inner.lock().register(Entry::Module { id, callback });
        self.handle(seq)
    }

    /// Subscribe to the completion of a dynamic import at `path`.
    pub fn on_import(&self, path: impl Into<String>, callback: ImportCallback) -> SubscriptionHandle {
        let seq = self.inner.lock().register(Entry::Import {
            path: path.into(),
            callback,
        });
        self.handle(seq)
    }

    /// Number of pending subscriptions.
    pub fn pending_count(&self) -> usize {
        let guard = self.inner.lock();
        guard.entries.len() + guard.in_flight.len() - guard.cancelled.len()
    }

    /// Deliver an initialization event.
    ///
    /// Due entries are pulled out of the pending set first, then invoked
    /// without the lock held so callbacks can reregister or require other
    /// modules. Persistent entries are reinserted afterwards unless they
    /// were unsubscribed (or declined) in the meantime.
    pub fn dispatch_init(&self, id: ModuleId, exports: &Value) {
        let due = {
            let mut guard = self.inner.lock();
            let seqs: Vec<u64> = guard
                .entries
                .iter()
                .filter(|(_, entry)| match entry {
                    Entry::Any { .. } => true,
                    Entry::Module { id: wanted, .. } => *wanted == id,
                    Entry::Import { .. } => false,
                })
                .map(|(seq, _)| *seq)
                .collect();

            let mut due: Vec<(u64, Entry)> = seqs
                .into_iter()
                .map(|seq| {
                    guard.in_flight.insert(seq);
                    let entry = guard.entries.remove(&seq).expect("due entry present");
                    (seq, entry)
                })
                .collect();

            // "any" listeners run before exact-id listeners; BTreeMap
            // iteration already gave us registration order within each
            // class, so a stable sort on the class alone preserves it.
            due.sort_by_key(|(_, entry)| matches!(entry, Entry::Module { .. }));
            due
        };

        for (seq, mut entry) in due {
            let keep = match &mut entry {
                Entry::Any {
                    persistent,
                    callback,
                } => {
                    let retain = callback(id, exports);
                    *persistent && retain
                }
                Entry::Module { callback, .. } => {
                    callback(id, exports);
                    false
                }
                Entry::Import { .. } => unreachable!("import entries are never due for init"),
            };

            let mut guard = self.inner.lock();
            guard.in_flight.remove(&seq);
            let was_cancelled = guard.cancelled.remove(&seq);
            if keep && !was_cancelled {
                guard.entries.insert(seq, entry);
            }
        }
    }

    /// Deliver an import-finished event for `path`.
    pub fn dispatch_import(&self, path: &str) {
        let due = {
            let mut guard = self.inner.lock();
            let seqs: Vec<u64> = guard
                .entries
                .iter()
                .filter(|(_, entry)| {
                    matches!(entry, Entry::Import { path: wanted, .. } if wanted == path)
                })
                .map(|(seq, _)| *seq)
                .collect();

            seqs.into_iter()
                .map(|seq| {
                    guard.in_flight.insert(seq);
                    let entry = guard.entries.remove(&seq).expect("due entry present");
                    (seq, entry)
                })
                .collect::<Vec<_>>()
        };

        for (seq, mut entry) in due {
            if let Entry::Import { callback, .. } = &mut entry {
                callback(path);
            }

            let mut guard = self.inner.lock();
            guard.in_flight.remove(&seq);
            guard.cancelled.remove(&seq);
        }
    }

    fn handle(&self, seq: u64) -> SubscriptionHandle {
        SubscriptionHandle {
            seq,
            inner: Arc::downgrade(&self.inner),
        }
    }
}
