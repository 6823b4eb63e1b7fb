//! Deferred find handles.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::found::Found;

/// Why a deferred find settled without a result.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FindError {
    /// The find's abort signal fired before a match appeared.
    #[error("find aborted before a match: {filter_key}")]
    Aborted { filter_key: String },
}

type ReadyCallback = Box<dyn FnOnce(&Result<Found, FindError>) + Send>;

struct FindState {
    outcome: Option<Result<Found, FindError>>,
    callbacks: Vec<ReadyCallback>,
}

/// Handle to a find that may settle later.
///
/// Settles exactly once, with either the first matching module or an
/// abort error. There is no blocking accessor: the host either polls
/// [`try_get`](Self::try_get) from its own loop or registers an
/// [`on_ready`](Self::on_ready) callback, which runs synchronously
/// inside whatever dispatch settles the handle.
#[derive(Clone)]
pub struct FindHandle {
    state: Arc<Mutex<FindState>>,
}

impl FindHandle {
    pub(crate) fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FindState {
                outcome: None,
                callbacks: Vec::new(),
            })),
        }
    }

    pub(crate) fn settled(outcome: Result<Found, FindError>) -> Self {
        let handle = Self::new();
        handle.settle(outcome);
        handle
    }

    /// The outcome, if the find has settled.
    pub fn try_get(&self) -> Option<Result<Found, FindError>> {
        self.state.lock().outcome.clone()
    }

    pub fn is_settled(&self) -> bool {
        self.state.lock().outcome.is_some()
    }

    /// Run `callback` once the find settles; immediately if it already
    /// has.
    pub fn on_ready(&self, callback: impl FnOnce(&Result<Found, FindError>) + Send + 'static) {
        let outcome = {
            let mut state = self.state.lock();
            match &state.outcome {
                Some(outcome) => outcome.clone(),
                None => {
                    state.callbacks.push(Box::new(callback));
                    return;
                }
            }
        };
        callback(&outcome);
    }

    /// First settle wins; later attempts are dropped. Returns whether
    /// this call was the one that settled the handle.
    pub(crate) fn settle(&self, outcome: Result<Found, FindError>) -> bool {
        let callbacks = {
            let mut state = self.state.lock();
            if state.outcome.is_some() {
                return false;
            }
            state.outcome = Some(outcome.clone());
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks {
            callback(&outcome);
        }
        true
    }
}
