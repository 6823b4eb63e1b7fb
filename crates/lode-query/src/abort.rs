//! Cooperative cancellation for deferred finds.
//!
//! Mirrors the controller/signal split: the side that may cancel holds
//! the [`AbortController`], the side doing the work holds (clones of)
//! the [`AbortSignal`]. Abort is sticky and idempotent; listeners added
//! after the fact run immediately.

use std::sync::Arc;

use parking_lot::Mutex;

type AbortListener = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct SignalInner {
    aborted: bool,
    listeners: Vec<AbortListener>,
}

/// The cancelling side.
#[derive(Default)]
pub struct AbortController {
    inner: Arc<Mutex<SignalInner>>,
}

/// The observing side. Cheap to clone; all clones see the same state.
#[derive(Clone, Default)]
pub struct AbortSignal {
    inner: Arc<Mutex<SignalInner>>,
}

impl AbortController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn signal(&self) -> AbortSignal {
        AbortSignal {
            inner: self.inner.clone(),
        }
    }

    /// Flip the signal and run every pending listener. Subsequent calls
    /// do nothing.
    pub fn abort(&self) {
        let listeners = {
            let mut inner = self.inner.lock();
            if inner.aborted {
                return;
            }
            inner.aborted = true;
            std::mem::take(&mut inner.listeners)
        };
        // Invoked outside the lock; a listener may inspect the signal.
        for listener in listeners {
            listener();
        }
    }
}

impl AbortSignal {
    pub fn is_aborted(&self) -> bool {
        self.inner.lock().aborted
    }

    /// Run `listener` when the signal aborts. If it already has, the
    /// listener runs before this returns.
    pub fn on_abort(&self, listener: impl FnOnce() + Send + 'static) {
        {
            let mut inner = self.inner.lock();
            if !inner.aborted {
                inner.listeners.push(Box::new(listener));
                return;
            }
        }
        listener();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_abort_flips_all_signal_clones() {
        let controller = AbortController::new();
        let a = controller.signal();
        let b = a.clone();

        assert!(!a.is_aborted());
        controller.abort();
        assert!(a.is_aborted());
        assert!(b.is_aborted());
    }

    #[test]
    fn test_listeners_run_once_on_abort() {
        let controller = AbortController::new();
        let signal = controller.signal();
        let runs = Arc::new(AtomicUsize::new(0));

        let counter = runs.clone();
        signal.on_abort(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        controller.abort();
        controller.abort();
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_listener_runs_immediately() {
        let controller = AbortController::new();
        let signal = controller.signal();
        controller.abort();

        let ran = Arc::new(AtomicUsize::new(0));
        let counter = ran.clone();
        signal.on_abort(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(ran.load(Ordering::SeqCst), 1);
    }
}
