//! Dispatcher ordering and reentrancy tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use lode::{ModuleId, Value};

use crate::subscribe::Dispatcher;

fn id(raw: u32) -> ModuleId {
    ModuleId::new(raw)
}

fn sample_exports() -> Value {
    Value::object().prop("x", Value::Null).build()
}

#[test]
fn test_any_fires_before_specific_id() {
    let dispatcher = Dispatcher::new();
    let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

    // Register the specific-id listener first; "any" must still win.
    let log = order.clone();
    dispatcher.on_module(
        id(1),
        Box::new(move |_, _| {
            log.lock().push("specific");
            false
        }),
    );
    let log = order.clone();
    dispatcher.on_any(
        false,
        Box::new(move |_, _| {
            log.lock().push("any");
            false
        }),
    );

    dispatcher.dispatch_init(id(1), &sample_exports());

    assert_eq!(*order.lock(), vec!["any", "specific"]);
}

#[test]
fn test_registration_order_within_class() {
    let dispatcher = Dispatcher::new();
    let order: Arc<Mutex<Vec<u32>>> = Arc::new(Mutex::new(Vec::new()));

    for tag in 0..4u32 {
        let log = order.clone();
        dispatcher.on_module(
            id(1),
            Box::new(move |_, _| {
                log.lock().push(tag);
                false
            }),
        );
    }

    dispatcher.dispatch_init(id(1), &sample_exports());

    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
}

#[test]
fn test_one_shot_fires_at_most_once() {
    let dispatcher = Dispatcher::new();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = count.clone();
    dispatcher.on_module(
        id(1),
        Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            false
        }),
    );

    dispatcher.dispatch_init(id(1), &sample_exports());
    dispatcher.dispatch_init(id(1), &sample_exports());

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_persistent_any_keeps_firing_until_declined() {
    let dispatcher = Dispatcher::new();
    let count = Arc::new(AtomicUsize::new(0));

    let counter = count.clone();
    dispatcher.on_any(
        true,
        Box::new(move |module, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            // Decline after module 3.
            module != ModuleId::new(3)
        }),
    );

    for raw in 1..=5u32 {
        dispatcher.dispatch_init(id(raw), &sample_exports());
    }

    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_reentrant_registration_does_not_fire_in_same_pass() {
    let dispatcher = Dispatcher::new();
    let fired = Arc::new(AtomicUsize::new(0));

    let inner_dispatcher = dispatcher.clone();
    let inner_fired = fired.clone();
    dispatcher.on_module(
        id(1),
        Box::new(move |_, _| {
            let counter = inner_fired.clone();
            inner_dispatcher.on_module(
                ModuleId::new(1),
                Box::new(move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    false
                }),
            );
            false
        }),
    );

    dispatcher.dispatch_init(id(1), &sample_exports());
    assert_eq!(fired.load(Ordering::SeqCst), 0, "registered mid-dispatch");

    dispatcher.dispatch_init(id(1), &sample_exports());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn test_unsubscribe_from_own_callback_sticks() {
    let dispatcher = Dispatcher::new();
    let count = Arc::new(AtomicUsize::new(0));

    let handle_slot: Arc<Mutex<Option<crate::subscribe::SubscriptionHandle>>> =
        Arc::new(Mutex::new(None));

    let counter = count.clone();
    let slot = handle_slot.clone();
    let handle = dispatcher.on_any(
        true,
        Box::new(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(handle) = slot.lock().as_ref() {
                handle.unsubscribe();
            }
            true
        }),
    );
    *handle_slot.lock() = Some(handle);

    dispatcher.dispatch_init(id(1), &sample_exports());
    dispatcher.dispatch_init(id(2), &sample_exports());

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_unsubscribe_is_idempotent() {
    let dispatcher = Dispatcher::new();
    let handle = dispatcher.on_module(id(1), Box::new(|_, _| false));

    assert!(handle.is_active());
    handle.unsubscribe();
    handle.unsubscribe();
    assert!(!handle.is_active());
    assert_eq!(dispatcher.pending_count(), 0);
}

#[test]
fn test_import_subscription_fires_for_matching_path_only() {
    let dispatcher = Dispatcher::new();
    let seen: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));

    let log = seen.clone();
    dispatcher.on_import(
        "./locales/en.js",
        Box::new(move |path| {
            log.lock().push(path.to_string());
        }),
    );

    dispatcher.dispatch_import("./locales/fr.js");
    assert!(seen.lock().is_empty());

    dispatcher.dispatch_import("./locales/en.js");
    assert_eq!(*seen.lock(), vec!["./locales/en.js".to_string()]);

    // One-shot: a second completion is silent.
    dispatcher.dispatch_import("./locales/en.js");
    assert_eq!(seen.lock().len(), 1);
}
