//! Cache behavior across simulated sessions.

use std::path::Path;
use std::time::Duration;

use lode::{MatchKind, Value};
use lode_cache::{CacheConfig, CacheHandle, FileBridge, FindEntry};
use lode_filter::{Filter, Pattern, Slot};
use lode_graph::Loader;

use crate::Finder;

use super::{console_exports, define_value, id};

fn cache_at(path: &Path) -> CacheHandle {
    super::init_tracing();
    let config = CacheConfig::new()
        .with_enabled(true)
        .with_debounce(Duration::ZERO);
    CacheHandle::new(Box::new(FileBridge::new(path)), config)
}

#[test]
fn test_lookup_records_into_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    let loader = Loader::new();
    define_value(&loader, 4, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));
    finder.loader().require(id(4)).unwrap();

    let filter = Filter::by_props(["log"]);
    assert_eq!(finder.lookup(&filter).unwrap().id, id(4));

    let Some(FindEntry::Matches(matches)) = finder.cache().lookup_entry(filter.key()) else {
        panic!("expected recorded match");
    };
    assert_eq!(matches.get(&id(4)), Some(&MatchKind::Plain));
}

#[test]
fn test_cached_hit_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let filter = Filter::by_props(["log"]);

    {
        let loader = Loader::new();
        define_value(&loader, 4, &[], console_exports());
        let finder = Finder::new(loader, cache_at(&path));
        finder.loader().require(id(4)).unwrap();
        finder.lookup(&filter).unwrap();
        finder.flush_cache();
    }

    // Same bundle next session: the cached id verifies and wins.
    let loader = Loader::new();
    define_value(&loader, 4, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));
    finder.loader().require(id(4)).unwrap();

    assert_eq!(finder.lookup(&filter).unwrap().id, id(4));
}

#[test]
fn test_stale_cache_entry_is_dropped_and_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let filter = Filter::by_props(["log"]);

    {
        let loader = Loader::new();
        define_value(&loader, 4, &[], console_exports());
        let finder = Finder::new(loader, cache_at(&path));
        finder.loader().require(id(4)).unwrap();
        finder.lookup(&filter).unwrap();
        finder.flush_cache();
    }

    // A bundle update moved the console module from id 4 to id 7.
    let loader = Loader::new();
    define_value(&loader, 4, &[], Value::object().prop("x", Value::Null).build());
    define_value(&loader, 7, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));
    finder.loader().require_all([id(4), id(7)]).unwrap();

    assert_eq!(finder.lookup(&filter).unwrap().id, id(7));

    // The stale id is gone from the entry and the fresh one recorded.
    let Some(FindEntry::Matches(matches)) = finder.cache().lookup_entry(filter.key()) else {
        panic!("expected recorded match");
    };
    assert!(!matches.contains_key(&id(4)));
    assert_eq!(matches.get(&id(7)), Some(&MatchKind::Plain));
}

#[test]
fn test_cached_id_waits_for_initialization_next_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let filter = Filter::by_dependencies(Pattern::new([
        Slot::exact(4),
        Slot::any(),
        Slot::exact(2),
    ]));

    {
        let loader = Loader::new();
        define_value(&loader, 5, &[4, 0, 2], Value::object().prop("c", Value::Null).build());
        let finder = Finder::new(loader, cache_at(&path));
        finder.loader().require(id(5)).unwrap();
        assert_eq!(finder.lookup(&filter).unwrap().id, id(5));
        finder.flush_cache();
    }

    // Next session the module is defined but its factory has not run;
    // the cached id must read as not-yet-found, never as a match with
    // an undefined value.
    let loader = Loader::new();
    define_value(&loader, 5, &[4, 0, 2], Value::object().prop("c", Value::Null).build());
    let finder = Finder::new(loader, cache_at(&path));

    assert!(finder.lookup(&filter).is_none());
    assert!(
        matches!(finder.cache().lookup_entry(filter.key()), Some(FindEntry::Matches(_))),
        "early lookup must not evict the still-valid entry"
    );

    finder.loader().require(id(5)).unwrap();
    let found = finder.lookup(&filter).expect("initialized module matches");
    assert_eq!(found.id, id(5));
    assert!(found.value.has("c"));
}

#[test]
fn test_exhaustive_no_match_is_trusted_next_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let filter = Filter::by_props(["doesNotExist"]);

    {
        let loader = Loader::new();
        define_value(&loader, 4, &[], console_exports());
        let finder = Finder::new(loader, cache_at(&path));
        finder.loader().require(id(4)).unwrap();

        assert!(finder.lookup_exhaustive(&filter).is_empty());
        finder.flush_cache();
    }

    let loader = Loader::new();
    define_value(&loader, 4, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));

    assert!(finder.lookup(&filter).is_none());
    assert!(matches!(
        finder.cache().lookup_entry(filter.key()),
        Some(FindEntry::NoMatch)
    ));
}

#[test]
fn test_plain_lookup_never_writes_no_match() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let filter = Filter::by_props(["doesNotExist"]);

    let loader = Loader::new();
    define_value(&loader, 4, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));
    finder.loader().require(id(4)).unwrap();

    assert!(finder.lookup(&filter).is_none());
    assert!(finder.cache().lookup_entry(filter.key()).is_none());
}

#[test]
fn test_condemnation_persists_and_seeds_next_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    {
        let loader = Loader::new();
        define_value(&loader, 9, &[], Value::Undefined);
        let finder = Finder::new(loader, cache_at(&path));
        finder.loader().require(id(9)).unwrap();
        finder.flush_cache();
    }

    // Next session: module 9 now produces a perfectly good object, but
    // the seeded blacklist keeps it out of matching and dispatch.
    let loader = Loader::new();
    define_value(&loader, 9, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));

    assert!(finder.registry().is_blacklisted(id(9)));

    let fired = std::sync::Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = fired.clone();
    finder.wait(Filter::by_props(["log"]), move |_| {
        counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    });

    // The bundle still gets its exports back.
    let value = finder.loader().require(id(9)).unwrap();
    assert!(value.has("log"));

    assert_eq!(fired.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(finder.lookup(&Filter::by_props(["log"])).is_none());
}

#[test]
fn test_tick_persists_after_debounce() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");

    let loader = Loader::new();
    define_value(&loader, 4, &[], console_exports());
    let finder = Finder::new(loader, cache_at(&path));
    finder.loader().require(id(4)).unwrap();
    finder.lookup(&Filter::by_props(["log"])).unwrap();

    assert!(finder.cache().is_dirty());
    assert!(finder.tick(), "zero debounce writes on the first tick");
    assert!(path.exists());
}
