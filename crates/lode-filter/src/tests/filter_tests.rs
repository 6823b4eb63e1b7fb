//! Filter metadata, primitives, combinators, and ES interop tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

use lode::{MatchKind, ModuleId, ModuleState, Value};

use crate::{Candidate, Filter, Pattern, Slot};

fn id(raw: u32) -> ModuleId {
    ModuleId::new(raw)
}

fn empty_view() -> FxHashMap<ModuleId, Vec<ModuleId>> {
    FxHashMap::default()
}

fn console_exports() -> Value {
    Value::object()
        .prop("log", Value::function("log"))
        .prop("warn", Value::function("warn"))
        .prop("error", Value::function("error"))
        .build()
}

#[test]
fn test_by_props_requires_all_names() {
    let view = empty_view();
    let exports = console_exports();
    let candidate = Candidate::new(id(1), &view, Some(&exports));

    assert_eq!(
        Filter::by_props(["log", "warn"]).matches(&candidate),
        Some(MatchKind::Plain)
    );
    assert_eq!(Filter::by_props(["log", "table"]).matches(&candidate), None);
}

#[test]
fn test_without_props_requires_none() {
    let view = empty_view();
    let exports = console_exports();
    let candidate = Candidate::new(id(1), &view, Some(&exports));

    assert!(Filter::without_props(["table"]).matches(&candidate).is_some());
    assert!(Filter::without_props(["table", "log"]).matches(&candidate).is_none());
}

#[test]
fn test_by_single_prop() {
    let view = empty_view();
    let single = Value::object().prop("getter", Value::anonymous_function()).build();
    let candidate = Candidate::new(id(1), &view, Some(&single));

    assert!(Filter::by_single_prop("getter").matches(&candidate).is_some());
    assert!(Filter::by_single_prop("setter").matches(&candidate).is_none());

    let several = console_exports();
    let candidate = Candidate::new(id(1), &view, Some(&several));
    assert!(Filter::by_single_prop("log").matches(&candidate).is_none());
}

#[test]
fn test_by_declared_name() {
    let view = empty_view();
    let exports = Value::function("FluxDispatcher");
    let candidate = Candidate::new(id(1), &view, Some(&exports));

    assert!(Filter::by_declared_name("FluxDispatcher").matches(&candidate).is_some());
    assert!(Filter::by_declared_name("Dispatcher").matches(&candidate).is_none());
}

#[test]
fn test_dependency_filter_ignores_exports() {
    let mut view = empty_view();
    view.insert(id(5), vec![id(4), id(0), id(2)]);

    let filter = Filter::by_dependencies(Pattern::new([
        Slot::exact(4),
        Slot::any(),
        Slot::exact(2),
    ]));

    assert!(!filter.needs_exports());
    // Matches with no exports at all.
    let candidate = Candidate::structural(id(5), &view);
    assert_eq!(filter.matches(&candidate), Some(MatchKind::Plain));
}

#[test]
fn test_keys_are_deterministic_and_argument_derived() {
    assert_eq!(Filter::by_props(["a", "b"]).key(), "props(a,b)");
    assert_eq!(Filter::by_props(["b", "a"]).key(), "props(b,a)");
    assert_eq!(Filter::without_props(["x"]).key(), "without(x)");
    assert_eq!(Filter::by_single_prop("y").key(), "single(y)");
    assert_eq!(Filter::by_declared_name("Z").key(), "name(Z)");
    assert_eq!(
        Filter::by_dependencies(Pattern::new([Slot::exact(4), Slot::any()])).key(),
        "deps(4,*)"
    );
    assert_eq!(
        Filter::custom("mine", true, |_, _| true).key(),
        "custom(mine)"
    );

    // Composite keys preserve the caller's operand order even though
    // evaluation may reorder.
    let composite = Filter::by_props(["a"]).and(Filter::by_dependencies(Pattern::new([])));
    assert_eq!(composite.key(), "and(props(a),deps())");

    let either = Filter::by_props(["a"]).or(Filter::by_props(["b"]));
    assert_eq!(either.key(), "or(props(a),props(b))");

    assert_eq!(Filter::by_props(["a"]).raw().key(), "raw(props(a))");
}

#[test]
fn test_composite_flags() {
    let props = Filter::by_props(["a"]);
    let deps = Filter::by_dependencies(Pattern::new([]));

    assert!(props.clone().and(deps.clone()).needs_exports());
    assert!(!props.clone().or(deps.clone()).needs_exports());
    assert!(props.clone().and(props.clone()).needs_exports());
    assert!(!deps.clone().and(deps.clone()).needs_exports());
}

#[test]
fn test_composite_scope_union() {
    let props = Filter::by_props(["a"]);
    let deps = Filter::by_dependencies(Pattern::new([]));
    let combined = props.and(deps);

    assert!(combined.scope().contains(ModuleState::Uninitialized));
    assert!(combined.scope().contains(ModuleState::Initialized));
    assert!(!combined.scope().contains(ModuleState::Blacklisted));
}

#[test]
fn test_mixed_and_matches_both_sides() {
    let mut view = empty_view();
    view.insert(id(5), vec![id(4), id(2)]);

    let filter = Filter::by_props(["log"])
        .and(Filter::by_dependencies(Pattern::new([
            Slot::exact(4),
            Slot::exact(2),
        ])));

    let exports = console_exports();
    let hit = Candidate::new(id(5), &view, Some(&exports));
    assert!(filter.matches(&hit).is_some());

    // Right deps, wrong exports.
    let wrong = Value::object().prop("tables", Value::Null).build();
    let miss = Candidate::new(id(5), &view, Some(&wrong));
    assert!(filter.matches(&miss).is_none());

    // Right exports, wrong deps.
    view.insert(id(6), vec![id(9)]);
    let exports = console_exports();
    let miss = Candidate::new(id(6), &view, Some(&exports));
    assert!(filter.matches(&miss).is_none());
}

#[test]
fn test_and_memoizes_cheap_operand_per_id() {
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = runs.clone();
    let cheap = Filter::custom("counted", false, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    let filter = cheap.and(Filter::by_props(["log"]));

    let view = empty_view();
    let exports = console_exports();
    let candidate = Candidate::new(id(1), &view, Some(&exports));

    assert!(filter.matches(&candidate).is_some());
    assert!(filter.matches(&candidate).is_some());
    assert!(filter.matches(&candidate).is_some());
    assert_eq!(runs.load(Ordering::SeqCst), 1, "cheap side ran once for id 1");

    let candidate = Candidate::new(id(2), &view, Some(&exports));
    assert!(filter.matches(&candidate).is_some());
    assert_eq!(runs.load(Ordering::SeqCst), 2, "fresh id evaluates again");
}

#[test]
fn test_or_short_circuits_on_cheap_side() {
    let runs = Arc::new(AtomicUsize::new(0));

    let counter = runs.clone();
    let costly = Filter::custom("costly", true, move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        true
    });
    let cheap = Filter::custom("cheap", false, |_, _| true);

    // Caller puts the costly side first; evaluation still tries the
    // dependency-only side before it.
    let filter = costly.or(cheap);

    let view = empty_view();
    let exports = console_exports();
    let candidate = Candidate::new(id(1), &view, Some(&exports));

    assert!(filter.matches(&candidate).is_some());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_es_interop_prefers_default_face() {
    let view = empty_view();
    let button = Value::object()
        .prop("render", Value::function("render"))
        .build();
    let ns = Value::object()
        .es_module()
        .prop("default", button)
        .prop("render", Value::function("renderOuter"))
        .build();

    let candidate = Candidate::new(id(1), &view, Some(&ns));
    let filter = Filter::by_props(["render"]);

    // Both faces match; the default face wins.
    assert_eq!(filter.matches(&candidate), Some(MatchKind::Default));
    // raw() skips the default face entirely.
    assert_eq!(filter.raw().matches(&candidate), Some(MatchKind::Namespace));
}

#[test]
fn test_es_interop_namespace_fallback() {
    let view = empty_view();
    let ns = Value::object()
        .es_module()
        .prop("default", Value::function("Chart"))
        .prop("helpers", Value::object().prop("scale", Value::Null).build())
        .build();
    let candidate = Candidate::new(id(1), &view, Some(&ns));

    // Only the namespace carries "helpers".
    assert_eq!(
        Filter::by_props(["helpers"]).matches(&candidate),
        Some(MatchKind::Namespace)
    );
    // Only the default face is the named function.
    assert_eq!(
        Filter::by_declared_name("Chart").matches(&candidate),
        Some(MatchKind::Default)
    );
}

#[test]
fn test_needs_exports_filter_without_exports_never_matches() {
    let view = empty_view();
    let candidate = Candidate::structural(id(1), &view);

    assert!(Filter::by_props(["log"]).matches(&candidate).is_none());
    assert!(Filter::without_props(["log"]).matches(&candidate).is_none());
}
