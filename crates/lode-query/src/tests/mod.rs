mod session_tests;

use lode::{ModuleId, Value};
use lode_graph::Loader;

/// Opt-in log output while debugging: `LODE_TEST_LOG=trace cargo test`.
pub(crate) fn init_tracing() {
    if let Ok(level) = std::env::var("LODE_TEST_LOG") {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(level)
            .with_test_writer()
            .try_init();
    }
}

pub(crate) fn id(raw: u32) -> ModuleId {
    ModuleId::new(raw)
}

/// Define a module whose factory returns a fixed value.
pub(crate) fn define_value(loader: &Loader, module: u32, deps: &[u32], value: Value) {
    loader.define(
        id(module),
        deps.iter().copied().map(ModuleId::new).collect(),
        Box::new(move |_| value),
    );
}

pub(crate) fn console_exports() -> Value {
    Value::object()
        .prop("log", Value::function("log"))
        .prop("warn", Value::function("warn"))
        .build()
}
