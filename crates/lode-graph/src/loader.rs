//! The loader shim: define/require interception and export
//! classification.
//!
//! The shim stands where the bundler's module-define entry point used to
//! be. Definitions record their dependency list before the factory can
//! run; requires drive the lazy initialization cycle: mark initializing,
//! run the real factory, classify the produced exports, then fire pending
//! subscriptions synchronously before control returns to the bundle.

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use lode::{Error, ModuleId, ModuleState, Result, Value};

use crate::registry::Registry;
use crate::subscribe::Dispatcher;

/// A module factory: the wrapped original body of a bundled module.
///
/// Runs at most once, with a context that can require the module's
/// dependencies.
pub type ModuleFactory = Box<dyn FnOnce(&ModuleContext<'_>) -> Value + Send>;

type BlacklistSink = Box<dyn Fn(ModuleId) + Send + Sync>;

/// The loader shim.
///
/// Owns the pending factory table; shares the registry and dispatcher
/// with the query facade.
pub struct Loader {
    registry: Registry,
    dispatcher: Dispatcher,
    factories: Mutex<FxHashMap<ModuleId, ModuleFactory>>,
    /// The bundler's root object; exports identical to it are unusable.
    sentinel_root: Option<Value>,
    /// Notified whenever classification condemns a module (wired to the
    /// result cache by the facade).
    blacklist_sink: Mutex<Option<BlacklistSink>>,
}

/// Execution context handed to a running factory.
pub struct ModuleContext<'a> {
    loader: &'a Loader,
    id: ModuleId,
}

impl ModuleContext<'_> {
    /// The id of the module whose factory is running.
    pub fn id(&self) -> ModuleId {
        self.id
    }

    /// Require a dependency, initializing it on demand.
    pub fn require(&self, id: ModuleId) -> Result<Value> {
        self.loader.require(id)
    }
}

impl Loader {
    /// Create a loader over a fresh registry and dispatcher.
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            dispatcher: Dispatcher::new(),
            factories: Mutex::new(FxHashMap::default()),
            sentinel_root: None,
            blacklist_sink: Mutex::new(None),
        }
    }

    /// Create a loader that recognizes the bundler's sentinel root object
    /// (by identity) as an unusable export.
    pub fn with_sentinel_root(sentinel: Value) -> Self {
        let mut loader = Self::new();
        loader.sentinel_root = Some(sentinel);
        loader
    }

    /// Shared registry handle.
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    /// Shared dispatcher handle.
    pub fn dispatcher(&self) -> Dispatcher {
        self.dispatcher.clone()
    }

    /// Install the callback notified on every new blacklisting.
    pub fn set_blacklist_sink<F>(&self, sink: F)
    where
        F: Fn(ModuleId) + Send + Sync + 'static,
    {
        *self.blacklist_sink.lock() = Some(Box::new(sink));
    }

    /// Record a module definition.
    ///
    /// The dependency list lands in the registry before the factory can
    /// possibly run. A duplicate definition keeps the first factory.
    pub fn define(&self, id: ModuleId, dependencies: Vec<ModuleId>, factory: ModuleFactory) {
        if !self.registry.note_defined(id, dependencies) {
            warn!(module = %id, "duplicate module definition ignored");
            return;
        }
        self.factories.lock().insert(id, factory);
    }

    /// Require a module, running its factory on first access.
    ///
    /// Subscriptions matching the module fire synchronously before this
    /// returns. Blacklisted modules still hand their stored value back -
    /// the bundle needs it - but nothing is dispatched for them.
    pub fn require(&self, id: ModuleId) -> Result<Value> {
        match self.registry.state(id) {
            None => Err(Error::UnknownModule(id)),
            Some(ModuleState::Initialized) | Some(ModuleState::Blacklisted) => {
                Ok(self.registry.raw_exports(id).unwrap_or_default())
            }
            Some(ModuleState::Initializing) => {
                warn!(module = %id, "circular require observed; yielding undefined");
                Ok(Value::Undefined)
            }
            Some(ModuleState::Uninitialized) => self.initialize(id),
        }
    }

    /// Require several modules in order.
    pub fn require_all<I>(&self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = ModuleId>,
    {
        for id in ids {
            self.require(id)?;
        }
        Ok(())
    }

    /// Signal that a dynamic import at `path` finished loading.
    pub fn note_import_finished(&self, path: &str) {
        self.dispatcher.dispatch_import(path);
    }

    fn initialize(&self, id: ModuleId) -> Result<Value> {
        let factory = self
            .factories
            .lock()
            .remove(&id)
            .ok_or(Error::MissingFactory(id))?;

        self.registry.begin_init(id)?;

        let context = ModuleContext { loader: self, id };
        let exports = factory(&context);

        if self.is_bad_export(&exports) {
            debug!(module = %id, "exports unusable; blacklisting");
            self.registry.blacklist(id, Some(exports.clone()))?;
            if let Some(sink) = self.blacklist_sink.lock().as_ref() {
                sink(id);
            }
            return Ok(exports);
        }

        self.registry.finish_init(id, exports.clone())?;

        // Modules condemned by a previous run's cache initialize normally
        // but stay invisible to subscriptions.
        if !self.registry.is_blacklisted(id) {
            self.dispatcher.dispatch_init(id, &exports);
        }

        Ok(exports)
    }

    /// The "bad export" deny-list: shapes no filter could ever use.
    ///
    /// Empty objects are condemned too, which can catch a legitimately
    /// empty module; downstream behavior depends on that heuristic, so it
    /// stays.
    fn is_bad_export(&self, exports: &Value) -> bool {
        exports.is_nullish()
            || exports.is_primitive()
            || exports.is_opaque()
            || exports.is_empty_object()
            || self
                .sentinel_root
                .as_ref()
                .is_some_and(|root| root.same_identity(exports))
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}
