//! The export value model.
//!
//! A module's exports are whatever its factory produced. Lode never
//! inspects source, so the model only captures what structural filters can
//! observe: primitiveness, own property names, a declared function/class
//! name, the ES-module marker, and the "this is an unresolved proxy" case
//! as an explicit variant instead of a transparent stand-in object.

use std::sync::Arc;

use rustc_hash::FxHashMap;

/// An exported value as observed by the filter engine.
///
/// Heavy payloads (`Object`, `Function`) are behind `Arc` so cloning a
/// value out of the registry is cheap and pointer identity is preserved -
/// sentinel-root detection relies on that identity.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// No value (also what a circular require observes).
    #[default]
    Undefined,
    /// Explicit null.
    Null,
    Bool(bool),
    Number(f64),
    Str(Arc<str>),
    /// A function (or class constructor) with its own properties.
    Function(Arc<FunctionValue>),
    /// A plain object, possibly an ES module namespace.
    Object(Arc<ObjectValue>),
    /// A proxy whose target has not resolved; structurally unusable.
    Opaque,
}

/// Own-property table plus the metadata filters can test.
#[derive(Debug, Default)]
pub struct ObjectValue {
    /// Constructor/class name, when one was declared.
    pub class_name: Option<String>,
    /// Own enumerable properties.
    pub props: FxHashMap<String, Value>,
    /// ES module namespace marker.
    pub es_module: bool,
}

/// A function value: declared name plus any properties hung off it.
#[derive(Debug, Default)]
pub struct FunctionValue {
    pub name: Option<String>,
    pub props: FxHashMap<String, Value>,
}

impl Value {
    /// Shorthand for a string value.
    pub fn str(text: impl Into<Arc<str>>) -> Self {
        Self::Str(text.into())
    }

    /// Shorthand for a named function value with no properties.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(Arc::new(FunctionValue {
            name: Some(name.into()),
            props: FxHashMap::default(),
        }))
    }

    /// An anonymous function value.
    pub fn anonymous_function() -> Self {
        Self::Function(Arc::new(FunctionValue::default()))
    }

    /// Start building an object value.
    pub fn object() -> ObjectBuilder {
        ObjectBuilder::default()
    }

    /// Own properties, for objects and functions.
    pub fn props(&self) -> Option<&FxHashMap<String, Value>> {
        match self {
            Self::Object(obj) => Some(&obj.props),
            Self::Function(func) => Some(&func.props),
            _ => None,
        }
    }

    /// Look up an own property by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.props().and_then(|props| props.get(name))
    }

    /// Whether an own property with this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of own properties, when the value can carry them.
    pub fn prop_count(&self) -> Option<usize> {
        self.props().map(FxHashMap::len)
    }

    /// Declared function or class name, if any.
    pub fn declared_name(&self) -> Option<&str> {
        match self {
            Self::Function(func) => func.name.as_deref(),
            Self::Object(obj) => obj.class_name.as_deref(),
            _ => None,
        }
    }

    /// `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, Self::Undefined | Self::Null)
    }

    /// Booleans, numbers, and strings - values with no property surface.
    pub fn is_primitive(&self) -> bool {
        matches!(self, Self::Bool(_) | Self::Number(_) | Self::Str(_))
    }

    /// An unresolved proxy stand-in.
    pub fn is_opaque(&self) -> bool {
        matches!(self, Self::Opaque)
    }

    /// Whether the value carries the ES module namespace marker.
    pub fn is_es_module(&self) -> bool {
        matches!(self, Self::Object(obj) if obj.es_module)
    }

    /// An object with no own properties (the deny-list heuristic treats
    /// these as indistinguishable from empty).
    pub fn is_empty_object(&self) -> bool {
        matches!(self, Self::Object(obj) if obj.props.is_empty())
    }

    /// The `default` export of an ES module namespace.
    pub fn default_export(&self) -> Option<&Value> {
        if self.is_es_module() {
            self.get("default")
        } else {
            None
        }
    }

    /// Pointer identity for objects and functions.
    ///
    /// Primitives never share identity; this is only meaningful for
    /// recognizing a specific live object such as the bundler's sentinel
    /// root.
    pub fn same_identity(&self, other: &Value) -> bool {
        match (self, other) {
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Builder for `Value::Object` to keep factories and tests readable.
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    object: ObjectValue,
}

impl ObjectBuilder {
    pub fn prop(mut self, name: impl Into<String>, value: Value) -> Self {
        self.object.props.insert(name.into(), value);
        self
    }

    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.object.class_name = Some(name.into());
        self
    }

    pub fn es_module(mut self) -> Self {
        self.object.es_module = true;
        self
    }

    pub fn build(self) -> Value {
        Value::Object(Arc::new(self.object))
    }
}
