//! Graph vertices and resolved values
//!
//! A [`Node`] is one vertex of the dependency graph: either an already-built
//! object or a constructor with its argument descriptors and result keys.
//! Constructor nodes are invoked at most once; after the first invocation
//! every declared result is served from the node's cache, so constructors
//! are idempotent from the graph's point of view no matter how many
//! dependents reference them.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use wireup_domain::{Error, Key, Param, Result};

/// Every value the container stores or hands out.
pub type BoxedValue = Arc<dyn Any + Send + Sync>;

/// Error type user constructors may return; surfaced verbatim.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type-erased constructor: takes the resolved arguments in declared order,
/// returns one value per declared result key.
pub type ConstructorFn =
    dyn Fn(Vec<Resolved>) -> std::result::Result<Vec<BoxedValue>, BoxedError> + Send + Sync;

/// Index of a node in the registry arena.
pub type NodeId = usize;

/// The outcome of resolving one [`Param`].
#[derive(Clone)]
pub enum Resolved {
    /// A single value
    One(BoxedValue),
    /// A resolved list, in declared order
    Seq(Vec<Resolved>),
    /// Resolved object fields by name
    Fields(BTreeMap<String, Resolved>),
    /// A resolved group, in registration order
    Many(Vec<BoxedValue>),
}

impl Resolved {
    /// Downcast a single resolved value to `Arc<T>`.
    pub fn value<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        match self {
            Resolved::One(value) => downcast::<T>(value),
            _ => Err(Error::TypeMismatch {
                expected: std::any::type_name::<T>(),
            }),
        }
    }

    /// Downcast a resolved group to `Vec<Arc<T>>`, preserving order.
    pub fn group<T: Send + Sync + 'static>(&self) -> Result<Vec<Arc<T>>> {
        match self {
            Resolved::Many(values) => values.iter().map(downcast::<T>).collect(),
            _ => Err(Error::TypeMismatch {
                expected: std::any::type_name::<T>(),
            }),
        }
    }

    /// Access one field of a resolved object by name.
    pub fn field(&self, name: &str) -> Result<&Resolved> {
        match self {
            Resolved::Fields(fields) => fields.get(name).ok_or(Error::TypeMismatch {
                expected: "object field",
            }),
            _ => Err(Error::TypeMismatch {
                expected: "object descriptor",
            }),
        }
    }
}

// The erased payloads carry no Debug bound, so only the shape is rendered.
impl fmt::Debug for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolved::One(_) => f.write_str("One(<value>)"),
            Resolved::Seq(items) => f.debug_tuple("Seq").field(items).finish(),
            Resolved::Fields(fields) => f.debug_tuple("Fields").field(fields).finish(),
            Resolved::Many(values) => write!(f, "Many(<{} values>)", values.len()),
        }
    }
}

/// Downcast a stored value to `Arc<T>`.
pub fn downcast<T: Send + Sync + 'static>(value: &BoxedValue) -> Result<Arc<T>> {
    Arc::clone(value)
        .downcast::<T>()
        .map_err(|_| Error::TypeMismatch {
            expected: std::any::type_name::<T>(),
        })
}

/// Constructor vertex: the erased function, its argument descriptors, the
/// keys it can satisfy, and the at-most-once invocation cache.
pub struct ConstructorNode {
    /// Erased constructor function
    pub ctor: Arc<ConstructorFn>,

    /// Argument descriptors, in call order
    pub params: Vec<Param>,

    /// Keys this node can satisfy, parallel to the constructor's outputs
    pub results: Vec<Key>,

    /// Keys referenced by the argument descriptors (leaf keys, pre-order)
    pub dependencies: Vec<Key>,

    /// Set after the first invocation; the constructor never runs again
    pub cached: bool,

    /// Cached outputs, parallel to `results`, populated on first invocation
    pub cached_values: Vec<Option<BoxedValue>>,
}

impl ConstructorNode {
    /// Cached output for `key`, if this node was already invoked.
    pub fn cached_value(&self, key: &Key) -> Option<BoxedValue> {
        if !self.cached {
            return None;
        }
        self.results
            .iter()
            .position(|result| result == key)
            .and_then(|index| self.cached_values.get(index).cloned().flatten())
    }

    /// Record the constructor outputs, marking the node invoked.
    pub fn fill_cache(&mut self, values: Vec<BoxedValue>) {
        self.cached_values = values.into_iter().map(Some).collect();
        self.cached = true;
    }
}

/// Graph vertex.
pub enum Node {
    /// Already-constructed value; resolving returns it unconditionally
    Object(BoxedValue),
    /// Constructor with dependencies and result cache
    Constructor(ConstructorNode),
}
