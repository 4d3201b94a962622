//! Provider registry and value cache
//!
//! Owns the graph vertices: a node arena, a per-key provider index, a
//! per-group index in registration order, and the cache of already-built
//! values. Lookups are pure; mutation happens through [`Registry::register`],
//! [`Registry::insert_object`], and [`Registry::set_value`]. The registry is
//! not internally synchronized; the container guards it with one lock.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;
use wireup_domain::walk::leaf_keys;
use wireup_domain::{Error, Key, Param, Result};

use crate::node::{BoxedValue, ConstructorFn, ConstructorNode, Node, NodeId};

/// Everything needed to register one constructor: the erased function, its
/// argument descriptors in call order, and the keys it satisfies.
pub struct ConstructorSpec {
    /// Erased constructor function
    pub ctor: Arc<ConstructorFn>,

    /// Argument descriptors, in call order
    pub params: Vec<Param>,

    /// Result keys, parallel to the constructor's outputs
    pub results: Vec<Key>,
}

/// Node arena plus the key-based indexes over it.
#[derive(Default)]
pub struct Registry {
    /// All graph vertices, in registration order
    nodes: Vec<Node>,

    /// Provider nodes per non-group key; multiple providers are permitted
    providers: HashMap<Key, Vec<NodeId>>,

    /// Member nodes per group key, in registration order
    groups: HashMap<Key, Vec<NodeId>>,

    /// Already-built values per key
    values: HashMap<Key, BoxedValue>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a constructor node, indexing it under every
    /// declared result key.
    pub fn register(&mut self, spec: ConstructorSpec) -> Result<NodeId> {
        if spec.results.is_empty() {
            return Err(Error::provider_shape(
                "constructor must declare at least one result key",
            ));
        }
        for (index, key) in spec.results.iter().enumerate() {
            if key.is_grouped() && !key.name().is_empty() {
                return Err(Error::provider_shape(format!(
                    "result {key} may carry a name or a group, not both"
                )));
            }
            if spec.results[..index].contains(key) {
                return Err(Error::provider_shape(format!(
                    "duplicate result key {key} in one constructor"
                )));
            }
        }

        let dependencies = leaf_keys(&Param::List(spec.params.clone()));
        let id = self.nodes.len();
        debug!(node = id, results = ?spec.results.iter().map(Key::to_string).collect::<Vec<_>>(), "registered provider");

        for key in &spec.results {
            if key.is_grouped() {
                self.groups.entry(key.clone()).or_default().push(id);
            } else {
                self.providers.entry(key.clone()).or_default().push(id);
            }
        }
        let cached_values = vec![None; spec.results.len()];
        self.nodes.push(Node::Constructor(ConstructorNode {
            ctor: spec.ctor,
            params: spec.params,
            results: spec.results,
            dependencies,
            cached: false,
            cached_values,
        }));
        Ok(id)
    }

    /// Store an already-built value as an object node. Ungrouped keys seed
    /// the value cache; grouped keys join the group in registration order.
    /// A key with both a name and a group would be indexed under a group key
    /// no lookup ever forms, so that shape is rejected like in [`Self::register`].
    pub fn insert_object(&mut self, key: Key, value: BoxedValue) -> Result<()> {
        if key.is_grouped() && !key.name().is_empty() {
            return Err(Error::provider_shape(format!(
                "object {key} may carry a name or a group, not both"
            )));
        }
        debug!(key = %key, "registered object");
        if key.is_grouped() {
            let id = self.nodes.len();
            self.nodes.push(Node::Object(value));
            self.groups.entry(key).or_default().push(id);
        } else {
            self.values.insert(key, value);
        }
        Ok(())
    }

    /// Seed the value cache for a key without a constructor.
    pub fn set_value(&mut self, key: Key, value: BoxedValue) {
        self.values.insert(key, value);
    }

    /// Whether a built value is cached for the key.
    pub fn has_value(&self, key: &Key) -> bool {
        self.values.contains_key(key)
    }

    /// Whether any provider node is registered for the key.
    pub fn has_provider(&self, key: &Key) -> bool {
        if key.is_grouped() {
            self.groups.get(key).is_some_and(|ids| !ids.is_empty())
        } else {
            self.providers.get(key).is_some_and(|ids| !ids.is_empty())
        }
    }

    /// Provider nodes registered for the key, in registration order.
    pub fn providers(&self, key: &Key) -> Vec<NodeId> {
        self.providers.get(key).cloned().unwrap_or_default()
    }

    /// Member nodes of a group, in registration order. Empty for an unknown
    /// group; that is a valid, empty collection.
    pub fn group_members(&self, key: &Key) -> Vec<NodeId> {
        self.groups.get(key).cloned().unwrap_or_default()
    }

    /// Cached value for the key, if any.
    pub fn value(&self, key: &Key) -> Option<BoxedValue> {
        self.values.get(key).cloned()
    }

    /// Immutable node access.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Cached output of a constructor node for `key`, or the stored value of
    /// an object node.
    pub fn node_cached_value(&self, id: NodeId, key: &Key) -> Option<BoxedValue> {
        match self.nodes.get(id)? {
            Node::Object(value) => Some(value.clone()),
            Node::Constructor(node) => node.cached_value(key),
        }
    }

    /// Record a constructor node's outputs after its single invocation.
    pub fn fill_node_cache(&mut self, id: NodeId, values: Vec<BoxedValue>) {
        if let Some(Node::Constructor(node)) = self.nodes.get_mut(id) {
            node.fill_cache(values);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Db;

    fn noop_spec(results: Vec<Key>) -> ConstructorSpec {
        ConstructorSpec {
            ctor: Arc::new(|_| Ok(vec![])),
            params: Vec::new(),
            results,
        }
    }

    #[test]
    fn register_requires_a_result_key() {
        let mut registry = Registry::new();
        let err = registry.register(noop_spec(Vec::new())).unwrap_err();
        assert!(matches!(err, Error::InvalidProviderShape { .. }));
    }

    #[test]
    fn register_rejects_duplicate_result_keys() {
        let mut registry = Registry::new();
        let err = registry
            .register(noop_spec(vec![Key::of::<Db>(), Key::of::<Db>()]))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidProviderShape { .. }));
    }

    #[test]
    fn multiple_providers_for_one_key_are_permitted() {
        let mut registry = Registry::new();
        registry.register(noop_spec(vec![Key::of::<Db>()])).unwrap();
        registry.register(noop_spec(vec![Key::of::<Db>()])).unwrap();
        assert_eq!(registry.providers(&Key::of::<Db>()).len(), 2);
    }

    #[test]
    fn grouped_results_index_in_registration_order() {
        let mut registry = Registry::new();
        let group = Key::of::<Db>().with_group("handles");
        let first = registry.register(noop_spec(vec![group.clone()])).unwrap();
        let second = registry.register(noop_spec(vec![group.clone()])).unwrap();
        assert_eq!(registry.group_members(&group), vec![first, second]);
        assert!(registry.has_provider(&group));
        assert!(registry.providers(&group).is_empty());
    }

    #[test]
    fn insert_object_rejects_a_name_and_group_together() {
        let mut registry = Registry::new();
        let key = Key::of::<Db>().with_name("a").with_group("handles");
        let err = registry.insert_object(key, Arc::new(Db)).unwrap_err();
        assert!(matches!(err, Error::InvalidProviderShape { .. }));
        // Nothing was indexed under the malformed key.
        assert!(!registry.has_provider(&Key::of::<Db>().with_group("handles")));
    }

    #[test]
    fn set_value_seeds_the_cache() {
        let mut registry = Registry::new();
        let key = Key::of::<String>().with_name("seed_0");
        assert!(!registry.has_value(&key));
        registry.set_value(key.clone(), Arc::new("alpha".to_string()));
        assert!(registry.has_value(&key));
        assert!(registry.value(&key).is_some());
    }
}
