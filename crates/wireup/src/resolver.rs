//! Graph resolution engine
//!
//! Depth-first, memoized resolution of a parameter descriptor tree. Each
//! top-level call is one resolution pass with its own [`ResolveCtx`]: the
//! set of leaves already offered to interception and the stack of keys
//! currently being resolved. The engine runs with the container's state lock
//! held for the whole pass, so a check-then-construct-then-cache sequence is
//! never interleaved with another pass.
//!
//! Constructor nodes are invoked at most once. A key re-entered while it is
//! still on the in-progress stack fails fast with the full cycle path
//! instead of recursing unboundedly.

use std::collections::HashMap;
use std::collections::HashSet;

use tracing::trace;
use wireup_domain::error::FieldError;
use wireup_domain::param::{ParamGroup, ParamSingle};
use wireup_domain::{Error, Key, Param, Result};

use crate::container::State;
use crate::intercept;
use crate::node::{BoxedValue, NodeId, Resolved};

/// Per-pass resolution context.
#[derive(Default)]
pub(crate) struct ResolveCtx {
    /// Leaves already offered to the interception check this pass
    pub intercepted: HashSet<Key>,

    /// Keys currently being resolved on this call stack, outermost first
    pub resolving: Vec<Key>,
}

impl ResolveCtx {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

/// Resolve one descriptor, recursively satisfying everything it needs.
pub(crate) fn resolve(state: &mut State, ctx: &mut ResolveCtx, param: &Param) -> Result<Resolved> {
    match param {
        Param::Single(single) => resolve_single(state, ctx, single),
        Param::List(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                let value = resolve(state, ctx, item).map_err(|source| Error::ArgumentFailed {
                    index,
                    source: Box::new(source),
                })?;
                out.push(value);
            }
            Ok(Resolved::Seq(out))
        }
        Param::Object(fields) => {
            let mut out = HashMap::new();
            let mut failed = Vec::new();
            for field in fields {
                match resolve(state, ctx, &field.param) {
                    Ok(value) => {
                        out.insert(field.name.clone(), value);
                    }
                    Err(error) => failed.push(FieldError {
                        field: field.name.clone(),
                        error,
                    }),
                }
            }
            if failed.is_empty() {
                Ok(Resolved::Fields(out.into_iter().collect()))
            } else {
                Err(Error::ArgumentsFailed { fields: failed })
            }
        }
        Param::Group(group) => resolve_group(state, ctx, group),
    }
}

/// Resolve a single-key leaf: cache, then providers, then interception.
fn resolve_single(state: &mut State, ctx: &mut ResolveCtx, single: &ParamSingle) -> Result<Resolved> {
    let key = &single.key;
    if let Some(value) = state.registry.value(key) {
        trace!(key = %key, "resolved from cache");
        return Ok(Resolved::One(value));
    }
    if let Some(id) = state.registry.providers(key).first().copied() {
        return invoke_node(state, ctx, id, key).map(Resolved::One);
    }

    // No value and no provider: offer the leaf to interception, which may
    // register a provider for this exact key, then retry once.
    intercept::offer_leaf(state, ctx, &Param::Single(single.clone()))?;
    if let Some(value) = state.registry.value(key) {
        return Ok(Resolved::One(value));
    }
    if let Some(id) = state.registry.providers(key).first().copied() {
        return invoke_node(state, ctx, id, key).map(Resolved::One);
    }

    Err(Error::UnresolvedDependency { key: key.clone() })
}

/// Resolve a grouped collection: every member node in registration order.
/// An empty group is an empty collection, not an error.
fn resolve_group(state: &mut State, ctx: &mut ResolveCtx, group: &ParamGroup) -> Result<Resolved> {
    // Group leaves are never intercepted; mark them so the interception
    // check skips them for the rest of the pass.
    ctx.intercepted.insert(group.key.clone());

    let members = state.registry.group_members(&group.key);
    let mut out = Vec::with_capacity(members.len());
    for id in members {
        out.push(invoke_node(state, ctx, id, &group.key)?);
    }
    Ok(Resolved::Many(out))
}

/// Build the value a node provides for `requested`, invoking its constructor
/// only if the node has never run.
fn invoke_node(
    state: &mut State,
    ctx: &mut ResolveCtx,
    id: NodeId,
    requested: &Key,
) -> Result<BoxedValue> {
    if let Some(value) = state.registry.node_cached_value(id, requested) {
        trace!(key = %requested, node = id, "resolved from node cache");
        return Ok(value);
    }

    if ctx.resolving.contains(requested) {
        let mut path = ctx.resolving.clone();
        path.push(requested.clone());
        return Err(Error::CyclicDependency { path });
    }

    let (ctor, params, results, dependencies) = match state.registry.node(id) {
        Some(crate::node::Node::Constructor(node)) => (
            node.ctor.clone(),
            node.params.clone(),
            node.results.clone(),
            node.dependencies.clone(),
        ),
        Some(crate::node::Node::Object(value)) => return Ok(value.clone()),
        None => return Err(Error::UnresolvedDependency { key: requested.clone() }),
    };

    // The node's dependency leaves meet interception before any argument is
    // built, the same way the pass entry offers the top-level tree.
    for key in &dependencies {
        intercept::offer_leaf(state, ctx, &Param::from_key(key.clone()))?;
    }

    trace!(key = %requested, node = id, args = params.len(), "invoking constructor");
    ctx.resolving.push(requested.clone());
    let outcome = invoke_constructor(state, ctx, &ctor, &params, requested);
    ctx.resolving.pop();
    let outputs = outcome?;

    if outputs.len() != results.len() {
        return Err(Error::provider_shape(format!(
            "constructor for {requested} produced {} values, {} declared",
            outputs.len(),
            results.len()
        )));
    }

    state.registry.fill_node_cache(id, outputs.clone());
    for (key, value) in results.iter().zip(&outputs) {
        if !key.is_grouped() && !state.registry.has_value(key) {
            state.registry.set_value(key.clone(), value.clone());
        }
    }

    results
        .iter()
        .position(|key| key == requested)
        .map(|index| outputs[index].clone())
        .ok_or_else(|| Error::UnresolvedDependency { key: requested.clone() })
}

fn invoke_constructor(
    state: &mut State,
    ctx: &mut ResolveCtx,
    ctor: &std::sync::Arc<crate::node::ConstructorFn>,
    params: &[Param],
    requested: &Key,
) -> Result<Vec<BoxedValue>> {
    let mut args = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let value = resolve(state, ctx, param).map_err(|source| Error::ArgumentFailed {
            index,
            source: Box::new(source),
        })?;
        args.push(value);
    }
    (ctor)(args).map_err(|source| Error::Constructor {
        key: requested.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConstructorSpec;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Db {
        id: u32,
    }

    fn spec_for(results: Vec<Key>, value: u32) -> ConstructorSpec {
        ConstructorSpec {
            ctor: Arc::new(move |_| Ok(vec![Arc::new(Db { id: value }) as BoxedValue])),
            params: Vec::new(),
            results,
        }
    }

    #[test]
    fn constructor_runs_at_most_once() {
        let mut state = State::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        state
            .registry
            .register(ConstructorSpec {
                ctor: Arc::new(move |_| {
                    seen.fetch_add(1, Ordering::SeqCst);
                    Ok(vec![Arc::new(Db { id: 1 }) as BoxedValue])
                }),
                params: Vec::new(),
                results: vec![Key::of::<Db>()],
            })
            .unwrap();

        let mut ctx = ResolveCtx::new();
        let param = Param::single::<Db>();
        let first = resolve(&mut state, &mut ctx, &param).unwrap();
        let second = resolve(&mut state, &mut ResolveCtx::new(), &param).unwrap();
        assert_eq!(first.value::<Db>().unwrap().id, 1);
        assert_eq!(second.value::<Db>().unwrap().id, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn direct_cycle_fails_with_path() {
        let mut state = State::default();
        state
            .registry
            .register(ConstructorSpec {
                ctor: Arc::new(|_| Ok(vec![Arc::new(Db { id: 1 }) as BoxedValue])),
                params: vec![Param::single::<Db>()],
                results: vec![Key::of::<Db>()],
            })
            .unwrap();

        let err = resolve(&mut state, &mut ResolveCtx::new(), &Param::single::<Db>()).unwrap_err();
        let Error::ArgumentFailed { source, .. } = err else {
            panic!("expected positional wrap, got {err}");
        };
        assert!(source.to_string().contains("cyclic dependency"));
    }

    #[test]
    fn empty_group_resolves_to_empty_collection() {
        let mut state = State::default();
        let resolved = resolve(
            &mut state,
            &mut ResolveCtx::new(),
            &Param::group::<Db>("handles"),
        )
        .unwrap();
        assert!(resolved.group::<Db>().unwrap().is_empty());
    }

    #[test]
    fn group_assembles_in_registration_order() {
        let mut state = State::default();
        let group = Key::of::<Db>().with_group("handles");
        state.registry.register(spec_for(vec![group.clone()], 1)).unwrap();
        state.registry.register(spec_for(vec![group.clone()], 2)).unwrap();

        let resolved = resolve(
            &mut state,
            &mut ResolveCtx::new(),
            &Param::group::<Db>("handles"),
        )
        .unwrap();
        let ids: Vec<u32> = resolved
            .group::<Db>()
            .unwrap()
            .iter()
            .map(|db| db.id)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn node_dependencies_are_offered_to_interception() {
        struct App {
            id: u32,
        }

        let mut state = State::default();
        state
            .interceptors
            .register(crate::intercept::InterceptorSpec {
                ctor: Arc::new(|_| Ok(vec![Arc::new(Db { id: 7 }) as BoxedValue])),
                params: vec![Param::single::<String>()],
                name_index: 0,
                result: Key::of::<Db>(),
            })
            .unwrap();
        // The provider's only dependency is a named Db that interception
        // must supply.
        state
            .registry
            .register(ConstructorSpec {
                ctor: Arc::new(|args| {
                    let db = args[0].value::<Db>().map_err(Box::new)?;
                    Ok(vec![Arc::new(App { id: db.id }) as BoxedValue])
                }),
                params: vec![Param::named::<Db>("primary")],
                results: vec![Key::of::<App>()],
            })
            .unwrap();

        let resolved = resolve(&mut state, &mut ResolveCtx::new(), &Param::single::<App>()).unwrap();
        assert_eq!(resolved.value::<App>().unwrap().id, 7);
    }

    #[test]
    fn object_failure_aggregates_every_field() {
        let mut state = State::default();
        let param = Param::object([
            ("a", Param::named::<Db>("missing_a")),
            ("b", Param::named::<Db>("missing_b")),
        ]);
        let err = resolve(&mut state, &mut ResolveCtx::new(), &param).unwrap_err();
        let Error::ArgumentsFailed { fields } = err else {
            panic!("expected aggregated failure, got {err}");
        };
        assert_eq!(fields.len(), 2);
        let names: Vec<&str> = fields.iter().map(|f| f.field.as_str()).collect();
        assert!(names.contains(&"a") && names.contains(&"b"));
    }
}
