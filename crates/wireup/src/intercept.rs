//! Passive provider interception
//!
//! An interceptor is a type-scoped, late-bound provider: registered once for
//! a result type, consulted only when ordinary resolution finds neither a
//! cached value nor a provider for a single-key leaf. On a match the
//! container synthesizes a concrete registration for the requested key: the
//! template's name argument is rewritten to a freshly minted unique key,
//! that key is seeded with the requested name string, and the rewritten
//! constructor is registered under the exact requested key. Resolution then
//! proceeds through the normal provider path.
//!
//! Explicit registration always wins: a value or provider that already
//! exists for the key is never shadowed by an interceptor. Group leaves are
//! satisfied purely by explicit registration and are never intercepted.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};
use wireup_domain::param::ParamSingle;
use wireup_domain::walk::walk_param;
use wireup_domain::{Error, Key, Param, Result};

use crate::container::State;
use crate::node::{BoxedValue, ConstructorFn};
use crate::registry::ConstructorSpec;
use crate::resolver::ResolveCtx;

/// Everything needed to register one interceptor: the erased constructor
/// template, its argument descriptors, which argument carries the requested
/// name, and the (bare) result key it can satisfy.
pub struct InterceptorSpec {
    /// Erased constructor template
    pub ctor: Arc<ConstructorFn>,

    /// Argument descriptors, in call order
    pub params: Vec<Param>,

    /// Position of the `String` argument that receives the requested name
    pub name_index: usize,

    /// Result key; must be bare (no name, no group)
    pub result: Key,
}

#[derive(Clone)]
struct InterceptorEntry {
    ctor: Arc<ConstructorFn>,
    params: Vec<Param>,
    name_index: usize,
    result: Key,
}

/// Interceptors keyed by their bare result key; the requested name never
/// participates in the lookup.
#[derive(Default)]
pub(crate) struct InterceptorRegistry {
    entries: HashMap<Key, InterceptorEntry>,
}

impl InterceptorRegistry {
    /// Validate and store an interceptor. A later registration for the same
    /// result type replaces the earlier one.
    pub(crate) fn register(&mut self, spec: InterceptorSpec) -> Result<()> {
        if spec.params.is_empty() {
            return Err(Error::interceptor_shape(
                "constructor must accept at least one argument: (name: String)",
            ));
        }
        let name_param = spec.params.get(spec.name_index).ok_or_else(|| {
            Error::interceptor_shape(format!(
                "name argument index {} is out of range for {} arguments",
                spec.name_index,
                spec.params.len()
            ))
        })?;
        let is_string_single = matches!(
            name_param,
            Param::Single(ParamSingle { key })
                if key.type_id() == TypeId::of::<String>() && key.name().is_empty()
        );
        if !is_string_single {
            return Err(Error::interceptor_shape(format!(
                "argument {} is not a plain String; check PassiveOptions::name_index",
                spec.name_index
            )));
        }
        if !spec.result.name().is_empty() || spec.result.is_grouped() {
            return Err(Error::interceptor_shape(format!(
                "result key {} must be a bare type",
                spec.result
            )));
        }

        debug!(result = %spec.result, "registered interceptor");
        if self
            .entries
            .insert(
                spec.result.clone(),
                InterceptorEntry {
                    ctor: spec.ctor,
                    params: spec.params,
                    name_index: spec.name_index,
                    result: spec.result,
                },
            )
            .is_some()
        {
            warn!("replaced existing interceptor for the same result type");
        }
        Ok(())
    }

    fn get(&self, requested: &Key) -> Option<InterceptorEntry> {
        self.entries.get(&requested.bare()).cloned()
    }
}

/// Offer every single/group leaf of `param` to interception, each at most
/// once per resolution pass.
pub(crate) fn offer_tree(state: &mut State, ctx: &mut ResolveCtx, param: &Param) -> Result<()> {
    let mut leaves = Vec::new();
    walk_param(param, &mut |p: &Param| {
        if p.is_leaf() {
            leaves.push(p.clone());
            return false;
        }
        true
    });
    for leaf in leaves {
        offer_leaf(state, ctx, &leaf)?;
    }
    Ok(())
}

/// Offer one leaf to interception. Group leaves are marked and skipped;
/// single leaves with an existing value or provider are left alone; an
/// unresolved single leaf whose type has an interceptor gets a synthesized
/// registration for its exact key.
pub(crate) fn offer_leaf(state: &mut State, ctx: &mut ResolveCtx, leaf: &Param) -> Result<()> {
    match leaf {
        Param::Group(group) => {
            ctx.intercepted.insert(group.key.clone());
            Ok(())
        }
        Param::Single(single) => {
            if !ctx.intercepted.insert(single.key.clone()) {
                return Ok(());
            }
            // Explicit registration always wins over interception.
            if state.registry.has_value(&single.key) || state.registry.has_provider(&single.key) {
                return Ok(());
            }
            let Some(entry) = state.interceptors.get(&single.key) else {
                return Ok(());
            };
            synthesize(state, &entry, &single.key)
        }
        _ => Ok(()),
    }
}

/// Materialize an interceptor template for one requested key.
fn synthesize(state: &mut State, entry: &InterceptorEntry, requested: &Key) -> Result<()> {
    // Unique per synthesis, so repeated requests for the same name never
    // collide on the synthesized argument key.
    let seq = state.name_seq;
    state.name_seq += 1;
    let synth_key = Key::of::<String>().with_name(format!("{}_{seq}", requested.name()));

    let mut params = entry.params.clone();
    params[entry.name_index] = Param::Single(ParamSingle {
        key: synth_key.clone(),
    });
    // Seed the requested name directly; no provider round-trip for the
    // synthesized leaf.
    state.registry.set_value(
        synth_key,
        Arc::new(requested.name().to_string()) as BoxedValue,
    );

    debug!(key = %requested, "synthesizing provider from interceptor");
    state
        .registry
        .register(ConstructorSpec {
            ctor: entry.ctor.clone(),
            params,
            results: vec![entry.result.clone().with_name(requested.name())],
        })
        .map(|_| ())
}
