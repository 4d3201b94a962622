//! Dependency-resolution container
//!
//! [`Container`] owns the entire graph state behind one mutex: the provider
//! registry and value cache, the interceptor registry, and the synthetic
//! name counter. The lock is held across the whole
//! check-then-construct-then-cache sequence of a resolution pass, so no two
//! passes can race one constructor into running twice.
//!
//! Constructors run while that lock is held. They may block on their own
//! I/O, but they must not call back into the container; a re-entrant call
//! would deadlock.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use wireup::Container;
//!
//! struct Config { url: String }
//! struct Db { url: String }
//!
//! let container = Container::new();
//! container.provide(|| Config { url: "postgres://local".into() })?;
//! container.provide(|config: Arc<Config>| Db { url: config.url.clone() })?;
//!
//! let db = container.get::<Db>()?;
//! assert_eq!(db.url, "postgres://local");
//! # Ok::<(), wireup::Error>(())
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use wireup_domain::{Key, Param, Result};

use crate::intercept::{self, InterceptorRegistry, InterceptorSpec};
use crate::node::{BoxedValue, Resolved};
use crate::provide::{Constructor, InvokeHandler, PassiveOptions, ProvideOptions, TryConstructor};
use crate::registry::{ConstructorSpec, Registry};
use crate::resolver::{self, ResolveCtx};

/// Mutable graph state, guarded as a whole by the container's lock.
#[derive(Default)]
pub(crate) struct State {
    /// Provider nodes, group indexes, and the value cache
    pub registry: Registry,

    /// Type-scoped fallback providers
    pub interceptors: InterceptorRegistry,

    /// Monotonic counter for synthesized argument names
    pub name_seq: u64,
}

/// Type-keyed dependency-resolution container.
///
/// Values live for the container's lifetime; a resolution failure aborts
/// only the requesting pass and leaves previously cached values intact.
#[derive(Default)]
pub struct Container {
    state: Mutex<State>,
}

impl Container {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ------------------------------------------------------------------
    // Typed registration
    // ------------------------------------------------------------------

    /// Register an infallible constructor for its return type.
    pub fn provide<Args, C: Constructor<Args>>(&self, ctor: C) -> Result<()> {
        self.provide_as(ctor, ProvideOptions::new())
    }

    /// Register an infallible constructor under a name or into a group.
    pub fn provide_as<Args, C: Constructor<Args>>(
        &self,
        ctor: C,
        options: ProvideOptions,
    ) -> Result<()> {
        let key = options.apply(Key::of::<C::Output>());
        self.register(ConstructorSpec {
            ctor: ctor.erase(),
            params: C::params(),
            results: vec![key],
        })
    }

    /// Register a fallible constructor for its success type.
    pub fn try_provide<Args, C: TryConstructor<Args>>(&self, ctor: C) -> Result<()> {
        self.try_provide_as(ctor, ProvideOptions::new())
    }

    /// Register a fallible constructor under a name or into a group.
    pub fn try_provide_as<Args, C: TryConstructor<Args>>(
        &self,
        ctor: C,
        options: ProvideOptions,
    ) -> Result<()> {
        let key = options.apply(Key::of::<C::Output>());
        self.register(ConstructorSpec {
            ctor: ctor.erase(),
            params: C::params(),
            results: vec![key],
        })
    }

    /// Register an already-built value.
    pub fn insert<T: Send + Sync + 'static>(&self, value: T) -> Result<()> {
        self.insert_as(value, ProvideOptions::new())
    }

    /// Register an already-built value under a name or into a group.
    pub fn insert_as<T: Send + Sync + 'static>(
        &self,
        value: T,
        options: ProvideOptions,
    ) -> Result<()> {
        let key = options.apply(Key::of::<T>());
        self.lock()
            .registry
            .insert_object(key, std::sync::Arc::new(value))
    }

    /// Register a passive provider: a fallible constructor consulted only
    /// when a value of its result type cannot otherwise be found or built.
    /// The first argument receives the requested instance name.
    pub fn passive_provide<Args, C: TryConstructor<Args>>(&self, ctor: C) -> Result<()> {
        self.passive_provide_as(ctor, PassiveOptions::new())
    }

    /// Register a passive provider with an explicit name-argument position.
    pub fn passive_provide_as<Args, C: TryConstructor<Args>>(
        &self,
        ctor: C,
        options: PassiveOptions,
    ) -> Result<()> {
        self.register_interceptor(InterceptorSpec {
            ctor: ctor.erase(),
            params: C::params(),
            name_index: options.index(),
            result: Key::of::<C::Output>(),
        })
    }

    // ------------------------------------------------------------------
    // Typed resolution
    // ------------------------------------------------------------------

    /// Resolve the unnamed `T`.
    pub fn get<T: Send + Sync + 'static>(&self) -> Result<std::sync::Arc<T>> {
        self.resolve(&Param::single::<T>())?.value::<T>()
    }

    /// Resolve the `T` registered under `name`.
    pub fn get_named<T: Send + Sync + 'static>(&self, name: &str) -> Result<std::sync::Arc<T>> {
        self.resolve(&Param::named::<T>(name))?.value::<T>()
    }

    /// Resolve every `T` registered into `group`, in registration order.
    pub fn get_group<T: Send + Sync + 'static>(&self, group: &str) -> Result<Vec<std::sync::Arc<T>>> {
        self.resolve(&Param::group::<T>(group))?.group::<T>()
    }

    /// Resolve a function's arguments and call it.
    pub fn invoke<Args, F: InvokeHandler<Args>>(&self, f: F) -> Result<F::Output> {
        let resolved = self.resolve(&Param::list(F::params()))?;
        let Resolved::Seq(args) = resolved else {
            return Err(wireup_domain::Error::TypeMismatch {
                expected: "argument list",
            });
        };
        f.call(args)
    }

    // ------------------------------------------------------------------
    // Erased surface
    // ------------------------------------------------------------------

    /// Resolve an arbitrary descriptor tree. One call is one resolution
    /// pass: every leaf is offered to interception at most once, and the
    /// in-progress marker catches cyclic constructor graphs.
    pub fn resolve(&self, param: &Param) -> Result<Resolved> {
        let state = &mut *self.lock();
        let mut ctx = ResolveCtx::new();
        intercept::offer_tree(state, &mut ctx, param)?;
        resolver::resolve(state, &mut ctx, param)
    }

    /// Register an erased constructor node.
    pub fn register(&self, spec: ConstructorSpec) -> Result<()> {
        self.lock().registry.register(spec).map(|_| ())
    }

    /// Register an erased interceptor.
    pub fn register_interceptor(&self, spec: InterceptorSpec) -> Result<()> {
        self.lock().interceptors.register(spec)
    }

    /// Whether a built value is cached for the key.
    pub fn has_value(&self, key: &Key) -> bool {
        self.lock().registry.has_value(key)
    }

    /// Whether any provider is registered for the key.
    pub fn has_provider(&self, key: &Key) -> bool {
        self.lock().registry.has_provider(key)
    }

    /// Seed the value cache for a key directly.
    pub fn set_value(&self, key: Key, value: BoxedValue) {
        self.lock().registry.set_value(key, value);
    }
}
