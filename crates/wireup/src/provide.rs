//! Typed registration and invocation layer
//!
//! Bridges ordinary Rust functions to the erased graph core. A constructor
//! argument is anything implementing [`Injected`]: `Arc<T>` for a dependency
//! on `T`, or `String` for a provided string value (the name argument of a
//! passive provider). The arity impls cover functions of zero to four
//! arguments.
//!
//! Typed constructor arguments cannot name a group (there are no type-level
//! group names); grouped collections are consumed through
//! `Container::get_group` or an explicit [`Param`] tree.

use std::sync::Arc;

use wireup_domain::{Key, Param, Result};

use crate::node::{BoxedError, BoxedValue, ConstructorFn, Resolved};

/// Options for a typed registration: an instance name, a group, or neither.
#[derive(Debug, Clone, Default)]
pub struct ProvideOptions {
    name: Option<String>,
    group: Option<String>,
}

impl ProvideOptions {
    /// No name, no group.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the result under an instance name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Register the result into a named group.
    pub fn group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    /// Apply the options to a bare result key.
    pub(crate) fn apply(&self, mut key: Key) -> Key {
        if let Some(name) = &self.name {
            key = key.with_name(name.clone());
        }
        if let Some(group) = &self.group {
            key = key.with_group(group.clone());
        }
        key
    }
}

/// Options for a passive registration.
#[derive(Debug, Clone, Default)]
pub struct PassiveOptions {
    name_index: usize,
}

impl PassiveOptions {
    /// Name argument at position 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select which argument position carries the requested name.
    pub fn name_index(mut self, index: usize) -> Self {
        self.name_index = index;
        self
    }

    pub(crate) fn index(&self) -> usize {
        self.name_index
    }
}

/// A value the container can supply as a constructor argument.
pub trait Injected: Sized + Send + Sync + 'static {
    /// Descriptor for this argument.
    fn param() -> Param;

    /// Extract the typed value from a resolved descriptor.
    fn extract(resolved: &Resolved) -> Result<Self>;
}

impl<T: Send + Sync + 'static> Injected for Arc<T> {
    fn param() -> Param {
        Param::single::<T>()
    }

    fn extract(resolved: &Resolved) -> Result<Self> {
        resolved.value::<T>()
    }
}

impl Injected for String {
    fn param() -> Param {
        Param::single::<String>()
    }

    fn extract(resolved: &Resolved) -> Result<Self> {
        Ok((*resolved.value::<String>()?).clone())
    }
}

/// An infallible typed constructor.
pub trait Constructor<Args>: Send + Sync + 'static {
    /// The type this constructor produces.
    type Output: Send + Sync + 'static;

    /// Argument descriptors, in call order.
    fn params() -> Vec<Param>;

    /// Erase into the graph core's constructor shape.
    fn erase(self) -> Arc<ConstructorFn>;
}

/// A typed constructor returning `Result`; the error is surfaced verbatim.
pub trait TryConstructor<Args>: Send + Sync + 'static {
    /// The type this constructor produces on success.
    type Output: Send + Sync + 'static;

    /// Argument descriptors, in call order.
    fn params() -> Vec<Param>;

    /// Erase into the graph core's constructor shape.
    fn erase(self) -> Arc<ConstructorFn>;
}

/// A callable whose arguments the container resolves before invocation.
pub trait InvokeHandler<Args> {
    /// The callable's return value.
    type Output;

    /// Argument descriptors, in call order.
    fn params() -> Vec<Param>;

    /// Call with resolved arguments.
    fn call(self, args: Vec<Resolved>) -> Result<Self::Output>;
}

macro_rules! impl_callables {
    ($($arg:ident => $idx:tt),*) => {
        impl<F, Out, $($arg,)*> Constructor<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> Out + Send + Sync + 'static,
            Out: Send + Sync + 'static,
            $($arg: Injected,)*
        {
            type Output = Out;

            fn params() -> Vec<Param> {
                vec![$($arg::param()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn erase(self) -> Arc<ConstructorFn> {
                Arc::new(move |args: Vec<Resolved>| {
                    $(let $arg = $arg::extract(&args[$idx])
                        .map_err(|e| Box::new(e) as BoxedError)?;)*
                    let out = (self)($($arg),*);
                    Ok(vec![Arc::new(out) as BoxedValue])
                })
            }
        }

        impl<F, Out, Err, $($arg,)*> TryConstructor<($($arg,)*)> for F
        where
            F: Fn($($arg),*) -> std::result::Result<Out, Err> + Send + Sync + 'static,
            Out: Send + Sync + 'static,
            Err: std::error::Error + Send + Sync + 'static,
            $($arg: Injected,)*
        {
            type Output = Out;

            fn params() -> Vec<Param> {
                vec![$($arg::param()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn erase(self) -> Arc<ConstructorFn> {
                Arc::new(move |args: Vec<Resolved>| {
                    $(let $arg = $arg::extract(&args[$idx])
                        .map_err(|e| Box::new(e) as BoxedError)?;)*
                    let out = (self)($($arg),*).map_err(|e| Box::new(e) as BoxedError)?;
                    Ok(vec![Arc::new(out) as BoxedValue])
                })
            }
        }

        impl<F, Out, $($arg,)*> InvokeHandler<($($arg,)*)> for F
        where
            F: FnOnce($($arg),*) -> Out,
            $($arg: Injected,)*
        {
            type Output = Out;

            fn params() -> Vec<Param> {
                vec![$($arg::param()),*]
            }

            #[allow(non_snake_case, unused_variables)]
            fn call(self, args: Vec<Resolved>) -> Result<Out> {
                $(let $arg = $arg::extract(&args[$idx])?;)*
                Ok((self)($($arg),*))
            }
        }
    };
}

impl_callables!();
impl_callables!(A0 => 0);
impl_callables!(A0 => 0, A1 => 1);
impl_callables!(A0 => 0, A1 => 1, A2 => 2);
impl_callables!(A0 => 0, A1 => 1, A2 => 2, A3 => 3);
