//! # wireup
//!
//! A type-keyed dependency-resolution container. Callers register
//! constructors ("providers") and already-built values ("objects"), then
//! request any value by type, name, or group; the container recursively
//! builds whatever the request needs, memoizing every result.
//!
//! ```text
//! request (Param tree)          graph core
//! ────────────────────          ──────────
//! Single / List /         →    value cache → provider node → constructor
//! Object / Group                      ↓ (miss)
//!                               interceptor registry
//!                                      ↓ (match)
//!                               synthesized provider for the exact key
//! ```
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`container`] | Public container: registration, resolution, invocation |
//! | [`registry`] | Provider nodes, group indexes, value cache |
//! | [`resolver`] | Depth-first memoized resolution with cycle detection |
//! | [`intercept`] | Passive providers, consulted only on resolution misses |
//! | [`provide`] | Typed constructor/handler erasure and options |
//! | [`node`] | Graph vertices and resolved values |

/// Public container surface
pub mod container;
/// Passive provider interception
pub mod intercept;
/// Graph vertices and resolved values
pub mod node;
/// Typed registration and invocation layer
pub mod provide;
/// Provider registry and value cache
pub mod registry;
/// Graph resolution engine
pub mod resolver;

// Re-export commonly used types
pub use container::Container;
pub use intercept::InterceptorSpec;
pub use node::{BoxedError, BoxedValue, Resolved};
pub use provide::{Constructor, Injected, InvokeHandler, PassiveOptions, ProvideOptions, TryConstructor};
pub use registry::ConstructorSpec;

// Domain vocabulary, re-exported for callers
pub use wireup_domain::error::FieldError;
pub use wireup_domain::{Error, Key, Param, Result};
