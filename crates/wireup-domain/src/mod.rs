//! # Domain Layer
//!
//! Core vocabulary of the wireup container: how a resolvable slot is
//! identified, how a requirement is described, and how failures are reported.
//! This crate has no container state of its own; the `wireup` crate owns the
//! registry and the resolution engine.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`key`] | `(type, name, group)` identity tuple for resolvable slots |
//! | [`param`] | Parameter descriptor tree (single / list / object / group) |
//! | [`walk`] | Pre-order descriptor traversal with subtree pruning |
//! | [`error`] | Error taxonomy and the crate-wide `Result` alias |

/// Error taxonomy and Result alias
pub mod error;
/// Key identity tuple for resolvable slots
pub mod key;
/// Parameter descriptor tree
pub mod param;
/// Generic descriptor traversal
pub mod walk;

// Re-export commonly used types
pub use error::{Error, Result};
pub use key::Key;
pub use param::{Param, ParamField, ParamGroup, ParamSingle};
pub use walk::{ParamVisitor, walk_param};
