//! Error handling types

use crate::key::Key;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// One failing field inside an aggregated object-argument failure.
#[derive(Error, Debug)]
#[error("field `{field}`: {error}")]
pub struct FieldError {
    /// Name of the field that could not be resolved
    pub field: String,

    /// Underlying resolution failure for that field
    pub error: Error,
}

/// Main error type for the wireup container
#[derive(Error, Debug)]
pub enum Error {
    /// A provider constructor has an invalid shape (registration-time defect)
    #[error("invalid provider shape: {message}")]
    InvalidProviderShape {
        /// Description of the shape violation
        message: String,
    },

    /// An interceptor constructor has an invalid shape (registration-time defect)
    #[error("invalid interceptor shape: {message}")]
    InvalidInterceptorShape {
        /// Description of the shape violation
        message: String,
    },

    /// No cached value, no provider, and no matching interceptor for a key
    #[error("no value or provider for {key}")]
    UnresolvedDependency {
        /// The key that could not be satisfied
        key: Key,
    },

    /// Resolution re-entered a key already being resolved on this call stack
    #[error("cyclic dependency: {}", render_path(.path))]
    CyclicDependency {
        /// Key path from the outermost resolution down to the repeated key
        path: Vec<Key>,
    },

    /// A positional constructor argument failed to resolve
    #[error("argument {index} failed: {source}")]
    ArgumentFailed {
        /// Zero-based position of the failing argument
        index: usize,
        /// Underlying resolution failure
        source: Box<Error>,
    },

    /// One or more object fields failed to resolve; every failing field is
    /// collected, not just the first
    #[error("unresolvable object arguments: {}", render_fields(.fields))]
    ArgumentsFailed {
        /// Each failing field with its underlying cause
        fields: Vec<FieldError>,
    },

    /// A user constructor returned an error; the message is preserved verbatim
    #[error("constructor for {key} failed: {source}")]
    Constructor {
        /// The key the constructor was building
        key: Key,
        /// The constructor's own error
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A stored value did not downcast to the requested type
    #[error("type mismatch: expected {expected}")]
    TypeMismatch {
        /// Type name the caller asked for
        expected: &'static str,
    },
}

impl Error {
    /// Shorthand for [`Error::InvalidProviderShape`].
    pub fn provider_shape(message: impl Into<String>) -> Self {
        Error::InvalidProviderShape {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::InvalidInterceptorShape`].
    pub fn interceptor_shape(message: impl Into<String>) -> Self {
        Error::InvalidInterceptorShape {
            message: message.into(),
        }
    }
}

fn render_path(path: &[Key]) -> String {
    path.iter()
        .map(Key::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn render_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
