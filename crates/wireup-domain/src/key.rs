//! Key identity for resolvable slots
//!
//! A [`Key`] uniquely identifies one slot in the container: the Rust type of
//! the value, an optional instance name, and an optional group name. Two keys
//! are equal iff type, name, and group all match. The human-readable type
//! name is carried alongside the `TypeId` for diagnostics only and does not
//! participate in equality or hashing.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Identity tuple `(type, name, group)` for a resolvable value.
///
/// Name and group default to empty (unnamed, ungrouped). A grouped key never
/// carries an instance name; the two dimensions are mutually exclusive at
/// registration time.
///
/// # Example
///
/// ```
/// use wireup_domain::Key;
///
/// struct Db;
///
/// let unnamed = Key::of::<Db>();
/// let named = Key::of::<Db>().with_name("db_alpha");
/// assert_ne!(unnamed, named);
/// assert_eq!(named, Key::of::<Db>().with_name("db_alpha"));
/// ```
#[derive(Debug, Clone, Eq)]
pub struct Key {
    /// Runtime identity of the value type
    type_id: TypeId,

    /// Human-readable type name, for Display and error messages
    type_name: &'static str,

    /// Instance name, empty when unnamed
    name: String,

    /// Group name, empty when ungrouped
    group: String,
}

impl Key {
    /// Create an unnamed, ungrouped key for `T`.
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: String::new(),
            group: String::new(),
        }
    }

    /// Return a copy of this key with the given instance name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Return a copy of this key with the given group name.
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = group.into();
        self
    }

    /// Runtime type identity.
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable type name.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Instance name, empty when unnamed.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Group name, empty when ungrouped.
    pub fn group(&self) -> &str {
        &self.group
    }

    /// Whether this key addresses a grouped collection.
    pub fn is_grouped(&self) -> bool {
        !self.group.is_empty()
    }

    /// The same key with name and group stripped. Interceptor lookup matches
    /// on the bare type, ignoring the requested name.
    pub fn bare(&self) -> Self {
        Self {
            type_id: self.type_id,
            type_name: self.type_name,
            name: String::new(),
            group: String::new(),
        }
    }
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name && self.group == other.group
    }
}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
        self.group.hash(state);
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name)?;
        if !self.name.is_empty() {
            write!(f, "[name=\"{}\"]", self.name)?;
        }
        if !self.group.is_empty() {
            write!(f, "[group=\"{}\"]", self.group)?;
        }
        Ok(())
    }
}
