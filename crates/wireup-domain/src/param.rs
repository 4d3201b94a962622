//! Parameter descriptor tree
//!
//! A [`Param`] describes *what must be resolved* to satisfy a request,
//! without holding any resolved value. The variant set is closed: the
//! resolution engine matches exhaustively and callers cannot extend it.
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | [`Param::Single`] | One keyed value |
//! | [`Param::List`] | Ordered sequence, e.g. positional constructor arguments |
//! | [`Param::Object`] | Named fields, each an independent descriptor |
//! | [`Param::Group`] | Every provider output registered under one group |

use crate::key::Key;

/// One keyed value requirement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamSingle {
    /// The slot this leaf resolves from
    pub key: Key,
}

/// A named field inside an [`Param::Object`] descriptor. Field identity is
/// the name; sibling order carries no meaning.
#[derive(Debug, Clone)]
pub struct ParamField {
    /// Field name, the discriminator among siblings
    pub name: String,

    /// Requirement for this field
    pub param: Param,
}

/// A grouped-collection requirement: all providers registered under the
/// group, assembled in registration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamGroup {
    /// Group key: element type plus group name, never an instance name
    pub key: Key,
}

/// Descriptor of a resolvable requirement.
#[derive(Debug, Clone)]
pub enum Param {
    /// One keyed value
    Single(ParamSingle),
    /// Ordered sequence of descriptors; order is significant and preserved
    List(Vec<Param>),
    /// Named fields, each with its own descriptor
    Object(Vec<ParamField>),
    /// All provider outputs registered under one group name
    Group(ParamGroup),
}

impl Param {
    /// Leaf requirement for an unnamed `T`.
    pub fn single<T: 'static>() -> Self {
        Param::Single(ParamSingle { key: Key::of::<T>() })
    }

    /// Leaf requirement for a `T` with the given instance name.
    pub fn named<T: 'static>(name: impl Into<String>) -> Self {
        Param::Single(ParamSingle {
            key: Key::of::<T>().with_name(name),
        })
    }

    /// Leaf requirement for an explicit key.
    pub fn from_key(key: Key) -> Self {
        if key.is_grouped() {
            Param::Group(ParamGroup { key })
        } else {
            Param::Single(ParamSingle { key })
        }
    }

    /// Ordered sequence requirement.
    pub fn list(params: impl IntoIterator<Item = Param>) -> Self {
        Param::List(params.into_iter().collect())
    }

    /// Named-field requirement.
    pub fn object<N: Into<String>>(fields: impl IntoIterator<Item = (N, Param)>) -> Self {
        Param::Object(
            fields
                .into_iter()
                .map(|(name, param)| ParamField {
                    name: name.into(),
                    param,
                })
                .collect(),
        )
    }

    /// Grouped-collection requirement for elements of type `T` under `group`.
    pub fn group<T: 'static>(group: impl Into<String>) -> Self {
        Param::Group(ParamGroup {
            key: Key::of::<T>().with_group(group),
        })
    }

    /// Whether this descriptor is a terminal leaf (single or group).
    pub fn is_leaf(&self) -> bool {
        matches!(self, Param::Single(_) | Param::Group(_))
    }
}
