//! Generic descriptor traversal
//!
//! Pre-order walk over a [`Param`] tree. The visitor decides, per node,
//! whether to descend: returning `false` prunes the subtree. Single and
//! group descriptors are terminal leaves; list and object descriptors are
//! pure containers, so pruning them is the only way to skip their children.
//!
//! Both the resolution engine and the interception check traverse descriptor
//! trees through this module, so each visits every leaf exactly once per
//! pass without duplicating traversal logic.

use crate::param::Param;

/// Visitor over a descriptor tree.
pub trait ParamVisitor {
    /// Visit one node. Return `false` to skip the node's children.
    fn visit(&mut self, param: &Param) -> bool;
}

impl<F> ParamVisitor for F
where
    F: FnMut(&Param) -> bool,
{
    fn visit(&mut self, param: &Param) -> bool {
        self(param)
    }
}

/// Pre-order traversal of `param`, honoring the visitor's pruning decisions.
pub fn walk_param(param: &Param, visitor: &mut impl ParamVisitor) {
    if !visitor.visit(param) {
        return;
    }
    match param {
        Param::Single(_) | Param::Group(_) => {}
        Param::List(items) => {
            for item in items {
                walk_param(item, visitor);
            }
        }
        Param::Object(fields) => {
            for field in fields {
                walk_param(&field.param, visitor);
            }
        }
    }
}

/// Collect the keys of every single/group leaf in `param`, in pre-order.
pub fn leaf_keys(param: &Param) -> Vec<crate::key::Key> {
    let mut keys = Vec::new();
    walk_param(param, &mut |p: &Param| match p {
        Param::Single(single) => {
            keys.push(single.key.clone());
            false
        }
        Param::Group(group) => {
            keys.push(group.key.clone());
            false
        }
        _ => true,
    });
    keys
}
