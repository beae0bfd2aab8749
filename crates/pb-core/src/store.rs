//! Pure tree-edit operations.
//!
//! Every operation takes the current tree by reference and returns a new
//! tree; the input is never modified. Each one comes in two forms:
//!
//! - `try_*` returns `Result<ComponentTree, EditError>` so callers can see
//!   why an edit did nothing.
//! - the plain form absorbs the error, logs it at debug level and hands back
//!   a tree structurally identical to the input.
//!
//! Nesting policy lives with the caller: `nest_into` refuses containers at
//! the depth limit but never silently turns the request into a sibling
//! insertion. That fallback belongs to the placement resolver.

use crate::error::EditError;
use crate::id::NodeId;
use crate::model::*;
use std::collections::HashSet;

/// A new node of `kind` with default props and an id fresh for `tree`.
pub fn create_default_node(tree: &ComponentTree, kind: ComponentType) -> Component {
    Component::new(tree.fresh_id(kind), Props::default_for(kind))
}

// ─── Insertion ───────────────────────────────────────────────────────────

/// Append `node` to the root list.
pub fn insert_at_root(tree: &ComponentTree, node: Component) -> ComponentTree {
    absorb(tree, "insert_at_root", try_insert_at_root(tree, node))
}

pub fn try_insert_at_root(
    tree: &ComponentTree,
    node: Component,
) -> Result<ComponentTree, EditError> {
    check_insertable(tree, &node, 0)?;
    let mut next = tree.clone();
    let end = next.roots().len();
    next.attach(node, None, end);
    Ok(next)
}

/// Insert `node` immediately before or after `target`, in whichever list
/// holds `target`.
pub fn insert_at(
    tree: &ComponentTree,
    target: NodeId,
    relation: Relation,
    node: Component,
) -> ComponentTree {
    absorb(tree, "insert_at", try_insert_at(tree, target, relation, node))
}

pub fn try_insert_at(
    tree: &ComponentTree,
    target: NodeId,
    relation: Relation,
    node: Component,
) -> Result<ComponentTree, EditError> {
    let entry = tree.get(target).ok_or(EditError::NotFound(target))?;
    let parent = entry.parent;
    let depth = tree.depth_of(target).ok_or(EditError::NotFound(target))?;
    let index = tree
        .index_in_list(target)
        .ok_or(EditError::NotFound(target))?;
    check_insertable(tree, &node, depth)?;

    let index = match relation {
        Relation::Before => index,
        Relation::After => index + 1,
    };
    let mut next = tree.clone();
    next.attach(node, parent, index);
    Ok(next)
}

/// Append `node` to `container`'s children, if `container` can still take
/// children.
pub fn nest_into(tree: &ComponentTree, container: NodeId, node: Component) -> ComponentTree {
    absorb(tree, "nest_into", try_nest_into(tree, container, node))
}

pub fn try_nest_into(
    tree: &ComponentTree,
    container: NodeId,
    node: Component,
) -> Result<ComponentTree, EditError> {
    let entry = tree.get(container).ok_or(EditError::NotFound(container))?;
    if !entry.component_type().is_container() {
        return Err(EditError::NotAContainer(container));
    }
    let depth = tree
        .depth_of(container)
        .ok_or(EditError::NotFound(container))?;
    if depth >= MAX_NESTING_DEPTH {
        return Err(EditError::InvalidNesting {
            id: node.id,
            depth: depth + 1,
        });
    }
    check_insertable(tree, &node, depth + 1)?;

    let end = entry.children.len();
    let mut next = tree.clone();
    next.attach(node, Some(container), end);
    Ok(next)
}

/// Validate that `node` may be placed at `depth`: ids unused in the tree and
/// within itself, children only on containers, heading levels in range,
/// deepest level within limit.
fn check_insertable(tree: &ComponentTree, node: &Component, depth: usize) -> Result<(), EditError> {
    let mut seen = HashSet::new();
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if tree.contains(current.id) || !seen.insert(current.id) {
            return Err(EditError::DuplicateId(current.id));
        }
        if !current.children.is_empty() && !current.component_type().is_container() {
            return Err(EditError::NotAContainer(current.id));
        }
        if let Some(level) = current.props.invalid_level() {
            return Err(EditError::InvalidLevel {
                id: current.id,
                level,
            });
        }
        stack.extend(current.children.iter());
    }

    let deepest = depth + node.height();
    if deepest > MAX_NESTING_DEPTH {
        return Err(EditError::InvalidNesting {
            id: node.id,
            depth: deepest,
        });
    }
    Ok(())
}

// ─── Reorder ─────────────────────────────────────────────────────────────

/// Move `active` to the slot `over` occupies in their shared list.
pub fn move_node(tree: &ComponentTree, active: NodeId, over: NodeId) -> ComponentTree {
    absorb(tree, "move_node", try_move_node(tree, active, over))
}

pub fn try_move_node(
    tree: &ComponentTree,
    active: NodeId,
    over: NodeId,
) -> Result<ComponentTree, EditError> {
    let active_entry = tree.get(active).ok_or(EditError::NotFound(active))?;
    let over_entry = tree.get(over).ok_or(EditError::NotFound(over))?;
    if active == over {
        return Err(EditError::SameNode(active));
    }
    if active_entry.parent != over_entry.parent {
        return Err(EditError::DifferentLists { active, over });
    }
    let parent = active_entry.parent;
    let from = tree
        .index_in_list(active)
        .ok_or(EditError::NotFound(active))?;
    let to = tree.index_in_list(over).ok_or(EditError::NotFound(over))?;

    let mut next = tree.clone();
    let list = next.list_mut(parent);
    let moved = list.remove(from);
    list.insert(to, moved);
    Ok(next)
}

// ─── Duplicate / delete ──────────────────────────────────────────────────

/// Clone the subtree at `id` with fresh ids throughout and place the clone
/// right after the original.
pub fn duplicate(tree: &ComponentTree, id: NodeId) -> ComponentTree {
    match try_duplicate(tree, id) {
        Ok((next, _)) => next,
        Err(err) => absorb(tree, "duplicate", Err(err)),
    }
}

/// Like [`duplicate`], also returning the id of the clone's root.
pub fn try_duplicate(
    tree: &ComponentTree,
    id: NodeId,
) -> Result<(ComponentTree, NodeId), EditError> {
    let original = tree.component(id).ok_or(EditError::NotFound(id))?;
    let parent = tree.parent_of(id);
    let index = tree.index_in_list(id).ok_or(EditError::NotFound(id))?;

    let mut next = tree.clone();
    let clone = reassign_ids(&mut next, original);
    let clone_id = clone.id;
    next.attach(clone, parent, index + 1);
    Ok((next, clone_id))
}

fn reassign_ids(tree: &mut ComponentTree, component: Component) -> Component {
    let Component {
        id: _,
        props,
        children,
    } = component;
    let id = tree.allocate_id(props.component_type());
    let children = children
        .into_iter()
        .map(|child| reassign_ids(tree, child))
        .collect();
    Component {
        id,
        props,
        children,
    }
}

/// Remove `id` and its entire subtree.
pub fn delete(tree: &ComponentTree, id: NodeId) -> ComponentTree {
    absorb(tree, "delete", try_delete(tree, id))
}

pub fn try_delete(tree: &ComponentTree, id: NodeId) -> Result<ComponentTree, EditError> {
    if !tree.contains(id) {
        return Err(EditError::NotFound(id));
    }
    let mut next = tree.clone();
    next.detach(id);
    Ok(next)
}

/// Ids that `delete(tree, id)` would remove, in pre-order. Callers use this
/// to drop selections that point into the deleted subtree.
pub fn removed_ids(tree: &ComponentTree, id: NodeId) -> Vec<NodeId> {
    tree.subtree_ids(id)
}

// ─── Props ───────────────────────────────────────────────────────────────

/// Merge `patch` into `id`'s props, leaving unset fields untouched.
pub fn update_props(tree: &ComponentTree, id: NodeId, patch: &PropsPatch) -> ComponentTree {
    absorb(tree, "update_props", try_update_props(tree, id, patch))
}

pub fn try_update_props(
    tree: &ComponentTree,
    id: NodeId,
    patch: &PropsPatch,
) -> Result<ComponentTree, EditError> {
    let mut next = tree.clone();
    let props = next.props_mut(id).ok_or(EditError::NotFound(id))?;
    props.merge(patch);
    Ok(next)
}

fn absorb(
    tree: &ComponentTree,
    op: &str,
    result: Result<ComponentTree, EditError>,
) -> ComponentTree {
    match result {
        Ok(next) => next,
        Err(err) => {
            log::debug!("{op}: {err}; tree unchanged");
            tree.clone()
        }
    }
}
