//! Error taxonomy for tree edits.
//!
//! None of these escape the absorbing API in [`crate::store`]: a failed edit
//! returns the input tree unchanged. The `try_*` forms surface them so callers
//! can tell a no-op from a change.

use crate::id::NodeId;
use thiserror::Error;

/// Why a tree edit was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("node `{0}` is not in the tree")]
    NotFound(NodeId),

    #[error("`{id}` would sit at depth {depth}, past the nesting limit")]
    InvalidNesting { id: NodeId, depth: usize },

    #[error("`{0}` is not a container")]
    NotAContainer(NodeId),

    #[error("id `{0}` is already used in the tree")]
    DuplicateId(NodeId),

    #[error("`{id}` has heading level {level}, expected 1 to 6")]
    InvalidLevel { id: NodeId, level: u8 },

    #[error("`{0}` cannot be moved onto itself")]
    SameNode(NodeId),

    #[error("`{active}` and `{over}` are not in the same list")]
    DifferentLists { active: NodeId, over: NodeId },

    #[error("nothing to {0}")]
    EmptyHistory(&'static str),
}

/// Structural problems found while building a tree from nested components.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("id `{0}` appears more than once")]
    DuplicateId(NodeId),

    #[error("`{0}` is not a container but has children")]
    ChildrenOnLeaf(NodeId),

    #[error("`{id}` sits at depth {depth}, past the nesting limit")]
    TooDeep { id: NodeId, depth: usize },

    #[error("`{id}` has heading level {level}, expected 1 to 6")]
    InvalidLevel { id: NodeId, level: u8 },
}
