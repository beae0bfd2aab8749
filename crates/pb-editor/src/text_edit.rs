//! Inline text editing.
//!
//! Editing happens outside the tree: the host keeps the [`TextEdit`] token
//! while the user types and hands the final text back once. Only that final
//! commit touches history.

use pb_core::{ComponentTree, NodeId, PropsPatch};

/// An inline edit in progress on one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextEdit {
    pub id: NodeId,
    /// Text at the time editing began.
    pub original: String,
}

impl TextEdit {
    /// Start editing `id`. `None` if the node is gone or has no inline text.
    pub fn begin(tree: &ComponentTree, id: NodeId) -> Option<Self> {
        let text = tree.props(id)?.text()?;
        Some(Self {
            id,
            original: text.to_owned(),
        })
    }

    /// The patch to apply for `text`, trimmed. `None` when nothing changed.
    pub fn finish(&self, text: &str) -> Option<PropsPatch> {
        let trimmed = text.trim();
        if trimmed == self.original {
            return None;
        }
        Some(PropsPatch::text(trimmed))
    }
}
