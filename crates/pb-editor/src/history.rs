//! Undo/Redo history over whole-tree snapshots.
//!
//! Every committed edit replaces the present tree with a new snapshot and
//! pushes the old one onto `past`. Undo and redo shuffle snapshots between
//! the three slots; nothing is recomputed, so an undo followed by a redo
//! always restores the exact tree that was present before the undo.

use pb_core::{ComponentTree, EditError};
use std::collections::VecDeque;

/// The three-slot history value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryState {
    /// Oldest first.
    pub past: VecDeque<ComponentTree>,
    pub present: ComponentTree,
    /// Next redo first.
    pub future: VecDeque<ComponentTree>,
}

/// Manages the undo/redo stacks around the current tree.
#[derive(Debug, Clone, Default)]
pub struct HistoryManager {
    state: HistoryState,
    /// Maximum undo depth. `None` = unbounded.
    limit: Option<usize>,
}

impl HistoryManager {
    pub fn new(initial: ComponentTree) -> Self {
        Self {
            state: HistoryState {
                present: initial,
                ..Default::default()
            },
            limit: None,
        }
    }

    /// History that keeps at most `limit` undo steps, dropping the oldest.
    pub fn with_limit(initial: ComponentTree, limit: Option<usize>) -> Self {
        Self {
            limit,
            ..Self::new(initial)
        }
    }

    pub fn present(&self) -> &ComponentTree {
        &self.state.present
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn can_undo(&self) -> bool {
        !self.state.past.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.state.future.is_empty()
    }

    /// Make `tree` the present. The old present moves to `past`; `future` is
    /// discarded. This is the only way an edit becomes durable.
    pub fn set_state(&mut self, tree: ComponentTree) {
        let previous = std::mem::replace(&mut self.state.present, tree);
        self.push_past(previous);
        self.state.future.clear();
        log::info!(
            "history: commit ({} node(s), {} undo step(s))",
            self.state.present.len(),
            self.state.past.len()
        );
    }

    /// [`Self::set_state`] with the next tree computed from the present.
    pub fn update(&mut self, edit: impl FnOnce(&ComponentTree) -> ComponentTree) {
        let next = edit(&self.state.present);
        self.set_state(next);
    }

    /// Like [`Self::set_state`], but skips trees structurally equal to the
    /// present so no-op edits leave no undo entry. Returns true if committed.
    pub fn commit(&mut self, tree: ComponentTree) -> bool {
        if tree == self.state.present {
            log::debug!("history: edit left the tree unchanged, nothing recorded");
            return false;
        }
        self.set_state(tree);
        true
    }

    /// Step back one snapshot. No-op on empty history.
    pub fn undo(&mut self) -> bool {
        match self.try_undo() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("history: {err}");
                false
            }
        }
    }

    pub fn try_undo(&mut self) -> Result<(), EditError> {
        let previous = self
            .state
            .past
            .pop_back()
            .ok_or(EditError::EmptyHistory("undo"))?;
        let current = std::mem::replace(&mut self.state.present, previous);
        self.state.future.push_front(current);
        Ok(())
    }

    /// Step forward one snapshot. No-op when nothing was undone.
    pub fn redo(&mut self) -> bool {
        match self.try_redo() {
            Ok(()) => true,
            Err(err) => {
                log::debug!("history: {err}");
                false
            }
        }
    }

    pub fn try_redo(&mut self) -> Result<(), EditError> {
        let next = self
            .state
            .future
            .pop_front()
            .ok_or(EditError::EmptyHistory("redo"))?;
        let current = std::mem::replace(&mut self.state.present, next);
        self.push_past(current);
        Ok(())
    }

    fn push_past(&mut self, tree: ComponentTree) {
        self.state.past.push_back(tree);
        if let Some(limit) = self.limit {
            while self.state.past.len() > limit {
                self.state.past.pop_front();
            }
        }
    }
}
