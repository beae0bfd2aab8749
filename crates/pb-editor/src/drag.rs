//! Drag gesture state machine.
//!
//! `Idle → Dragging → (committed | cancelled) → Idle`.
//!
//! While dragging, every `drag_over` re-runs the [`PlacementResolver`] and
//! caches the latest valid [`DropPosition`]; for palette items, invalid
//! surfaces leave the cache alone so the indicator doesn't flicker. `drag_end` consumes the cache
//! exactly once, applies at most one tree edit through the
//! [`HistoryManager`], and always returns to idle with the cache cleared.

use crate::history::HistoryManager;
use crate::placement::{DragSource, DropPosition, DropTarget, PlacementResolver, PointerSample};
use pb_core::store;
use pb_core::{Component, ComponentTree, NodeId, Relation};

/// Where the gesture currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging { source: DragSource },
}

/// What a finished gesture did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    /// Released over nothing, or cancelled explicitly. No edit attempted.
    Cancelled,
    /// Released over a target, but the edit changed nothing.
    Unchanged,
    /// A palette item became this new node.
    Inserted(NodeId),
    /// This existing node was reordered.
    Moved(NodeId),
}

impl DragOutcome {
    pub fn committed(self) -> bool {
        matches!(self, DragOutcome::Inserted(_) | DragOutcome::Moved(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DragController {
    phase: DragPhase,
    drop_position: Option<DropPosition>,
    resolver: PlacementResolver,
}

impl DragController {
    pub fn new(resolver: PlacementResolver) -> Self {
        Self {
            phase: DragPhase::Idle,
            drop_position: None,
            resolver,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, DragPhase::Dragging { .. })
    }

    /// What is being dragged, if anything.
    pub fn active(&self) -> Option<DragSource> {
        match self.phase {
            DragPhase::Idle => None,
            DragPhase::Dragging { source } => Some(source),
        }
    }

    /// The cached intent, for drawing the drop indicator.
    pub fn drop_indicator(&self) -> Option<DropPosition> {
        self.drop_position
    }

    /// Begin a gesture. A stale intent from an earlier gesture is dropped.
    pub fn drag_start(&mut self, source: DragSource) {
        if let DragPhase::Dragging { source: previous } = self.phase {
            log::warn!("drag: start {source:?} while {previous:?} still active; restarting");
        }
        self.phase = DragPhase::Dragging { source };
        self.drop_position = None;
    }

    /// Pointer moved over `over`. For a palette item, updates the cached
    /// intent when `over` is a valid surface and otherwise keeps the previous
    /// one. For an existing node, the intent is the sibling slot the move
    /// would land in, or nothing.
    pub fn drag_over(
        &mut self,
        tree: &ComponentTree,
        over: DropTarget,
        pointer: Option<PointerSample>,
    ) -> Option<DropPosition> {
        let DragPhase::Dragging { source } = self.phase else {
            return None;
        };
        let resolved = self.resolver.resolve(tree, source, over, pointer);
        if resolved.is_some() && resolved != self.drop_position {
            log::debug!("drag: intent {resolved:?}");
        }
        match (source, resolved) {
            (_, Some(position)) => self.drop_position = Some(position),
            // A reorder shows exactly what releasing here would do.
            (DragSource::Node(_), None) => self.drop_position = None,
            (DragSource::Palette(_), None) => {
                log::trace!("drag: {over:?} is not a drop surface, keeping intent");
            }
        }
        self.drop_position
    }

    /// Abort the gesture without touching the tree.
    pub fn drag_cancel(&mut self) {
        if self.is_dragging() {
            log::debug!("drag: cancelled");
        }
        self.reset();
    }

    /// Finish the gesture over `over` (`None` = released over nothing).
    pub fn drag_end(
        &mut self,
        history: &mut HistoryManager,
        over: Option<DropTarget>,
    ) -> DragOutcome {
        let phase = self.phase;
        let cached = self.drop_position;
        self.reset();

        let DragPhase::Dragging { source } = phase else {
            log::warn!("drag: end without an active drag");
            return DragOutcome::Cancelled;
        };
        let Some(over) = over else {
            log::debug!("drag: released over nothing, cancelled");
            return DragOutcome::Cancelled;
        };

        match source {
            DragSource::Palette(kind) => {
                let tree = history.present();
                let node = store::create_default_node(tree, kind);
                let new_id = node.id;
                let Some(position) = cached.or_else(|| self.fallback_position(tree, source, over))
                else {
                    log::debug!("drag: no placement for {kind} over {over:?}");
                    return DragOutcome::Unchanged;
                };
                let next = apply_insertion(tree, position, node);
                if history.commit(next) {
                    log::info!("drag: inserted {new_id} at {position:?}");
                    DragOutcome::Inserted(new_id)
                } else {
                    DragOutcome::Unchanged
                }
            }
            DragSource::Node(active) => {
                let Some(over_id) = over.node() else {
                    return DragOutcome::Unchanged;
                };
                if active == over_id {
                    return DragOutcome::Unchanged;
                }
                let next = store::move_node(history.present(), active, over_id);
                if history.commit(next) {
                    log::info!("drag: moved {active} to {over_id}'s slot");
                    DragOutcome::Moved(active)
                } else {
                    DragOutcome::Unchanged
                }
            }
        }
    }

    /// Intent for a palette drop that never saw a valid `drag_over`: resolve
    /// without a pointer, and for a plain node insert before it.
    fn fallback_position(
        &self,
        tree: &ComponentTree,
        source: DragSource,
        over: DropTarget,
    ) -> Option<DropPosition> {
        self.resolver
            .resolve(tree, source, over, None)
            .or_else(|| match over {
                DropTarget::Node(target) if tree.contains(target) => Some(DropPosition::Sibling {
                    target,
                    relation: Relation::Before,
                }),
                _ => None,
            })
    }

    fn reset(&mut self) {
        self.phase = DragPhase::Idle;
        self.drop_position = None;
    }
}

/// Apply a palette insertion. A nest the store refuses falls back to
/// inserting after the container.
fn apply_insertion(tree: &ComponentTree, position: DropPosition, node: Component) -> ComponentTree {
    match position {
        DropPosition::AppendRoot => store::insert_at_root(tree, node),
        DropPosition::Nest(container) => match store::try_nest_into(tree, container, node.clone()) {
            Ok(next) => next,
            Err(err) => {
                log::debug!("drag: {err}; inserting after {container} instead");
                store::insert_at(tree, container, Relation::After, node)
            }
        },
        DropPosition::Sibling { target, relation } => store::insert_at(tree, target, relation, node),
    }
}
