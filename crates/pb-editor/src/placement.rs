//! Placement resolution: where would a drop land right now?
//!
//! Given what is being dragged, the surface under the pointer and the
//! pointer's position inside that surface, compute a [`DropPosition`].
//! Resolution is pure and cheap: it reads the tree, never copies or edits
//! it, and runs on every pointer move.
//!
//! ## Rules
//!
//! | Surface | Pointer | Result |
//! |---------|---------|--------|
//! | canvas | any | append to root list |
//! | container, nestable | none, or inside the nest zone | nest |
//! | container, nestable | in the top/bottom edge band | before / after (midpoint) |
//! | container at depth limit | any | before / after (midpoint, `after` without pointer) |
//! | anything else | any | rejected |
//!
//! Dragging an existing node is a reorder, not a placement: the only intent
//! it can have is "take the slot of this sibling", which lands before the
//! sibling when moving up and after it when moving down. Any other surface
//! (the canvas, a container in another list, the node itself) has no intent.

use kurbo::{Point, Rect};
use pb_core::{ComponentTree, ComponentType, NodeId, Relation};
use serde::{Deserialize, Serialize};

/// Wire id of the canvas surface.
pub const CANVAS_ID: &str = "canvas";

/// Wire prefix for palette drag sources (`tool-heading`).
pub const PALETTE_PREFIX: &str = "tool-";

/// What is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragSource {
    /// A palette item: create a new node of this type on drop.
    Palette(ComponentType),
    /// An existing node being reordered.
    Node(NodeId),
}

impl DragSource {
    /// Parse a wire id: `tool-<type>` is a palette item, anything else an
    /// existing node id. An unknown palette type is treated as a node id and
    /// will simply not be found.
    pub fn parse(raw: &str) -> Self {
        raw.strip_prefix(PALETTE_PREFIX)
            .and_then(ComponentType::from_name)
            .map(DragSource::Palette)
            .unwrap_or_else(|| DragSource::Node(NodeId::intern(raw)))
    }
}

/// A drop surface: the page canvas or a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DropTarget {
    Canvas,
    Node(NodeId),
}

impl DropTarget {
    pub fn parse(raw: &str) -> Self {
        if raw == CANVAS_ID {
            DropTarget::Canvas
        } else {
            DropTarget::Node(NodeId::intern(raw))
        }
    }

    pub fn node(self) -> Option<NodeId> {
        match self {
            DropTarget::Canvas => None,
            DropTarget::Node(id) => Some(id),
        }
    }
}

/// Pending insertion intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropPosition {
    /// Append to the root list (dropped on the canvas).
    AppendRoot,
    /// Append into this container's children.
    Nest(NodeId),
    /// Insert next to `target` in its list.
    Sibling { target: NodeId, relation: Relation },
}

/// Pointer position plus the bounding box of the surface it is over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub position: Point,
    pub bounds: Rect,
}

impl PointerSample {
    pub fn new(position: Point, bounds: Rect) -> Self {
        Self { position, bounds }
    }

    /// Above the vertical midpoint → before; at or below → after.
    pub fn half(&self) -> Relation {
        if self.position.y < self.bounds.center().y {
            Relation::Before
        } else {
            Relation::After
        }
    }
}

/// Computes drop intent from gesture state. Holds only tuning, no gesture
/// state of its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementResolver {
    /// Height of the top/bottom "insert beside" bands of a container.
    pub edge_band: f64,
}

impl Default for PlacementResolver {
    fn default() -> Self {
        Self { edge_band: 8.0 }
    }
}

impl PlacementResolver {
    pub fn new(edge_band: f64) -> Self {
        Self { edge_band }
    }

    /// The canvas and containers are drop surfaces; nothing else is.
    pub fn is_valid_surface(tree: &ComponentTree, target: DropTarget) -> bool {
        match target {
            DropTarget::Canvas => true,
            DropTarget::Node(id) => tree.is_container(id),
        }
    }

    /// Resolve the drop intent, or `None` if `target` cannot take this drop.
    pub fn resolve(
        &self,
        tree: &ComponentTree,
        source: DragSource,
        target: DropTarget,
        pointer: Option<PointerSample>,
    ) -> Option<DropPosition> {
        if let DragSource::Node(active) = source {
            return Self::resolve_move(tree, active, target);
        }
        if !Self::is_valid_surface(tree, target) {
            return None;
        }
        let container = match target {
            DropTarget::Canvas => return Some(DropPosition::AppendRoot),
            DropTarget::Node(id) => id,
        };

        if !tree.can_nest_into(container) {
            let relation = pointer.map_or(Relation::After, |p| p.half());
            return Some(DropPosition::Sibling {
                target: container,
                relation,
            });
        }

        match pointer {
            Some(p) if self.in_edge_band(&p) => Some(DropPosition::Sibling {
                target: container,
                relation: p.half(),
            }),
            _ => Some(DropPosition::Nest(container)),
        }
    }

    /// Where an array-move of `active` onto `target` leaves it, expressed
    /// relative to `target`. `None` unless both sit in the same list.
    pub fn resolve_move(
        tree: &ComponentTree,
        active: NodeId,
        target: DropTarget,
    ) -> Option<DropPosition> {
        let over = target.node()?;
        if active == over || tree.parent_of(active) != tree.parent_of(over) {
            return None;
        }
        let from = tree.index_in_list(active)?;
        let to = tree.index_in_list(over)?;
        let relation = if from > to {
            Relation::Before
        } else {
            Relation::After
        };
        Some(DropPosition::Sibling {
            target: over,
            relation,
        })
    }

    /// True when the pointer sits in the top or bottom edge band. The band is
    /// capped at a quarter of the height so small containers keep a nest zone.
    fn in_edge_band(&self, pointer: &PointerSample) -> bool {
        let band = self.edge_band.min(pointer.bounds.height() / 4.0);
        if band <= 0.0 {
            return false;
        }
        let y = pointer.position.y;
        y - pointer.bounds.y0 < band || pointer.bounds.y1 - y <= band
    }
}
