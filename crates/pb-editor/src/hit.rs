//! Drop-surface hit testing: pointer → surface lookup.
//!
//! Walks the tree with the bounds the rendering layer reported and collects
//! every drop surface under the pointer (the canvas plus any container).
//! Nested containers overlap their ancestors, so more than one surface is
//! usually hit; [`closest_surface`] picks one:
//!
//! 1. smallest distance from the surface's bounding-box centre to the pointer;
//! 2. on an exact tie, the deeper surface (the canvas is shallowest of all);
//! 3. on a tie at equal depth, the later one in document order, which the
//!    renderer paints on top.

use crate::placement::DropTarget;
use kurbo::{Point, Rect};
use pb_core::{ComponentTree, NodeId};
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Rendered bounds per node, supplied by the rendering layer.
pub type BoundsMap = HashMap<NodeId, Rect>;

/// A candidate drop surface under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropSurface {
    pub target: DropTarget,
    pub bounds: Rect,
    /// Node depth; `None` for the canvas.
    pub depth: Option<usize>,
    /// Position in document (paint) order.
    pub order: usize,
}

impl DropSurface {
    fn distance_sq(&self, point: Point) -> f64 {
        (self.bounds.center() - point).hypot2()
    }
}

/// All drop surfaces whose bounds contain `point`, in document order.
/// Nodes without reported bounds are skipped, but their children are still
/// visited.
pub fn surfaces_at(
    tree: &ComponentTree,
    bounds: &BoundsMap,
    canvas: Rect,
    point: Point,
) -> SmallVec<[DropSurface; 8]> {
    let mut out = SmallVec::new();
    if canvas.contains(point) {
        out.push(DropSurface {
            target: DropTarget::Canvas,
            bounds: canvas,
            depth: None,
            order: 0,
        });
    }
    let mut order = 1;
    for &root in tree.roots() {
        collect_surfaces(tree, root, 0, bounds, point, &mut order, &mut out);
    }
    out
}

fn collect_surfaces(
    tree: &ComponentTree,
    id: NodeId,
    depth: usize,
    bounds: &BoundsMap,
    point: Point,
    order: &mut usize,
    out: &mut SmallVec<[DropSurface; 8]>,
) {
    if !tree.is_container(id) {
        return;
    }
    if let Some(rect) = bounds.get(&id)
        && rect.contains(point)
    {
        out.push(DropSurface {
            target: DropTarget::Node(id),
            bounds: *rect,
            depth: Some(depth),
            order: *order,
        });
    }
    *order += 1;

    for &child in tree.children(id) {
        collect_surfaces(tree, child, depth + 1, bounds, point, order, out);
    }
}

/// Pick the winning surface among `candidates` for `point`.
pub fn closest_surface(candidates: &[DropSurface], point: Point) -> Option<DropSurface> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| compare_surfaces(a, b, point))
}

/// `Less` means `a` wins.
fn compare_surfaces(a: &DropSurface, b: &DropSurface, point: Point) -> Ordering {
    a.distance_sq(point)
        .total_cmp(&b.distance_sq(point))
        .then_with(|| b.depth.cmp(&a.depth))
        .then_with(|| b.order.cmp(&a.order))
}

/// Hit-test and pick in one step.
pub fn surface_at(
    tree: &ComponentTree,
    bounds: &BoundsMap,
    canvas: Rect,
    point: Point,
) -> Option<DropSurface> {
    closest_surface(&surfaces_at(tree, bounds, canvas, point), point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::{Component, ComponentType, Props};

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn node(name: &str, kind: ComponentType, children: Vec<Component>) -> Component {
        Component::new(id(name), Props::default_for(kind)).with_children(children)
    }

    const CANVAS: Rect = Rect::new(0.0, 0.0, 800.0, 600.0);

    /// Outer container with an inner container and a paragraph.
    fn layout() -> (ComponentTree, BoundsMap) {
        let tree = ComponentTree::from_components(vec![node(
            "h_outer",
            ComponentType::Container,
            vec![
                node("h_inner", ComponentType::Container, vec![]),
                node("h_para", ComponentType::Paragraph, vec![]),
            ],
        )])
        .unwrap();
        let bounds = BoundsMap::from([
            (id("h_outer"), Rect::new(0.0, 0.0, 400.0, 400.0)),
            (id("h_inner"), Rect::new(20.0, 20.0, 380.0, 200.0)),
            (id("h_para"), Rect::new(20.0, 220.0, 380.0, 260.0)),
        ]);
        (tree, bounds)
    }

    #[test]
    fn collects_only_canvas_and_containers() {
        let (tree, bounds) = layout();
        let hits = surfaces_at(&tree, &bounds, CANVAS, Point::new(100.0, 240.0));
        let targets: Vec<_> = hits.iter().map(|s| s.target).collect();
        // The paragraph contains the point but is not a drop surface.
        assert_eq!(
            targets,
            vec![DropTarget::Canvas, DropTarget::Node(id("h_outer"))]
        );
    }

    #[test]
    fn nearest_center_wins() {
        let (tree, bounds) = layout();
        // Inner centre is (200, 110); outer centre is (200, 200).
        let hit = surface_at(&tree, &bounds, CANVAS, Point::new(200.0, 100.0)).unwrap();
        assert_eq!(hit.target, DropTarget::Node(id("h_inner")));

        let hit = surface_at(&tree, &bounds, CANVAS, Point::new(200.0, 190.0)).unwrap();
        assert_eq!(hit.target, DropTarget::Node(id("h_outer")));
    }

    #[test]
    fn exact_tie_goes_to_deeper_surface() {
        // Concentric containers share a centre.
        let tree = ComponentTree::from_components(vec![node(
            "t_outer",
            ComponentType::Container,
            vec![node("t_inner", ComponentType::Container, vec![])],
        )])
        .unwrap();
        let bounds = BoundsMap::from([
            (id("t_outer"), Rect::new(100.0, 100.0, 300.0, 300.0)),
            (id("t_inner"), Rect::new(150.0, 150.0, 250.0, 250.0)),
        ]);
        let hit = surface_at(&tree, &bounds, CANVAS, Point::new(210.0, 190.0)).unwrap();
        assert_eq!(hit.target, DropTarget::Node(id("t_inner")));
    }

    #[test]
    fn canvas_loses_ties_to_nodes() {
        let tree = ComponentTree::from_components(vec![node(
            "t_full",
            ComponentType::Container,
            vec![],
        )])
        .unwrap();
        let bounds = BoundsMap::from([(id("t_full"), CANVAS)]);
        let hit = surface_at(&tree, &bounds, CANVAS, Point::new(10.0, 10.0)).unwrap();
        assert_eq!(hit.target, DropTarget::Node(id("t_full")));
    }

    #[test]
    fn equal_depth_tie_goes_to_later_sibling() {
        // Two overlapping siblings with the same centre.
        let tree = ComponentTree::from_components(vec![
            node("t_first", ComponentType::Container, vec![]),
            node("t_second", ComponentType::Container, vec![]),
        ])
        .unwrap();
        let rect = Rect::new(0.0, 0.0, 100.0, 100.0);
        let bounds = BoundsMap::from([(id("t_first"), rect), (id("t_second"), rect)]);
        let hit = surface_at(&tree, &bounds, CANVAS, Point::new(40.0, 40.0)).unwrap();
        assert_eq!(hit.target, DropTarget::Node(id("t_second")));
    }

    #[test]
    fn outside_canvas_hits_nothing() {
        let (tree, bounds) = layout();
        assert!(surface_at(&tree, &bounds, CANVAS, Point::new(900.0, 900.0)).is_none());
    }
}
