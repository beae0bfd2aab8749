//! Editor session: the one object a host UI talks to.
//!
//! Owns the history, the drag controller and the current selection. Every
//! command issues at most one history entry, and the selection is kept
//! pointing at a live node (or nothing) after every command.

use crate::config::EditorConfig;
use crate::drag::{DragController, DragOutcome};
use crate::hit::{self, BoundsMap};
use crate::history::HistoryManager;
use crate::placement::{DragSource, DropPosition, DropTarget, PlacementResolver, PointerSample};
use crate::sensor::DragSensor;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::text_edit::TextEdit;
use kurbo::{Point, Rect};
use pb_core::store;
use pb_core::{ComponentTree, ComponentType, NodeId, PropsPatch};

#[derive(Debug, Clone)]
pub struct EditorSession {
    history: HistoryManager,
    drag: DragController,
    selection: Option<NodeId>,
    config: EditorConfig,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl EditorSession {
    /// A session over an empty page.
    pub fn new(config: EditorConfig) -> Self {
        Self::with_tree(ComponentTree::new(), config)
    }

    pub fn with_tree(tree: ComponentTree, config: EditorConfig) -> Self {
        Self {
            history: HistoryManager::with_limit(tree, config.history_limit),
            drag: DragController::new(PlacementResolver::new(config.edge_band)),
            selection: None,
            config,
        }
    }

    pub fn tree(&self) -> &ComponentTree {
        self.history.present()
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<NodeId> {
        self.selection
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// A fresh activation sensor tuned by this session's config.
    pub fn sensor(&self) -> DragSensor {
        DragSensor::new(&self.config)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: NodeId) -> bool {
        if !self.tree().contains(id) {
            log::debug!("session: cannot select unknown {id}");
            return false;
        }
        self.selection = Some(id);
        true
    }

    pub fn deselect(&mut self) {
        self.selection = None;
    }

    fn prune_selection(&mut self) {
        if let Some(id) = self.selection
            && !self.tree().contains(id)
        {
            log::debug!("session: selected {id} no longer exists");
            self.selection = None;
        }
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Append a default node of `kind` to the page.
    pub fn insert_at_root(&mut self, kind: ComponentType) -> NodeId {
        let node = store::create_default_node(self.tree(), kind);
        let id = node.id;
        let next = store::insert_at_root(self.tree(), node);
        self.history.commit(next);
        id
    }

    /// Delete `id` and its subtree.
    pub fn delete(&mut self, id: NodeId) -> bool {
        let removed = store::removed_ids(self.tree(), id);
        let next = store::delete(self.tree(), id);
        if !self.history.commit(next) {
            return false;
        }
        if let Some(selected) = self.selection
            && removed.contains(&selected)
        {
            self.selection = None;
        }
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selection {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    /// Clone `id` next to itself and select the clone.
    pub fn duplicate(&mut self, id: NodeId) -> Option<NodeId> {
        match store::try_duplicate(self.tree(), id) {
            Ok((next, clone)) => {
                self.history.commit(next);
                self.selection = Some(clone);
                Some(clone)
            }
            Err(err) => {
                log::debug!("session: duplicate: {err}");
                None
            }
        }
    }

    pub fn duplicate_selected(&mut self) -> Option<NodeId> {
        self.selection.and_then(|id| self.duplicate(id))
    }

    pub fn update_props(&mut self, id: NodeId, patch: &PropsPatch) -> bool {
        let next = store::update_props(self.tree(), id, patch);
        self.history.commit(next)
    }

    pub fn undo(&mut self) -> bool {
        let stepped = self.history.undo();
        self.prune_selection();
        stepped
    }

    pub fn redo(&mut self) -> bool {
        let stepped = self.history.redo();
        self.prune_selection();
        stepped
    }

    // ─── Text editing ────────────────────────────────────────────────────

    pub fn begin_text_edit(&self, id: NodeId) -> Option<TextEdit> {
        TextEdit::begin(self.tree(), id)
    }

    /// Commit the final text of an inline edit. Unchanged text is not an
    /// edit and leaves no history entry.
    pub fn commit_text_edit(&mut self, edit: &TextEdit, text: &str) -> bool {
        match edit.finish(text) {
            Some(patch) => self.update_props(edit.id, &patch),
            None => false,
        }
    }

    // ─── Drag ────────────────────────────────────────────────────────────

    pub fn drag_start(&mut self, source: DragSource) {
        self.drag.drag_start(source);
    }

    pub fn drag_over(
        &mut self,
        over: DropTarget,
        pointer: Option<PointerSample>,
    ) -> Option<DropPosition> {
        self.drag.drag_over(self.history.present(), over, pointer)
    }

    /// Hit-test `point` against the rendered bounds and feed the winning
    /// surface to [`Self::drag_over`]. Returns the surface, if any.
    pub fn drag_over_point(
        &mut self,
        bounds: &BoundsMap,
        canvas: Rect,
        point: Point,
    ) -> Option<DropTarget> {
        let surface = hit::surface_at(self.tree(), bounds, canvas, point)?;
        let pointer = PointerSample::new(point, surface.bounds);
        self.drag_over(surface.target, Some(pointer));
        Some(surface.target)
    }

    pub fn drag_end(&mut self, over: Option<DropTarget>) -> DragOutcome {
        let outcome = self.drag.drag_end(&mut self.history, over);
        self.prune_selection();
        outcome
    }

    pub fn drag_cancel(&mut self) {
        self.drag.drag_cancel();
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn drop_indicator(&self) -> Option<DropPosition> {
        self.drag.drop_indicator()
    }

    // ─── Shortcuts ───────────────────────────────────────────────────────

    /// Resolve a key event and run its action. Returns the action if the
    /// combo is bound and the action did something.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, ctrl, shift, alt, meta)?;
        self.apply_shortcut(action).then_some(action)
    }

    /// Run a shortcut action if it applies right now.
    pub fn apply_shortcut(&mut self, action: ShortcutAction) -> bool {
        match action {
            ShortcutAction::Undo => self.can_undo() && self.undo(),
            ShortcutAction::Redo => self.can_redo() && self.redo(),
            ShortcutAction::Delete => self.delete_selected(),
            ShortcutAction::Duplicate => self.duplicate_selected().is_some(),
            ShortcutAction::Deselect => {
                // Escape during a drag aborts the drag, not the selection.
                if self.is_dragging() {
                    self.drag_cancel();
                    return true;
                }
                self.selection.take().is_some()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::{Component, Props};
    use pretty_assertions::assert_eq;

    fn id(s: &str) -> NodeId {
        NodeId::intern(s)
    }

    fn session() -> EditorSession {
        let tree = ComponentTree::from_components(vec![
            Component::new(id("s_box"), Props::default_for(ComponentType::Container))
                .with_children(vec![Component::new(
                    id("s_inner"),
                    Props::default_for(ComponentType::Paragraph),
                )]),
            Component::new(id("s_cta"), Props::default_for(ComponentType::Button)),
        ])
        .unwrap();
        EditorSession::with_tree(tree, EditorConfig::default())
    }

    #[test]
    fn deleting_ancestor_clears_selection() {
        let mut s = session();
        assert!(s.select(id("s_inner")));
        assert!(s.delete(id("s_box")));
        assert_eq!(s.selection(), None);
        assert_eq!(s.tree().roots(), &[id("s_cta")]);
    }

    #[test]
    fn deleting_other_node_keeps_selection() {
        let mut s = session();
        s.select(id("s_cta"));
        s.delete(id("s_box"));
        assert_eq!(s.selection(), Some(id("s_cta")));
    }

    #[test]
    fn select_unknown_is_refused() {
        let mut s = session();
        s.select(id("s_cta"));
        assert!(!s.select(id("s_nowhere")));
        assert_eq!(s.selection(), Some(id("s_cta")));
    }

    #[test]
    fn duplicate_selects_clone() {
        let mut s = session();
        s.select(id("s_cta"));
        let clone = s.duplicate_selected().unwrap();
        assert_eq!(s.selection(), Some(clone));
        assert_eq!(s.tree().roots(), &[id("s_box"), id("s_cta"), clone]);
    }

    #[test]
    fn undo_prunes_selection_of_vanished_node() {
        let mut s = session();
        let added = s.insert_at_root(ComponentType::Heading);
        s.select(added);
        assert!(s.undo());
        assert_eq!(s.selection(), None);
        assert!(s.redo());
        assert!(s.tree().contains(added));
    }

    #[test]
    fn shortcuts_are_guarded() {
        let mut s = session();
        assert!(!s.apply_shortcut(ShortcutAction::Undo));
        assert!(!s.apply_shortcut(ShortcutAction::Delete));
        assert!(!s.apply_shortcut(ShortcutAction::Duplicate));

        s.select(id("s_cta"));
        assert_eq!(
            s.handle_key("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert!(!s.tree().contains(id("s_cta")));
        assert_eq!(
            s.handle_key("z", true, false, false, false),
            Some(ShortcutAction::Undo)
        );
        assert!(s.tree().contains(id("s_cta")));
    }

    #[test]
    fn escape_cancels_drag_before_deselecting() {
        let mut s = session();
        s.select(id("s_cta"));
        s.drag_start(DragSource::Palette(ComponentType::Image));
        assert!(s.apply_shortcut(ShortcutAction::Deselect));
        assert!(!s.is_dragging());
        assert_eq!(s.selection(), Some(id("s_cta")));
        assert!(s.apply_shortcut(ShortcutAction::Deselect));
        assert_eq!(s.selection(), None);
    }

    #[test]
    fn text_edit_commits_only_changes() {
        let mut s = session();
        let edit = s.begin_text_edit(id("s_cta")).unwrap();
        assert!(!s.commit_text_edit(&edit, " Click me "));
        assert!(!s.can_undo());

        assert!(s.commit_text_edit(&edit, "Buy now"));
        assert_eq!(s.tree().props(id("s_cta")).and_then(Props::text), Some("Buy now"));
        assert!(s.begin_text_edit(id("s_box")).is_none());
    }

    #[test]
    fn drag_over_point_uses_hit_testing() {
        let mut s = session();
        let canvas = Rect::new(0.0, 0.0, 800.0, 600.0);
        let bounds = BoundsMap::from([(id("s_box"), Rect::new(0.0, 0.0, 400.0, 200.0))]);

        s.drag_start(DragSource::Palette(ComponentType::Heading));
        let surface = s.drag_over_point(&bounds, canvas, Point::new(200.0, 100.0));
        assert_eq!(surface, Some(DropTarget::Node(id("s_box"))));
        assert_eq!(s.drop_indicator(), Some(DropPosition::Nest(id("s_box"))));

        let outcome = s.drag_end(surface);
        let DragOutcome::Inserted(new_id) = outcome else {
            panic!("expected insert, got {outcome:?}");
        };
        assert_eq!(s.tree().children(id("s_box")), &[id("s_inner"), new_id]);
    }
}
