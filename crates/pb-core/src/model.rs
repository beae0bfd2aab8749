//! Core data model for the page component tree.
//!
//! A page is an ordered forest of typed components. Containers hold an
//! ordered list of children; every other type is a leaf. The tree is stored
//! as an arena keyed by `NodeId` with ordered child-id lists, so lookup by id
//! is O(1) and no node owns a reference to another. The nested `Component`
//! value is the exchange form: edits accept it, renderers read it.

use crate::error::TreeError;
use crate::id::NodeId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;
use std::fmt;

/// Deepest level a node may sit at. Root-list nodes are depth 0, so a
/// container accepts children only while its own depth is below this.
pub const MAX_NESTING_DEPTH: usize = 3;

pub const MIN_HEADING_LEVEL: u8 = 1;
pub const MAX_HEADING_LEVEL: u8 = 6;

/// Ordered list of ids, shared by the root list and container children.
pub type IdList = SmallVec<[NodeId; 4]>;

// ─── Component types ─────────────────────────────────────────────────────

/// The placeable element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentType {
    Container,
    Heading,
    Paragraph,
    Image,
    Button,
}

impl ComponentType {
    pub const ALL: [ComponentType; 5] = [
        ComponentType::Container,
        ComponentType::Heading,
        ComponentType::Paragraph,
        ComponentType::Image,
        ComponentType::Button,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentType::Container => "container",
            ComponentType::Heading => "heading",
            ComponentType::Paragraph => "paragraph",
            ComponentType::Image => "image",
            ComponentType::Button => "button",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    pub fn is_container(self) -> bool {
        matches!(self, ComponentType::Container)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Props ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
}

/// Type-specific field set. The variant *is* the component type, so type and
/// props can never disagree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Props {
    Container { title: String },
    Heading { text: String, level: u8 },
    Paragraph { text: String },
    Image { src: String, alt: String },
    Button { text: String, variant: ButtonVariant },
}

impl Props {
    /// Props a freshly dropped palette item starts with.
    pub fn default_for(kind: ComponentType) -> Self {
        match kind {
            ComponentType::Container => Props::Container {
                title: "Container".into(),
            },
            ComponentType::Heading => Props::Heading {
                text: "New Heading".into(),
                level: 2,
            },
            ComponentType::Paragraph => Props::Paragraph {
                text: "New paragraph text".into(),
            },
            ComponentType::Image => Props::Image {
                src: "https://via.placeholder.com/300x200".into(),
                alt: "Placeholder".into(),
            },
            ComponentType::Button => Props::Button {
                text: "Click me".into(),
                variant: ButtonVariant::Primary,
            },
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            Props::Container { .. } => ComponentType::Container,
            Props::Heading { .. } => ComponentType::Heading,
            Props::Paragraph { .. } => ComponentType::Paragraph,
            Props::Image { .. } => ComponentType::Image,
            Props::Button { .. } => ComponentType::Button,
        }
    }

    /// The inline-editable text, for types that have one.
    pub fn text(&self) -> Option<&str> {
        match self {
            Props::Heading { text, .. } | Props::Paragraph { text } | Props::Button { text, .. } => {
                Some(text.as_str())
            }
            Props::Container { .. } | Props::Image { .. } => None,
        }
    }

    /// The heading level, if it lies outside 1..=6.
    pub fn invalid_level(&self) -> Option<u8> {
        match self {
            Props::Heading { level, .. }
                if !(MIN_HEADING_LEVEL..=MAX_HEADING_LEVEL).contains(level) =>
            {
                Some(*level)
            }
            _ => None,
        }
    }

    /// Merge `patch` into these props, overwriting only the `Some` fields
    /// that apply to this type. Returns true if anything changed.
    pub fn merge(&mut self, patch: &PropsPatch) -> bool {
        let before = self.clone();
        match self {
            Props::Container { title } => {
                set_if(title, &patch.title);
            }
            Props::Heading { text, level } => {
                set_if(text, &patch.text);
                if let Some(l) = patch.level {
                    *level = l.clamp(MIN_HEADING_LEVEL, MAX_HEADING_LEVEL);
                }
            }
            Props::Paragraph { text } => {
                set_if(text, &patch.text);
            }
            Props::Image { src, alt } => {
                set_if(src, &patch.src);
                set_if(alt, &patch.alt);
            }
            Props::Button { text, variant } => {
                set_if(text, &patch.text);
                if let Some(v) = patch.variant {
                    *variant = v;
                }
            }
        }
        let ignored = patch.fields_outside(self.component_type());
        if !ignored.is_empty() {
            log::debug!(
                "props patch fields {ignored:?} do not apply to {}",
                self.component_type()
            );
        }
        *self != before
    }
}

fn set_if(dst: &mut String, src: &Option<String>) {
    if let Some(value) = src {
        dst.clone_from(value);
    }
}

/// Partial props: every field optional, applied with [`Props::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropsPatch {
    pub title: Option<String>,
    pub text: Option<String>,
    pub level: Option<u8>,
    pub src: Option<String>,
    pub alt: Option<String>,
    pub variant: Option<ButtonVariant>,
}

impl PropsPatch {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Names of the set fields that `kind` has no slot for.
    fn fields_outside(&self, kind: ComponentType) -> Vec<&'static str> {
        let accepts: &[&str] = match kind {
            ComponentType::Container => &["title"],
            ComponentType::Heading => &["text", "level"],
            ComponentType::Paragraph => &["text"],
            ComponentType::Image => &["src", "alt"],
            ComponentType::Button => &["text", "variant"],
        };
        [
            ("title", self.title.is_some()),
            ("text", self.text.is_some()),
            ("level", self.level.is_some()),
            ("src", self.src.is_some()),
            ("alt", self.alt.is_some()),
            ("variant", self.variant.is_some()),
        ]
        .into_iter()
        .filter(|(name, set)| *set && !accepts.contains(name))
        .map(|(name, _)| name)
        .collect()
    }
}

// ─── Nested component value ──────────────────────────────────────────────

/// A component together with its subtree: the value edits accept and the
/// rendering layer reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: NodeId,
    pub props: Props,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Component>,
}

impl Component {
    pub fn new(id: NodeId, props: Props) -> Self {
        Self {
            id,
            props,
            children: Vec::new(),
        }
    }

    /// Builder-style child append, used when assembling fixtures.
    pub fn with_children(mut self, children: Vec<Component>) -> Self {
        self.children = children;
        self
    }

    pub fn component_type(&self) -> ComponentType {
        self.props.component_type()
    }

    /// Levels below this node (a leaf is 0).
    pub fn height(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.height() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Number of nodes in this subtree, including itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Component::size).sum::<usize>()
    }

    /// Pre-order ids of this subtree.
    pub fn ids(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.size());
        self.collect_ids(&mut out);
        out
    }

    fn collect_ids(&self, out: &mut Vec<NodeId>) {
        out.push(self.id);
        for child in &self.children {
            child.collect_ids(out);
        }
    }
}

// ─── Arena tree ──────────────────────────────────────────────────────────

/// One arena slot. `parent` is an index for finding the containing list,
/// not an ownership link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: NodeId,
    pub props: Props,
    pub parent: Option<NodeId>,
    pub children: IdList,
}

impl Entry {
    pub fn component_type(&self) -> ComponentType {
        self.props.component_type()
    }
}

/// Where an insertion lands relative to a sibling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Before,
    After,
}

/// An immutable-by-convention snapshot of the page tree.
///
/// Edit functions in [`crate::store`] take `&ComponentTree` and return a new
/// value; the tree itself only exposes read access publicly.
#[derive(Debug, Clone, Default)]
pub struct ComponentTree {
    entries: HashMap<NodeId, Entry>,
    roots: IdList,
    /// Serial used for the next generated id. Part of the value so id
    /// generation is a pure function of the tree.
    next_serial: u64,
}

/// Structural equality: same nodes, same props, same order. The id serial is
/// bookkeeping and does not take part.
impl PartialEq for ComponentTree {
    fn eq(&self, other: &Self) -> bool {
        self.roots == other.roots && self.entries == other.entries
    }
}

impl Eq for ComponentTree {}

impl ComponentTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from nested components, validating id uniqueness,
    /// leaf-ness, depth and heading levels.
    pub fn from_components(components: Vec<Component>) -> Result<Self, TreeError> {
        let mut tree = Self::new();
        for component in components {
            tree.validate_and_attach(component, None, 0)?;
        }
        Ok(tree)
    }

    fn validate_and_attach(
        &mut self,
        component: Component,
        parent: Option<NodeId>,
        depth: usize,
    ) -> Result<(), TreeError> {
        let Component {
            id,
            props,
            children,
        } = component;
        if self.entries.contains_key(&id) {
            return Err(TreeError::DuplicateId(id));
        }
        if depth > MAX_NESTING_DEPTH {
            return Err(TreeError::TooDeep { id, depth });
        }
        if !children.is_empty() && !props.component_type().is_container() {
            return Err(TreeError::ChildrenOnLeaf(id));
        }
        if let Some(level) = props.invalid_level() {
            return Err(TreeError::InvalidLevel { id, level });
        }
        self.entries.insert(
            id,
            Entry {
                id,
                props,
                parent,
                children: IdList::new(),
            },
        );
        self.list_mut(parent).push(id);
        self.next_serial += 1;
        for child in children {
            self.validate_and_attach(child, Some(id), depth + 1)?;
        }
        Ok(())
    }

    /// Number of nodes in the whole tree.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn get(&self, id: NodeId) -> Option<&Entry> {
        self.entries.get(&id)
    }

    pub fn props(&self, id: NodeId) -> Option<&Props> {
        self.entries.get(&id).map(|e| &e.props)
    }

    /// The root list in order.
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Children of `id` in order; empty for leaves and unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entries
            .get(&id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    /// The list that owns `id`: the root list or its parent's children.
    pub fn containing_list(&self, id: NodeId) -> Option<&[NodeId]> {
        let entry = self.entries.get(&id)?;
        match entry.parent {
            None => Some(&self.roots),
            Some(parent) => self.entries.get(&parent).map(|p| p.children.as_slice()),
        }
    }

    /// Position of `id` inside its containing list.
    pub fn index_in_list(&self, id: NodeId) -> Option<usize> {
        self.containing_list(id)?.iter().position(|&s| s == id)
    }

    /// Depth of `id` (root-list nodes are 0).
    pub fn depth_of(&self, id: NodeId) -> Option<usize> {
        let mut entry = self.entries.get(&id)?;
        let mut depth = 0;
        while let Some(parent) = entry.parent {
            entry = self.entries.get(&parent)?;
            depth += 1;
        }
        Some(depth)
    }

    pub fn is_container(&self, id: NodeId) -> bool {
        self.entries
            .get(&id)
            .is_some_and(|e| e.component_type().is_container())
    }

    /// True if `id` is a container that may still accept children.
    pub fn can_nest_into(&self, id: NodeId) -> bool {
        self.is_container(id)
            && self
                .depth_of(id)
                .is_some_and(|depth| depth < MAX_NESTING_DEPTH)
    }

    /// Check if `ancestor` is a parent/grandparent/etc. of `descendant`.
    pub fn is_ancestor_of(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = self.parent_of(descendant);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_of(id);
        }
        false
    }

    /// Pre-order ids of the subtree rooted at `id`; empty if unknown.
    pub fn subtree_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if self.contains(id) {
            let mut stack = vec![id];
            while let Some(next) = stack.pop() {
                out.push(next);
                stack.extend(self.children(next).iter().rev().copied());
            }
        }
        out
    }

    pub fn subtree_size(&self, id: NodeId) -> usize {
        self.subtree_ids(id).len()
    }

    /// All ids in document (depth-first, pre-order) order.
    pub fn iter_depth_first(&self) -> Vec<NodeId> {
        self.roots
            .iter()
            .flat_map(|&root| self.subtree_ids(root))
            .collect()
    }

    /// The id the next created node of `kind` would get.
    pub fn fresh_id(&self, kind: ComponentType) -> NodeId {
        self.fresh_serial(kind).0
    }

    fn fresh_serial(&self, kind: ComponentType) -> (NodeId, u64) {
        let mut serial = self.next_serial;
        loop {
            let id = NodeId::numbered(kind.as_str(), serial);
            if !self.contains(id) {
                return (id, serial);
            }
            serial += 1;
        }
    }

    /// Nested view of one subtree.
    pub fn component(&self, id: NodeId) -> Option<Component> {
        let entry = self.entries.get(&id)?;
        Some(Component {
            id,
            props: entry.props.clone(),
            children: entry
                .children
                .iter()
                .filter_map(|&child| self.component(child))
                .collect(),
        })
    }

    /// Nested view of the whole page, for the rendering layer.
    pub fn to_components(&self) -> Vec<Component> {
        self.roots
            .iter()
            .filter_map(|&root| self.component(root))
            .collect()
    }

    /// JSON form of [`Self::to_components`] for bridges that hand the tree
    /// to a non-Rust renderer.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.to_components())
    }

    // ─── Arena mutation (used by `store`) ────────────────────────────────

    /// Reserve a fresh id and bump the serial past it.
    pub(crate) fn allocate_id(&mut self, kind: ComponentType) -> NodeId {
        let (id, serial) = self.fresh_serial(kind);
        self.next_serial = serial + 1;
        id
    }

    pub(crate) fn list_mut(&mut self, parent: Option<NodeId>) -> &mut IdList {
        match parent {
            Some(p) => match self.entries.get_mut(&p) {
                Some(entry) => &mut entry.children,
                // Callers resolve `parent` from the tree first.
                None => &mut self.roots,
            },
            None => &mut self.roots,
        }
    }

    pub(crate) fn props_mut(&mut self, id: NodeId) -> Option<&mut Props> {
        self.entries.get_mut(&id).map(|e| &mut e.props)
    }

    /// Insert `component` and its subtree into `parent`'s list at `index`.
    /// Ids and depth must already be validated by the caller.
    pub(crate) fn attach(&mut self, component: Component, parent: Option<NodeId>, index: usize) {
        let id = component.id;
        let list = self.list_mut(parent);
        let index = index.min(list.len());
        list.insert(index, id);
        self.attach_entries(component, parent);
    }

    fn attach_entries(&mut self, component: Component, parent: Option<NodeId>) {
        let Component {
            id,
            props,
            children,
        } = component;
        let child_ids: IdList = children.iter().map(|c| c.id).collect();
        self.entries.insert(
            id,
            Entry {
                id,
                props,
                parent,
                children: child_ids,
            },
        );
        self.next_serial += 1;
        for child in children {
            self.attach_entries(child, Some(id));
        }
    }

    /// Remove `id` and its subtree. Returns the removed ids in pre-order.
    pub(crate) fn detach(&mut self, id: NodeId) -> Vec<NodeId> {
        let removed = self.subtree_ids(id);
        if removed.is_empty() {
            return removed;
        }
        let parent = self.parent_of(id);
        self.list_mut(parent).retain(|s| *s != id);
        for gone in &removed {
            self.entries.remove(gone);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(id: &str, kind: ComponentType) -> Component {
        Component::new(NodeId::intern(id), Props::default_for(kind))
    }

    fn container(id: &str, children: Vec<Component>) -> Component {
        leaf(id, ComponentType::Container).with_children(children)
    }

    #[test]
    fn from_components_indexes_every_node() {
        let tree = ComponentTree::from_components(vec![
            container(
                "m_outer",
                vec![leaf("m_title", ComponentType::Heading)],
            ),
            leaf("m_cta", ComponentType::Button),
        ])
        .unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.roots().len(), 2);
        assert_eq!(
            tree.parent_of(NodeId::intern("m_title")),
            Some(NodeId::intern("m_outer"))
        );
        assert_eq!(tree.depth_of(NodeId::intern("m_title")), Some(1));
        assert_eq!(tree.index_in_list(NodeId::intern("m_cta")), Some(1));
    }

    #[test]
    fn from_components_rejects_duplicate_ids() {
        let err = ComponentTree::from_components(vec![
            leaf("m_dup", ComponentType::Paragraph),
            leaf("m_dup", ComponentType::Paragraph),
        ])
        .unwrap_err();
        assert_eq!(err, TreeError::DuplicateId(NodeId::intern("m_dup")));
    }

    #[test]
    fn from_components_rejects_children_on_leaf() {
        let bad = leaf("m_img", ComponentType::Image)
            .with_children(vec![leaf("m_inside", ComponentType::Paragraph)]);
        let err = ComponentTree::from_components(vec![bad]).unwrap_err();
        assert_eq!(err, TreeError::ChildrenOnLeaf(NodeId::intern("m_img")));
    }

    #[test]
    fn from_components_rejects_excess_depth() {
        let too_deep = container(
            "m_d0",
            vec![container(
                "m_d1",
                vec![container(
                    "m_d2",
                    vec![container(
                        "m_d3",
                        vec![leaf("m_d4", ComponentType::Paragraph)],
                    )],
                )],
            )],
        );
        let err = ComponentTree::from_components(vec![too_deep]).unwrap_err();
        assert_eq!(
            err,
            TreeError::TooDeep {
                id: NodeId::intern("m_d4"),
                depth: 4
            }
        );
    }

    #[test]
    fn from_components_rejects_heading_level_out_of_range() {
        for level in [0, 7, 200] {
            let heading = Component::new(
                NodeId::intern("m_bad_level"),
                Props::Heading {
                    text: "Title".into(),
                    level,
                },
            );
            let err = ComponentTree::from_components(vec![heading]).unwrap_err();
            assert_eq!(
                err,
                TreeError::InvalidLevel {
                    id: NodeId::intern("m_bad_level"),
                    level
                }
            );
        }
    }

    #[test]
    fn deserialized_tree_is_validated() {
        let json = r#"[{"id":"m_json","props":{"type":"heading","text":"Hi","level":0}}]"#;
        let components: Vec<Component> = serde_json::from_str(json).unwrap();
        assert!(matches!(
            ComponentTree::from_components(components),
            Err(TreeError::InvalidLevel { level: 0, .. })
        ));
    }

    #[test]
    fn can_nest_into_respects_depth_limit() {
        let tree = ComponentTree::from_components(vec![container(
            "n_d0",
            vec![container(
                "n_d1",
                vec![container("n_d2", vec![container("n_d3", vec![])])],
            )],
        )])
        .unwrap();

        assert!(tree.can_nest_into(NodeId::intern("n_d0")));
        assert!(tree.can_nest_into(NodeId::intern("n_d2")));
        assert!(!tree.can_nest_into(NodeId::intern("n_d3")));
    }

    #[test]
    fn fresh_id_skips_taken_serials() {
        let tree =
            ComponentTree::from_components(vec![leaf("heading-0", ComponentType::Heading)])
                .unwrap();
        // One node attached → serial 1, which is free.
        assert_eq!(tree.fresh_id(ComponentType::Heading).as_str(), "heading-1");

        let tree = ComponentTree::from_components(vec![
            leaf("x_first", ComponentType::Paragraph),
            leaf("paragraph-2", ComponentType::Paragraph),
        ])
        .unwrap();
        assert_eq!(
            tree.fresh_id(ComponentType::Paragraph).as_str(),
            "paragraph-3"
        );
    }

    #[test]
    fn merge_only_touches_applicable_fields() {
        let mut props = Props::default_for(ComponentType::Heading);
        let changed = props.merge(&PropsPatch {
            text: Some("Welcome".into()),
            src: Some("ignored.png".into()),
            ..Default::default()
        });
        assert!(changed);
        assert_eq!(
            props,
            Props::Heading {
                text: "Welcome".into(),
                level: 2
            }
        );
    }

    #[test]
    fn merge_clamps_heading_level() {
        let mut props = Props::default_for(ComponentType::Heading);
        props.merge(&PropsPatch {
            level: Some(9),
            ..Default::default()
        });
        assert!(matches!(props, Props::Heading { level: 6, .. }));
    }

    #[test]
    fn merge_reports_no_change() {
        let mut props = Props::default_for(ComponentType::Image);
        assert!(!props.merge(&PropsPatch::text("not an image field")));
    }

    #[test]
    fn component_type_names_roundtrip() {
        for kind in ComponentType::ALL {
            assert_eq!(ComponentType::from_name(kind.as_str()), Some(kind));
        }
        assert_eq!(ComponentType::from_name("video"), None);
    }

    #[test]
    fn structural_equality_ignores_serial() {
        let a = ComponentTree::from_components(vec![leaf("eq_a", ComponentType::Button)]).unwrap();
        let mut b = a.clone();
        b.allocate_id(ComponentType::Button);
        assert_eq!(a, b);
    }

    #[test]
    fn to_json_nests_children() {
        let tree = ComponentTree::from_components(vec![container(
            "j_box",
            vec![leaf("j_para", ComponentType::Paragraph)],
        )])
        .unwrap();
        let json: serde_json::Value = serde_json::from_str(&tree.to_json().unwrap()).unwrap();
        assert_eq!(json[0]["id"], "j_box");
        assert_eq!(json[0]["props"]["type"], "container");
        assert_eq!(json[0]["children"][0]["props"]["text"], "New paragraph text");
    }
}
