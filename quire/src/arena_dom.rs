//! Arena-backed document tree and the editing capability set built on it.
//!
//! All nodes live in a single `indextree::Arena` - a `NodeId` is a stable,
//! copyable handle with O(1) parent/child navigation and no ownership cycles.
//! A node's position is defined solely by its index in the parent's child
//! list; sibling order is the only ordering relation.
//!
//! The engine never stores node kinds separately from the tree: whether an
//! element is a section container, a title marker, or the body root is
//! derived from its tag and `class` attribute on every query.

use compact_str::CompactString;
use indexmap::IndexMap;
use indextree::{Arena, NodeId};

use crate::selection::{Position, Selection};

/// Tag of the generic container element used for structural markup.
pub const CONTAINER_TAG: &str = "div";

/// Class marking a section container.
pub const SECTION_CLASS: &str = "section";

/// Class marking a title marker.
pub const TITLE_CLASS: &str = "title";

/// Class marking a subtitle marker.
pub const SUBTITLE_CLASS: &str = "subtitle";

/// Class of the top-level body wrapper bounding all user content.
pub const BODY_CLASS: &str = "body";

/// What goes in each arena slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Invisible arena root above the markup wrapper; never addressed by
    /// the engine.
    Root,
    /// Element with tag and attributes.
    Element(ElementData),
    /// Text content.
    Text(CompactString),
    /// Comment.
    Comment(CompactString),
}

/// Element data (tag + attributes).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementData {
    /// Tag name as authored; classification compares it case-insensitively.
    pub tag: CompactString,

    /// Attributes in declaration order (IndexMap preserves insertion order
    /// for consistent export).
    pub attrs: IndexMap<CompactString, CompactString>,
}

impl ElementData {
    /// Create element data with the given tag and no attributes.
    pub fn new(tag: impl Into<CompactString>) -> Self {
        Self {
            tag: tag.into(),
            attrs: IndexMap::new(),
        }
    }

    /// Get an attribute value by name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(|v| v.as_str())
    }

    /// The `class` attribute, if any.
    pub fn class(&self) -> Option<&str> {
        self.attr("class")
    }

    /// True for the generic container tag, whatever the letter case.
    pub fn is_container(&self) -> bool {
        self.tag.eq_ignore_ascii_case(CONTAINER_TAG)
    }

    /// Case-insensitive class check.
    pub fn has_class(&self, class: &str) -> bool {
        self.class().is_some_and(|c| c.eq_ignore_ascii_case(class))
    }

    /// Generic container classed `section`.
    pub fn is_section(&self) -> bool {
        self.is_container() && self.has_class(SECTION_CLASS)
    }

    /// Generic container classed `title`.
    pub fn is_title(&self) -> bool {
        self.is_container() && self.has_class(TITLE_CLASS)
    }
}

/// A document: the arena holding every node, the markup wrapper element at
/// the top, and the live selection the host would own.
#[derive(Debug, Clone)]
pub struct Document {
    /// THE tree - all nodes live here.
    pub(crate) arena: Arena<NodeKind>,

    /// The markup wrapper element (usually `html`). Attribute export skips
    /// it, addresses resolve from it.
    root: NodeId,

    /// Live selection; `None` when the host reports zero ranges.
    selection: Option<Selection>,
}

impl Document {
    pub(crate) fn from_parts(arena: Arena<NodeKind>, root: NodeId) -> Self {
        Self {
            arena,
            root,
            selection: None,
        }
    }

    /// Fresh book scaffold: a body wrapper holding one section with one
    /// empty paragraph, caret in the paragraph.
    pub fn new_book() -> Self {
        let mut arena = Arena::new();
        let top = arena.new_node(NodeKind::Root);
        let html = arena.new_node(NodeKind::Element(ElementData::new("html")));
        top.append(html, &mut arena);
        let body = arena.new_node(NodeKind::Element(ElementData::new("body")));
        html.append(body, &mut arena);

        let mut doc = Self::from_parts(arena, html);
        let wrapper = doc.create_container(BODY_CLASS);
        doc.append_child(body, wrapper);
        let section = doc.create_container(SECTION_CLASS);
        doc.append_child(wrapper, section);
        let paragraph = doc.create_element("p");
        doc.append_child(section, paragraph);
        doc.set_caret(Position::new(paragraph, 0));
        doc
    }

    /// The markup wrapper element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The `body` element if present.
    pub fn body(&self) -> Option<NodeId> {
        self.root.children(&self.arena).find(|&id| {
            matches!(
                self.arena[id].get(),
                NodeKind::Element(el) if el.tag.eq_ignore_ascii_case("body")
            )
        })
    }

    /// Get immutable reference to node data.
    pub fn get(&self, id: NodeId) -> &NodeKind {
        self.arena[id].get()
    }

    /// Get mutable reference to node data.
    pub fn get_mut(&mut self, id: NodeId) -> &mut NodeKind {
        self.arena[id].get_mut()
    }

    /// Element data of a node, when it is an element.
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.arena[id].get() {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Mutable element data of a node, when it is an element.
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.arena[id].get_mut() {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Tag name of an element node.
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    /// Attribute value of an element node.
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.attr(name)
    }

    /// Set an attribute on an element node; no-op on other kinds.
    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs
                .insert(CompactString::from(name), CompactString::from(value));
        }
    }

    /// Payload of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.arena[id].get() {
            NodeKind::Text(t) => Some(t.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of the node and all its descendants.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        for descendant in id.descendants(&self.arena) {
            if let NodeKind::Text(t) = self.arena[descendant].get() {
                out.push_str(t);
            }
        }
        out
    }

    /// Parent link; the invisible arena root is reported as no parent, so
    /// ancestor walks terminate at the markup wrapper.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.arena[id].parent()?;
        match self.arena[parent].get() {
            NodeKind::Root => None,
            _ => Some(parent),
        }
    }

    /// Iterate children of a node.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.children(&self.arena)
    }

    /// Iterate the node and all its descendants, preorder.
    pub fn descendants(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        id.descendants(&self.arena)
    }

    /// Number of children of a node.
    pub fn child_count(&self, id: NodeId) -> usize {
        id.children(&self.arena).count()
    }

    /// The `index`-th child of a node.
    pub fn child_at(&self, id: NodeId, index: usize) -> Option<NodeId> {
        id.children(&self.arena).nth(index)
    }

    /// First child of a node.
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].first_child()
    }

    /// Next sibling of a node.
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.arena[id].next_sibling()
    }

    /// Identity index of a node among its parent's children.
    pub fn child_index(&self, id: NodeId) -> Option<usize> {
        let parent = self.arena[id].parent()?;
        parent.children(&self.arena).position(|c| c == id)
    }

    // -------------------------------------------------------------------------
    // Mutation primitives
    // -------------------------------------------------------------------------

    /// Create a detached element node.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.arena.new_node(NodeKind::Element(ElementData::new(tag)))
    }

    /// Create a detached generic container with the given class.
    pub fn create_container(&mut self, class: &str) -> NodeId {
        let mut el = ElementData::new(CONTAINER_TAG);
        el.attrs
            .insert(CompactString::from("class"), CompactString::from(class));
        self.arena.new_node(NodeKind::Element(el))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeKind::Text(CompactString::from(text)))
    }

    /// Create a detached comment node.
    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.arena.new_node(NodeKind::Comment(CompactString::from(text)))
    }

    /// Append `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        parent.append(child, &mut self.arena);
    }

    /// Insert `child` ahead of all existing children of `parent`.
    pub fn prepend_child(&mut self, parent: NodeId, child: NodeId) {
        parent.prepend(child, &mut self.arena);
    }

    /// Insert `child` so that it ends up at `index` among `parent`'s
    /// children; appends when `index` is past the end.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children: Vec<NodeId> = parent.children(&self.arena).collect();
        match children.get(index) {
            Some(&occupant) => occupant.insert_before(child, &mut self.arena),
            None => parent.append(child, &mut self.arena),
        }
    }

    /// Detach a subtree from its parent. The nodes stay in the arena but are
    /// no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) {
        id.detach(&mut self.arena);
    }

    /// Reparent the contiguous sibling run `start..=end` into `wrapper`,
    /// placing `wrapper` at the position `start` occupied. `end` must be
    /// `start` itself or a following sibling; run order is preserved.
    pub fn wrap_children(&mut self, wrapper: NodeId, start: NodeId, end: NodeId) {
        let mut run = Vec::new();
        let mut cursor = Some(start);
        while let Some(id) = cursor {
            run.push(id);
            if id == end {
                break;
            }
            cursor = self.arena[id].next_sibling();
        }
        start.insert_before(wrapper, &mut self.arena);
        for id in run {
            id.detach(&mut self.arena);
            wrapper.append(id, &mut self.arena);
        }
    }

    /// Replace an element by its children, in place.
    pub fn unwrap_element(&mut self, id: NodeId) {
        let children: Vec<NodeId> = id.children(&self.arena).collect();
        for child in children {
            child.detach(&mut self.arena);
            id.insert_before(child, &mut self.arena);
        }
        id.detach(&mut self.arena);
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    /// The live selection, if the host currently has one.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Replace the live selection.
    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    /// Collapse the live selection to a single caret position.
    pub fn set_caret(&mut self, position: Position) {
        self.selection = Some(Selection::caret(position));
    }

    /// Drop the live selection (the host reports zero ranges).
    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // -------------------------------------------------------------------------
    // Container classification
    // -------------------------------------------------------------------------

    /// Returns true if this node is an element.
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.arena[id].get(), NodeKind::Element(_))
    }

    /// Returns true if this node is a text node.
    pub fn is_text(&self, id: NodeId) -> bool {
        matches!(self.arena[id].get(), NodeKind::Text(_))
    }

    /// The `body` root element bounding the navigable subtree.
    pub fn is_body_root(&self, id: NodeId) -> bool {
        self.element(id)
            .is_some_and(|el| el.tag.eq_ignore_ascii_case("body"))
    }

    /// Generic container classed `section`.
    pub fn is_section_container(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(ElementData::is_section)
    }

    /// Generic container classed `title`.
    pub fn is_title_marker(&self, id: NodeId) -> bool {
        self.element(id).is_some_and(ElementData::is_title)
    }

    /// Generic container classed `body` (the wrapper bounding user content).
    pub fn is_body_wrapper(&self, id: NodeId) -> bool {
        self.element(id)
            .is_some_and(|el| el.is_container() && el.has_class(BODY_CLASS))
    }

    /// True when the node's first child is a title marker.
    pub fn has_title(&self, id: NodeId) -> bool {
        self.first_child(id)
            .is_some_and(|child| self.is_title_marker(child))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new_book()
    }
}

// =============================================================================
// Tests
// =============================================================================
