//! Structural editing operations.
//!
//! Every operation here re-reads the live selection when it starts, resolves
//! the nearest structural container, and only then mutates - no node handle
//! survives from one operation to the next. Range-dependent operations
//! report the recoverable failures of [`EditError`] and leave the tree
//! untouched on any of them.

use indextree::NodeId;
use thiserror::Error;

use crate::arena_dom::{Document, SECTION_CLASS, SUBTITLE_CLASS, TITLE_CLASS};
use crate::selection::{Position, Range};

/// Placeholder content of a freshly inserted title marker.
const TITLE_PLACEHOLDER: &str = "title";

/// Recoverable failures of the range-dependent operations. None of these is
/// fatal: the tree is untouched and the caller treats the operation as not
/// applicable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    /// The host selection has zero ranges.
    #[error("no selection")]
    NoSelection,

    /// The ancestor walk ran off the top of the tree without meeting the
    /// body root or a section container.
    #[error("no enclosing structural container")]
    NoContainer,

    /// A range endpoint is not a descendant of its resolved container.
    #[error("selection endpoint is not inside its container")]
    DetachedEndpoint,

    /// An ancestor expected to be an element is not one, so no address can
    /// be computed.
    #[error("ancestor chain contains a node without a tag")]
    MalformedAncestor,
}

/// Nearest ancestor-or-self of `node` that is a structural container.
///
/// The body root element is terminal and wins at every level - it is checked
/// before the class test, the policy chosen for the source's ambiguity
/// (see DESIGN.md). After it, a generic container classed `section` or
/// `body` terminates the walk. `None` when the walk runs out of parents.
pub fn resolve_container(doc: &Document, node: NodeId) -> Option<NodeId> {
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        if doc.is_body_root(id) {
            return Some(id);
        }
        if doc.is_section_container(id) || doc.is_body_wrapper(id) {
            return Some(id);
        }
        cursor = doc.parent(id);
    }
    None
}

/// Normalize both range endpoints to direct children of `container`.
///
/// Each endpoint is independently replaced by its parent until the parent is
/// the container, so later mutations move whole sibling subtrees and never
/// split a text node.
pub fn normalize_range(
    doc: &Document,
    container: NodeId,
    range: Range,
) -> Result<(NodeId, NodeId), EditError> {
    let start = normalize_endpoint(doc, container, range.start)?;
    let end = normalize_endpoint(doc, container, range.end)?;
    Ok((start, end))
}

fn normalize_endpoint(
    doc: &Document,
    container: NodeId,
    position: Position,
) -> Result<NodeId, EditError> {
    // An endpoint sitting on the container itself carries a child-index
    // offset (that is what the post-edit caret looks like); it resolves to
    // the child at that boundary, clamped to the last child.
    if position.node == container {
        let count = doc.child_count(container);
        if count == 0 {
            return Err(EditError::DetachedEndpoint);
        }
        return doc
            .child_at(container, position.offset.min(count - 1))
            .ok_or(EditError::DetachedEndpoint);
    }
    let mut node = position.node;
    loop {
        match doc.parent(node) {
            Some(parent) if parent == container => return Ok(node),
            Some(parent) => node = parent,
            None => return Err(EditError::DetachedEndpoint),
        }
    }
}

/// Wrap the selected run of siblings in a fresh section container.
///
/// The new section lands at the position the run's first child occupied,
/// holding the run unchanged and in order. The live selection collapses to
/// the boundary immediately before the new section, so the edit point sits
/// at the start of the new structure rather than inside it.
pub fn create_section(doc: &mut Document) -> Result<NodeId, EditError> {
    let range = doc.selection_range().ok_or(EditError::NoSelection)?;
    let ancestor = doc.common_ancestor(range).ok_or(EditError::NoContainer)?;
    let container = resolve_container(doc, ancestor).ok_or(EditError::NoContainer)?;
    let (start, end) = normalize_range(doc, container, range)?;
    let index = doc.child_index(start).ok_or(EditError::DetachedEndpoint)?;

    let section = doc.create_container(SECTION_CLASS);
    doc.wrap_children(section, start, end);
    debug!("wrapped sibling run into new section at index {index}");
    doc.set_caret(Position::new(container, index));
    Ok(section)
}

/// Insert a title marker as the first child of the enclosing section.
///
/// From the selection base, ascend to the first generic-container ancestor
/// and evaluate it: unless it is a section container without an existing
/// leading title, nothing happens (`None`) - the walk does not continue
/// upward past a failed guard. On success the new marker, holding
/// placeholder text, is returned.
pub fn insert_title(doc: &mut Document) -> Option<NodeId> {
    let base = doc.selection()?.base();
    let mut cursor = Some(base.node);
    while let Some(id) = cursor {
        if doc.is_body_root(id) {
            return None;
        }
        if doc.element(id).is_some_and(|el| el.is_container()) {
            if !doc.is_section_container(id) {
                return None;
            }
            if doc.has_title(id) {
                return None;
            }
            let title = doc.create_container(TITLE_CLASS);
            let text = doc.create_text(TITLE_PLACEHOLDER);
            doc.append_child(title, text);
            doc.prepend_child(id, title);
            debug!("inserted title marker into section {:?}", id);
            return Some(title);
        }
        cursor = doc.parent(id);
    }
    None
}

/// Append a fresh section (title marker plus empty paragraph) inside the
/// nearest section container or body wrapper above the selection.
pub fn append_section(doc: &mut Document) -> Option<NodeId> {
    let base = doc.selection()?.base();
    let mut cursor = Some(base.node);
    while let Some(id) = cursor {
        if doc.is_section_container(id) || doc.is_body_wrapper(id) {
            let section = doc.create_container(SECTION_CLASS);
            let title = doc.create_container(TITLE_CLASS);
            let title_p = doc.create_element("p");
            doc.append_child(title, title_p);
            doc.append_child(section, title);
            let paragraph = doc.create_element("p");
            doc.append_child(section, paragraph);
            doc.append_child(id, section);
            doc.set_caret(Position::new(paragraph, 0));
            return Some(section);
        }
        cursor = doc.parent(id);
    }
    None
}

/// Insert a subtitle marker among the children of the nearest section
/// container: after the selected child when that child is a title marker,
/// before it otherwise.
pub fn insert_subtitle(doc: &mut Document) -> Option<NodeId> {
    let base = doc.selection()?.base();
    let mut child = base.node;
    loop {
        let parent = doc.parent(child)?;
        if doc.is_section_container(parent) {
            let subtitle = doc.create_container(SUBTITLE_CLASS);
            let paragraph = doc.create_element("p");
            doc.append_child(subtitle, paragraph);
            let index = doc.child_index(child)?;
            if doc.is_title_marker(child) {
                doc.insert_child(parent, index + 1, subtitle);
            } else {
                doc.insert_child(parent, index, subtitle);
            }
            doc.set_caret(Position::new(paragraph, 0));
            return Some(subtitle);
        }
        child = parent;
    }
}

/// Unwrap the nearest section container above the selection into its parent.
///
/// Top-level sections (directly under the body wrapper) stay. When the
/// dissolved section was not the first child of its parent, its leading
/// title marker is demoted to a subtitle. Returns the parent the children
/// moved into.
pub fn dissolve_section(doc: &mut Document) -> Option<NodeId> {
    let base = doc.selection()?.base();
    let mut cursor = Some(base.node);
    while let Some(id) = cursor {
        if doc.is_section_container(id) {
            let parent = doc.parent(id)?;
            if doc.is_body_wrapper(parent) {
                return None;
            }
            let index = doc.child_index(id)?;
            if index != 0 {
                if let Some(first) = doc.first_child(id) {
                    if doc.is_title_marker(first) {
                        doc.set_attr(first, "class", SUBTITLE_CLASS);
                    }
                }
            }
            doc.unwrap_element(id);
            debug!("dissolved section at index {index} into {:?}", parent);
            doc.set_caret(Position::new(parent, index));
            return Some(parent);
        }
        cursor = doc.parent(id);
    }
    None
}

// =============================================================================
// Tests
// =============================================================================
