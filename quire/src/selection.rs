//! Selection and range primitives.
//!
//! Boundary points follow the host convention: the offset is a character
//! offset inside text nodes and a child index inside elements. `anchor` and
//! `focus` are order-independent - either may precede the other in document
//! order - so operations derive an ordered [`Range`] from the live selection
//! when they begin, and never cache it across mutations.

use std::cmp::Ordering;

use indextree::NodeId;
use smallvec::SmallVec;

use crate::arena_dom::Document;

/// A boundary point: a node plus an offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// The node the point lives in.
    pub node: NodeId,
    /// Character offset for text nodes, child index for elements.
    pub offset: usize,
}

impl Position {
    /// Create a boundary point.
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

/// The live selection: `anchor` is where it started, `focus` where it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Fixed end of the selection.
    pub anchor: Position,
    /// Moving end of the selection.
    pub focus: Position,
}

impl Selection {
    /// Create a selection from its two endpoints.
    pub fn new(anchor: Position, focus: Position) -> Self {
        Self { anchor, focus }
    }

    /// Collapsed selection at a single point.
    pub fn caret(position: Position) -> Self {
        Self {
            anchor: position,
            focus: position,
        }
    }

    /// True when anchor and focus coincide.
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// The base position ancestor walks start from (the anchor).
    pub fn base(&self) -> Position {
        self.anchor
    }
}

/// A selection ordered into document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    /// First endpoint in document order.
    pub start: Position,
    /// Last endpoint in document order.
    pub end: Position,
}

impl Document {
    /// Order the live selection's endpoints into a range. `None` when the
    /// host reports zero ranges.
    pub fn selection_range(&self) -> Option<Range> {
        let sel = *self.selection()?;
        match self.compare_positions(sel.anchor, sel.focus) {
            Ordering::Greater => Some(Range {
                start: sel.focus,
                end: sel.anchor,
            }),
            _ => Some(Range {
                start: sel.anchor,
                end: sel.focus,
            }),
        }
    }

    /// Document-order comparison of two boundary points.
    pub fn compare_positions(&self, a: Position, b: Position) -> Ordering {
        if a.node == b.node {
            return a.offset.cmp(&b.offset);
        }
        self.boundary_path(a).cmp(&self.boundary_path(b))
    }

    /// Lowest node that contains both endpoints of the range.
    pub fn common_ancestor(&self, range: Range) -> Option<NodeId> {
        let start_chain: Vec<NodeId> = range.start.node.ancestors(&self.arena).collect();
        range
            .end
            .node
            .ancestors(&self.arena)
            .find(|id| start_chain.contains(id))
    }

    /// Child-index path from the arena root down to the point, with the
    /// point's own offset as the final component. Lexicographic order over
    /// these paths is document order: when one node contains the other, the
    /// containing point's offset lines up against the index of the child on
    /// the deeper path, which is exactly the boundary-point rule.
    fn boundary_path(&self, p: Position) -> SmallVec<[u32; 16]> {
        let mut path: SmallVec<[u32; 16]> = SmallVec::new();
        let mut cursor = p.node;
        while let Some(parent) = self.arena[cursor].parent() {
            let index = parent
                .children(&self.arena)
                .position(|c| c == cursor)
                .unwrap_or(0);
            path.push(index as u32);
            cursor = parent;
        }
        path.reverse();
        path.push(p.offset as u32);
        path
    }
}

// =============================================================================
// Tests
// =============================================================================
