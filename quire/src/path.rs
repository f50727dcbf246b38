//! Two encodings of where a node sits in the tree.
//!
//! - [`breadcrumb`] is the human-readable form shown in a status line:
//!   `/section/title`. Position-independent, collisions between same-shaped
//!   siblings are fine - it is a display aid, not a key.
//! - [`Address`] is the exact form: one `TAG=index` segment per ancestor
//!   level, reconstructible by descending the tree index by index as long as
//!   the tree has not changed underneath it.

use std::fmt;
use std::str::FromStr;

use compact_str::CompactString;
use indextree::NodeId;
use smallvec::SmallVec;
use thiserror::Error;

use crate::arena_dom::Document;

/// Human-readable ancestor path of `node`, outermost segment first, each
/// segment preceded by `/`.
///
/// The walk includes `node` itself and stops at the `body` root element,
/// which contributes nothing. A generic container contributes its class
/// verbatim (falling back to the tag when the attribute is missing); any
/// other element contributes its tag; text and comment levels are skipped.
pub fn breadcrumb(doc: &Document, node: NodeId) -> String {
    let mut segments: Vec<String> = Vec::new();
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        if doc.is_body_root(id) {
            break;
        }
        if let Some(el) = doc.element(id) {
            let segment = if el.is_container() {
                el.class().unwrap_or(el.tag.as_str())
            } else {
                el.tag.as_str()
            };
            segments.push(segment.to_string());
        }
        cursor = doc.parent(id);
    }

    let mut out = String::new();
    for segment in segments.iter().rev() {
        out.push('/');
        out.push_str(segment);
    }
    out
}

impl Document {
    /// Status line for the current selection: the breadcrumb of the node
    /// enclosing the selection base. `None` without a selection or when the
    /// base has no parent.
    pub fn status(&self) -> Option<String> {
        let sel = self.selection()?;
        let parent = self.parent(sel.base().node)?;
        Some(breadcrumb(self, parent))
    }
}

/// One level of an [`Address`]: the parent's tag and the child's identity
/// index among the parent's children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressSegment {
    /// Tag of the parent at this level.
    pub tag: CompactString,
    /// Index of the child at this level.
    pub index: u32,
}

/// Index-qualified path from the markup wrapper down to a node.
///
/// Uses SmallVec<[_; 16]> to avoid heap allocations for typical document
/// depths; book trees rarely nest deeper than 16 levels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Address(pub SmallVec<[AddressSegment; 16]>);

/// Compute the address of `node`.
///
/// Fails when the walk meets a non-element ancestor below the wrapper (a
/// malformed tree) or when `node` is detached from the wrapper entirely.
pub fn address_of(doc: &Document, node: NodeId) -> Option<Address> {
    let mut segments: SmallVec<[AddressSegment; 16]> = SmallVec::new();
    let mut cursor = node;
    while cursor != doc.root() {
        let parent = doc.parent(cursor)?;
        let el = doc.element(parent)?;
        let index = doc.child_index(cursor)? as u32;
        segments.push(AddressSegment {
            tag: el.tag.clone(),
            index,
        });
        cursor = parent;
    }
    segments.reverse();
    Some(Address(segments))
}

impl Address {
    /// Walk the address back down from the wrapper. Tags are carried for
    /// readability only; navigation is by index alone, as the original
    /// decoder did it.
    pub fn resolve(&self, doc: &Document) -> Option<NodeId> {
        let mut cursor = doc.root();
        for segment in &self.0 {
            cursor = doc.child_at(cursor, segment.index as usize)?;
        }
        Some(cursor)
    }

    /// Number of levels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the address of the wrapper itself.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}={}", segment.tag.to_ascii_uppercase(), segment.index)?;
        }
        Ok(())
    }
}

/// Failure to parse an [`Address`] from its string form.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressParseError {
    /// A segment has no `=` between tag and index.
    #[error("address segment `{0}` is missing `=`")]
    MissingSeparator(String),
    /// A segment's index is not a number.
    #[error("address segment `{0}` has a non-numeric index")]
    BadIndex(String),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut segments: SmallVec<[AddressSegment; 16]> = SmallVec::new();
        if s.is_empty() {
            return Ok(Self(segments));
        }
        for part in s.split(',') {
            let (tag, index) = part
                .split_once('=')
                .ok_or_else(|| AddressParseError::MissingSeparator(part.to_string()))?;
            let index: u32 = index
                .parse()
                .map_err(|_| AddressParseError::BadIndex(part.to_string()))?;
            segments.push(AddressSegment {
                tag: CompactString::from(tag),
                index,
            });
        }
        Ok(Self(segments))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena_dom::{SECTION_CLASS, TITLE_CLASS};
    use crate::selection::{Position, Selection};

    /// body > div.section > div.title > text
    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = crate::parse("<html><body></body></html>");
        let body = doc.body().unwrap();
        let section = doc.create_container(SECTION_CLASS);
        doc.append_child(body, section);
        let title = doc.create_container(TITLE_CLASS);
        doc.append_child(section, title);
        let text = doc.create_text("chapter one");
        doc.append_child(title, text);
        (doc, section, title, text)
    }

    #[test]
    fn test_breadcrumb_of_nested_title() {
        let (doc, _, title, _) = sample();
        assert_eq!(breadcrumb(&doc, title), "/section/title");
    }

    #[test]
    fn test_breadcrumb_skips_text_and_stops_at_body() {
        let (doc, _, _, text) = sample();
        // text level contributes nothing; body contributes nothing
        assert_eq!(breadcrumb(&doc, text), "/section/title");
    }

    #[test]
    fn test_breadcrumb_uses_tag_for_plain_elements() {
        let (mut doc, _, title, _) = sample();
        let p = doc.create_element("p");
        doc.append_child(title, p);
        assert_eq!(breadcrumb(&doc, p), "/section/title/p");
    }

    #[test]
    fn test_status_reports_selection_base_parent() {
        let (mut doc, _, _, text) = sample();
        doc.set_selection(Selection::caret(Position::new(text, 3)));
        assert_eq!(doc.status().as_deref(), Some("/section/title"));

        doc.clear_selection();
        assert_eq!(doc.status(), None);
    }

    #[test]
    fn test_address_display_uppercases_tags() {
        let (doc, _, title, _) = sample();
        let address = address_of(&doc, title).unwrap();
        // html > (head, body): body is the second child of the wrapper
        assert_eq!(address.to_string(), "HTML=1,BODY=0,DIV=0");
    }

    #[test]
    fn test_address_round_trip() {
        let (doc, section, title, text) = sample();
        for id in [section, title, text] {
            let address = address_of(&doc, id).unwrap();
            assert_eq!(address.resolve(&doc), Some(id));
        }
    }

    #[test]
    fn test_address_of_wrapper_is_empty() {
        let (doc, _, _, _) = sample();
        let address = address_of(&doc, doc.root()).unwrap();
        assert!(address.is_empty());
        assert_eq!(address.to_string(), "");
        assert_eq!(address.resolve(&doc), Some(doc.root()));
    }

    #[test]
    fn test_address_of_detached_node_fails() {
        let (mut doc, _, _, _) = sample();
        let stray = doc.create_element("p");
        assert_eq!(address_of(&doc, stray), None);
    }

    #[test]
    fn test_address_parse() {
        let address: Address = "HTML=1,BODY=0,DIV=2".parse().unwrap();
        assert_eq!(address.len(), 3);
        assert_eq!(address.0[2].index, 2);
        assert_eq!(address.to_string(), "HTML=1,BODY=0,DIV=2");

        assert_eq!(
            "DIV".parse::<Address>(),
            Err(AddressParseError::MissingSeparator("DIV".to_string()))
        );
        assert_eq!(
            "DIV=x".parse::<Address>(),
            Err(AddressParseError::BadIndex("DIV=x".to_string()))
        );
    }
}
