//! Markup parsing via html5ever tree construction.
//!
//! The sink builds the same arena representation the rest of the engine
//! operates on - there is no intermediate tree. html5ever supplies full
//! HTML5 error recovery, so any markup a browser-grade host would hand us
//! produces a usable document.

use std::borrow::Cow;
use std::cell::RefCell;

use compact_str::CompactString;
use html5ever::tree_builder::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink};
use html5ever::{Attribute, LocalName, QualName, parse_document};
use html5ever::{local_name, namespace_url, ns};
use indextree::{Arena, NodeId};
use tendril::{StrTendril, TendrilSink};

use crate::arena_dom::{Document, ElementData, NodeKind};

/// Parse markup into a [`Document`].
///
/// # Example
///
/// ```rust
/// let doc = quire::parse("<html><body><p>Hello</p></body></html>");
/// assert_eq!(doc.to_markup(), "<body><p>Hello</p></body>");
/// ```
pub fn parse(markup: &str) -> Document {
    let sink = ArenaSink::new();
    let tendril = StrTendril::from(markup);
    parse_document(sink, Default::default()).one(tendril)
}

/// Owned element name wrapper.
#[derive(Debug, Clone)]
struct SinkElemName(QualName);

impl ElemName for SinkElemName {
    fn ns(&self) -> &html5ever::Namespace {
        &self.0.ns
    }

    fn local_name(&self) -> &LocalName {
        &self.0.local
    }
}

/// TreeSink building the arena - RefCell because html5ever drives the sink
/// through shared references.
struct ArenaSink {
    arena: RefCell<Arena<NodeKind>>,

    /// Invisible root above the markup wrapper.
    document: NodeId,
}

impl ArenaSink {
    fn new() -> Self {
        let mut arena = Arena::new();
        let document = arena.new_node(NodeKind::Root);
        ArenaSink {
            arena: RefCell::new(arena),
            document,
        }
    }
}

impl TreeSink for ArenaSink {
    type Handle = NodeId;
    type Output = Document;
    type ElemName<'a>
        = SinkElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        let arena = self.arena.into_inner();

        // The wrapper element (usually <html>); comments may precede it.
        let root = self
            .document
            .children(&arena)
            .find(|&id| matches!(arena[id].get(), NodeKind::Element(_)))
            .unwrap_or(self.document);

        Document::from_parts(arena, root)
    }

    fn parse_error(&self, _msg: Cow<'static, str>) {
        // html5ever recovers on its own
    }

    fn get_document(&self) -> Self::Handle {
        self.document
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn same_node(&self, a: &Self::Handle, b: &Self::Handle) -> bool {
        a == b
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> SinkElemName {
        let arena = self.arena.borrow();
        if let NodeKind::Element(el) = arena[*target].get() {
            SinkElemName(QualName {
                prefix: None,
                ns: ns!(html),
                local: LocalName::from(el.tag.as_str()),
            })
        } else {
            // Not an element - return placeholder
            SinkElemName(QualName {
                prefix: None,
                ns: ns!(html),
                local: local_name!(""),
            })
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        let tag: &str = &name.local;
        let mut el = ElementData::new(tag);
        for attr in attrs {
            // first occurrence wins, insertion order preserved
            let key: &str = &attr.name.local;
            let value: &str = &attr.value;
            el.attrs
                .entry(CompactString::from(key))
                .or_insert_with(|| CompactString::from(value));
        }
        self.arena.borrow_mut().new_node(NodeKind::Element(el))
    }

    fn create_comment(&self, text: StrTendril) -> Self::Handle {
        self.arena
            .borrow_mut()
            .new_node(NodeKind::Comment(CompactString::from(&*text)))
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        // Processing instructions do not occur in book markup - keep the
        // slot as an empty comment
        self.arena
            .borrow_mut()
            .new_node(NodeKind::Comment(CompactString::new("")))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match child {
            NodeOrText::AppendNode(node) => {
                parent.append(node, &mut arena);
            }
            NodeOrText::AppendText(text) => {
                // Merge with a trailing text node (html5ever behavior).
                // Grab the id first so no iterator borrow is held.
                let last_child = arena[*parent].last_child();
                if let Some(last) = last_child {
                    if let NodeKind::Text(existing) = arena[last].get_mut() {
                        existing.push_str(&text);
                        return;
                    }
                }
                let node = arena.new_node(NodeKind::Text(CompactString::from(&*text)));
                parent.append(node, &mut arena);
            }
        }
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, new_node: NodeOrText<Self::Handle>) {
        let mut arena = self.arena.borrow_mut();
        match new_node {
            NodeOrText::AppendNode(node) => {
                sibling.insert_before(node, &mut arena);
            }
            NodeOrText::AppendText(text) => {
                let node = arena.new_node(NodeKind::Text(CompactString::from(&*text)));
                sibling.insert_before(node, &mut arena);
            }
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        _prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        self.append(element, child);
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
        // book documents carry no doctype
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        *target
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut arena = self.arena.borrow_mut();
        if let NodeKind::Element(el) = arena[*target].get_mut() {
            for attr in attrs {
                let key: &str = &attr.name.local;
                let value: &str = &attr.value;
                el.attrs
                    .entry(CompactString::from(key))
                    .or_insert_with(|| CompactString::from(value));
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        target.detach(&mut self.arena.borrow_mut());
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        let mut arena = self.arena.borrow_mut();
        let children: Vec<NodeId> = node.children(&arena).collect();
        for child in children {
            child.detach(&mut arena);
            new_parent.append(child, &mut arena);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
