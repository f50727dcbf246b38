//! Depth-first export of a document subtree as an ordered event stream.
//!
//! The exporter walks a subtree in preorder and reports what it sees to an
//! [`ExportSink`] passed into the call - there is no ambient handler state.
//! Event order for an element is: its `attribute` events (declaration
//! order), then `enter`, the descendant events, then `exit`. Text and
//! comment leaves produce a single event each.
//!
//! The selection-aware variant additionally emits `anchor`/`focus`
//! immediately after the `text` event of the exact text node the live
//! selection references, carrying the in-text character offset.
//!
//! The markup wrapper element never has its attributes exported; every
//! other export root does.

use indextree::NodeId;

use crate::arena_dom::{Document, NodeKind};
use crate::selection::Selection;

/// Receiver for the export event stream.
///
/// `anchor`/`focus` have empty defaults so plain serializers can ignore
/// cursor annotation.
pub trait ExportSink {
    /// Attribute of the element whose `enter` event follows.
    fn attribute(&mut self, name: &str, value: &str);
    /// Start of an element.
    fn enter(&mut self, tag: &str);
    /// Text leaf.
    fn text(&mut self, content: &str);
    /// Comment leaf.
    fn comment(&mut self, content: &str);
    /// End of an element.
    fn exit(&mut self, tag: &str);
    /// The live anchor sits in the preceding text event, at `offset`.
    fn anchor(&mut self, offset: usize) {
        let _ = offset;
    }
    /// The live focus sits in the preceding text event, at `offset`.
    fn focus(&mut self, offset: usize) {
        let _ = offset;
    }
}

/// Export the subtree under `root` into `sink`.
pub fn export<S: ExportSink>(doc: &Document, root: NodeId, sink: &mut S) {
    walk(doc, root, None, sink);
}

/// Export the subtree under `root` into `sink`, annotating the live
/// selection's anchor and focus. The selection is read once, at entry.
pub fn export_with_selection<S: ExportSink>(doc: &Document, root: NodeId, sink: &mut S) {
    let selection = doc.selection().copied();
    walk(doc, root, selection.as_ref(), sink);
}

/// Collect the plain event stream for a subtree.
pub fn export_events(doc: &Document, root: NodeId) -> Vec<Event> {
    let mut log = EventLog::default();
    export(doc, root, &mut log);
    log.events
}

fn walk<S: ExportSink>(doc: &Document, id: NodeId, selection: Option<&Selection>, sink: &mut S) {
    trace!("exporting node {:?}", id);
    match doc.get(id) {
        NodeKind::Root => {
            for child in doc.children(id) {
                walk(doc, child, selection, sink);
            }
        }
        NodeKind::Text(content) => {
            sink.text(content);
            if let Some(sel) = selection {
                if sel.anchor.node == id {
                    sink.anchor(sel.anchor.offset);
                }
                if sel.focus.node == id {
                    sink.focus(sel.focus.offset);
                }
            }
        }
        NodeKind::Comment(content) => {
            sink.comment(content);
        }
        NodeKind::Element(el) => {
            // The wrapper is synthetic; its attributes are not content.
            if id != doc.root() {
                for (name, value) in &el.attrs {
                    sink.attribute(name.as_str(), value.as_str());
                }
            }
            sink.enter(el.tag.as_str());
            for child in doc.children(id) {
                walk(doc, child, selection, sink);
            }
            sink.exit(el.tag.as_str());
        }
    }
}

/// One event of the export stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Attribute of the element entered next.
    Attribute {
        /// Attribute name.
        name: String,
        /// Attribute value.
        value: String,
    },
    /// Start of an element.
    Enter(String),
    /// Text leaf.
    Text(String),
    /// Comment leaf.
    Comment(String),
    /// End of an element.
    Exit(String),
    /// Live anchor offset into the preceding text event.
    Anchor(usize),
    /// Live focus offset into the preceding text event.
    Focus(usize),
}

/// Sink that records the stream as a vec of [`Event`]s.
#[derive(Debug, Default)]
pub struct EventLog {
    /// Recorded events, in stream order.
    pub events: Vec<Event>,
}

impl ExportSink for EventLog {
    fn attribute(&mut self, name: &str, value: &str) {
        self.events.push(Event::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        });
    }

    fn enter(&mut self, tag: &str) {
        self.events.push(Event::Enter(tag.to_string()));
    }

    fn text(&mut self, content: &str) {
        self.events.push(Event::Text(content.to_string()));
    }

    fn comment(&mut self, content: &str) {
        self.events.push(Event::Comment(content.to_string()));
    }

    fn exit(&mut self, tag: &str) {
        self.events.push(Event::Exit(tag.to_string()));
    }

    fn anchor(&mut self, offset: usize) {
        self.events.push(Event::Anchor(offset));
    }

    fn focus(&mut self, offset: usize) {
        self.events.push(Event::Focus(offset));
    }
}

// =============================================================================
// Markup rendering
// =============================================================================

/// HTML5 void elements that never get end tags.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag.to_ascii_lowercase().as_str())
}

/// Escape text content.
fn push_text_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Escape an attribute value for double-quoted output.
fn push_attr_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

/// Sink that renders the event stream as markup text.
///
/// Attribute events arrive before `enter` for the same element, so they are
/// buffered until the tag shows up.
#[derive(Debug, Default)]
pub struct MarkupWriter {
    out: String,
    pending_attrs: Vec<(String, String)>,
}

impl MarkupWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the rendered markup.
    pub fn finish(self) -> String {
        self.out
    }
}

impl ExportSink for MarkupWriter {
    fn attribute(&mut self, name: &str, value: &str) {
        self.pending_attrs.push((name.to_string(), value.to_string()));
    }

    fn enter(&mut self, tag: &str) {
        self.out.push('<');
        self.out.push_str(tag);
        for (name, value) in self.pending_attrs.drain(..) {
            self.out.push(' ');
            self.out.push_str(&name);
            self.out.push_str("=\"");
            push_attr_escaped(&mut self.out, &value);
            self.out.push('"');
        }
        self.out.push('>');
    }

    fn text(&mut self, content: &str) {
        push_text_escaped(&mut self.out, content);
    }

    fn comment(&mut self, content: &str) {
        self.out.push_str("<!--");
        // -- would close the comment early
        self.out.push_str(&content.replace("--", "- -"));
        self.out.push_str("-->");
    }

    fn exit(&mut self, tag: &str) {
        if is_void_element(tag) {
            return;
        }
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }
}

impl Document {
    /// Serialize the document from the body element inclusive.
    pub fn to_markup(&self) -> String {
        let mut writer = MarkupWriter::new();
        if let Some(body) = self.body() {
            export(self, body, &mut writer);
        }
        writer.finish()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena_dom::SECTION_CLASS;

    #[test]
    fn test_attribute_events_precede_enter() {
        let mut doc = Document::new_book();
        let div = doc.create_container(SECTION_CLASS);
        doc.set_attr(div, "id", "one");
        let text = doc.create_text("hi");
        doc.append_child(div, text);

        let events = export_events(&doc, div);
        assert_eq!(
            events,
            vec![
                Event::Attribute {
                    name: "class".to_string(),
                    value: "section".to_string()
                },
                Event::Attribute {
                    name: "id".to_string(),
                    value: "one".to_string()
                },
                Event::Enter("div".to_string()),
                Event::Text("hi".to_string()),
                Event::Exit("div".to_string()),
            ]
        );
    }

    #[test]
    fn test_wrapper_attributes_are_skipped() {
        let mut doc = Document::new_book();
        let root = doc.root();
        doc.set_attr(root, "lang", "en");

        let events = export_events(&doc, root);
        // the wrapper's own `lang` is not content, so the stream opens with
        // its enter event rather than an attribute
        assert!(matches!(events.first(), Some(Event::Enter(tag)) if tag == "html"));
        assert!(!events.iter().any(
            |e| matches!(e, Event::Attribute { name, .. } if name == "lang")
        ));
    }

    #[test]
    fn test_markup_text_escaping() {
        let mut writer = MarkupWriter::new();
        writer.enter("p");
        writer.text("a < b & c > d");
        writer.exit("p");
        assert_eq!(writer.finish(), "<p>a &lt; b &amp; c &gt; d</p>");
    }

    #[test]
    fn test_markup_attribute_escaping() {
        let mut writer = MarkupWriter::new();
        writer.attribute("title", "say \"hi\" & go");
        writer.enter("a");
        writer.exit("a");
        assert_eq!(
            writer.finish(),
            "<a title=\"say &quot;hi&quot; &amp; go\"></a>"
        );
    }

    #[test]
    fn test_markup_comment_dashes() {
        let mut writer = MarkupWriter::new();
        writer.comment("watch -- out");
        assert_eq!(writer.finish(), "<!--watch - - out-->");
    }

    #[test]
    fn test_markup_void_elements() {
        let mut writer = MarkupWriter::new();
        writer.enter("div");
        writer.enter("br");
        writer.exit("br");
        writer.exit("div");
        assert_eq!(writer.finish(), "<div><br></div>");
    }
}
