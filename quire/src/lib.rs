//! Structural-editing engine for hierarchical book-like documents.
//!
//! A book is a tree: a body wrapper, nested section containers, leaf
//! content. quire owns that tree in an arena and provides the operations a
//! WYSIWYG editing surface needs:
//!
//! - **Arena document**: Element/Text/Comment nodes in an `indextree` arena
//!   with stable ids, plus the mutation and selection primitives of a host
//!   editing surface
//! - **Tree export**: preorder event stream into a caller-supplied sink,
//!   optionally annotated with the live cursor position
//! - **Paths**: human-readable breadcrumbs and exact, index-qualified
//!   addresses for any node
//! - **Structural edits**: wrap a selection into a new section, insert
//!   title markers, dissolve sections - without corrupting sibling order
//! - **Range codec**: a compact string form of a selection, restorable
//!   across save/reload cycles
//!
//! # Example
//!
//! ```rust
//! use quire::{Position, Selection};
//!
//! let mut doc = quire::parse(
//!     r#"<html><body><div class="section"><p>One</p><p>Two</p><p>Three</p></div></body></html>"#,
//! );
//! let section = doc.children(doc.body().expect("body")).next().expect("section");
//! let first = doc.children(section).next().expect("first paragraph");
//! let second = doc.children(section).nth(1).expect("second paragraph");
//!
//! // Select from the first paragraph to the second, then wrap the run
//! doc.set_selection(Selection::new(Position::new(first, 0), Position::new(second, 0)));
//! let wrapped = quire::edit::create_section(&mut doc).expect("wrap selection");
//!
//! assert!(doc.is_section_container(wrapped));
//! assert_eq!(
//!     doc.to_markup(),
//!     r#"<body><div class="section"><div class="section"><p>One</p><p>Two</p></div><p>Three</p></div></body>"#,
//! );
//! ```

#[macro_use]
mod tracing_macros;

pub mod arena_dom;
pub mod codec;
pub mod edit;
pub mod export;
mod parser;
pub mod path;
pub mod selection;

// Stable node handle used throughout the public API
pub use indextree::NodeId;

// Re-export the core types at crate root for convenience
pub use arena_dom::{Document, ElementData, NodeKind};
pub use codec::{CodecError, RangeAddress, encode_selection};
pub use edit::EditError;
pub use export::{Event, EventLog, ExportSink, MarkupWriter, export, export_with_selection};
pub use parser::parse;
pub use path::{Address, address_of, breadcrumb};
pub use selection::{Position, Range, Selection};
