//! Compact, restorable addresses for a selection scoped to its section.
//!
//! `<container-address>|<start>,<end>` - the address of the selection's
//! nearest structural container, then the child indices of the two
//! normalized endpoints. This is what a persistence layer stores to bring
//! the cursor back after a save/reload cycle.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::arena_dom::Document;
use crate::edit::{self, EditError};
use crate::path::{Address, AddressParseError, address_of};
use crate::selection::{Position, Selection};

/// A selection encoded relative to its nearest structural container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeAddress {
    /// Address of the enclosing container.
    pub container: Address,
    /// Child index of the normalized start endpoint.
    pub start: u32,
    /// Child index of the normalized end endpoint.
    pub end: u32,
}

impl fmt::Display for RangeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{},{}", self.container, self.start, self.end)
    }
}

/// Failure to parse or restore a [`RangeAddress`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    /// The encoded form has no `|` between container and indices.
    #[error("range address is missing the `|` separator")]
    MissingSeparator,

    /// The index pair after `|` is malformed.
    #[error("range address has a malformed index pair")]
    BadIndexPair,

    /// The container part does not parse as an address.
    #[error(transparent)]
    Address(#[from] AddressParseError),

    /// The container address does not resolve in this document.
    #[error("container address does not resolve")]
    UnknownContainer,

    /// An endpoint index points past the container's children.
    #[error("child index {0} is out of range")]
    IndexOutOfRange(u32),
}

impl FromStr for RangeAddress {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (container, indices) = s.split_once('|').ok_or(CodecError::MissingSeparator)?;
        let (start, end) = indices.split_once(',').ok_or(CodecError::BadIndexPair)?;
        let start: u32 = start.parse().map_err(|_| CodecError::BadIndexPair)?;
        let end: u32 = end.parse().map_err(|_| CodecError::BadIndexPair)?;
        Ok(Self {
            container: container.parse()?,
            start,
            end,
        })
    }
}

/// Encode the live selection against its nearest structural container.
///
/// Reads the selection fresh, resolves and normalizes like the structural
/// edits do, then records where the endpoints sit among the container's
/// children. The tree is not touched.
pub fn encode_selection(doc: &Document) -> Result<RangeAddress, EditError> {
    let range = doc.selection_range().ok_or(EditError::NoSelection)?;
    let ancestor = doc.common_ancestor(range).ok_or(EditError::NoContainer)?;
    let container = edit::resolve_container(doc, ancestor).ok_or(EditError::NoContainer)?;
    let (start, end) = edit::normalize_range(doc, container, range)?;

    let address = address_of(doc, container).ok_or(EditError::MalformedAncestor)?;
    let start = doc.child_index(start).ok_or(EditError::DetachedEndpoint)? as u32;
    let end = doc.child_index(end).ok_or(EditError::DetachedEndpoint)? as u32;
    debug!("encoded selection as {address}|{start},{end}");
    Ok(RangeAddress {
        container: address,
        start,
        end,
    })
}

impl RangeAddress {
    /// Set the live selection to span the children this address points at -
    /// the exact inverse of [`encode_selection`] on an unchanged tree.
    pub fn restore(&self, doc: &mut Document) -> Result<(), CodecError> {
        let container = self
            .container
            .resolve(doc)
            .ok_or(CodecError::UnknownContainer)?;
        let start = doc
            .child_at(container, self.start as usize)
            .ok_or(CodecError::IndexOutOfRange(self.start))?;
        let end = doc
            .child_at(container, self.end as usize)
            .ok_or(CodecError::IndexOutOfRange(self.end))?;
        doc.set_selection(Selection::new(
            Position::new(start, 0),
            Position::new(end, 0),
        ));
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
