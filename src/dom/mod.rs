//! DOM access behind a trait, so the editor runs against the browser or an
//! in-memory tree

pub mod markup;
mod memory;
mod web;

pub use memory::{Caret, MemoryDom, NodeId};
pub use web::{js_message, WebDom};

use std::fmt::Debug;

use crate::error::DomError;

/// The DOM operations the editor needs.
///
/// Nodes are element handles. Text nodes only surface through
/// [`Dom::child_fragments`] and [`Dom::text_content`].
pub trait Dom {
    type Node: Clone + PartialEq + Debug;

    /// Parent element, if any
    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Element children in document order
    fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

    /// Per-word markup of a container: the inner HTML of every element child,
    /// plus any non-blank loose text (trimmed and escaped) in between
    fn child_fragments(&self, node: &Self::Node) -> Vec<String>;

    fn inner_html(&self, node: &Self::Node) -> String;

    /// Replace all children with parsed `html`
    fn set_inner_html(&mut self, node: &Self::Node, html: &str) -> Result<(), DomError>;

    fn text_content(&self, node: &Self::Node) -> String;

    /// Attribute lookup, case-insensitive on the name as in HTML documents
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str)
        -> Result<(), DomError>;

    fn set_style(&mut self, node: &Self::Node, property: &str, value: &str)
        -> Result<(), DomError>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn add_class(&mut self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    fn remove_class(&mut self, node: &Self::Node, class: &str) -> Result<(), DomError>;

    /// Collapse the document selection to the end of `node`'s content
    fn place_caret_at_end(&mut self, node: &Self::Node) -> Result<(), DomError>;

    /// Add `class` if absent, remove it if present. Returns whether it is now set.
    fn toggle_class(&mut self, node: &Self::Node, class: &str) -> Result<bool, DomError> {
        if self.has_class(node, class) {
            self.remove_class(node, class)?;
            Ok(false)
        } else {
            self.add_class(node, class)?;
            Ok(true)
        }
    }
}
