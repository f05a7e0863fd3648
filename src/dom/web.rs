//! Browser DOM via web-sys

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, Node};

use super::{markup, Dom};
use crate::error::DomError;

/// [`Dom`] over the live browser document
#[derive(Debug, Clone)]
pub struct WebDom {
    document: Document,
}

impl WebDom {
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    /// The current window's document, if running in a page
    pub fn from_window() -> Option<Self> {
        web_sys::window()?.document().map(Self::new)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

/// Best-effort message of a thrown JS value: the string itself, or its
/// `message` property for `Error` objects
pub fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    js_sys::Reflect::get(value, &JsValue::from_str("message"))
        .ok()
        .and_then(|message| message.as_string())
        .unwrap_or_else(|| format!("{value:?}"))
}

fn js_error(value: JsValue) -> DomError {
    DomError::Js(js_message(&value))
}

impl Dom for WebDom {
    type Node = Element;

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn children(&self, node: &Element) -> Vec<Element> {
        let children = node.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .collect()
    }

    fn child_fragments(&self, node: &Element) -> Vec<String> {
        let nodes = node.child_nodes();
        (0..nodes.length())
            .filter_map(|i| nodes.item(i))
            .filter_map(|child| {
                if let Some(element) = child.dyn_ref::<Element>() {
                    return Some(element.inner_html());
                }
                if child.node_type() != Node::TEXT_NODE {
                    return None;
                }
                let text = child.text_content().unwrap_or_default();
                let text = text.trim();
                if text.is_empty() {
                    return None;
                }
                Some(markup::escape_text(text))
            })
            .collect()
    }

    fn inner_html(&self, node: &Element) -> String {
        node.inner_html()
    }

    fn set_inner_html(&mut self, node: &Element, html: &str) -> Result<(), DomError> {
        node.set_inner_html(html);
        Ok(())
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn set_attribute(&mut self, node: &Element, name: &str, value: &str) -> Result<(), DomError> {
        node.set_attribute(name, value).map_err(js_error)
    }

    fn set_style(&mut self, node: &Element, property: &str, value: &str) -> Result<(), DomError> {
        node.dyn_ref::<HtmlElement>()
            .ok_or_else(|| DomError::Js(format!("<{}> has no style", node.tag_name())))?
            .style()
            .set_property(property, value)
            .map_err(js_error)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn add_class(&mut self, node: &Element, class: &str) -> Result<(), DomError> {
        node.class_list().add_1(class).map_err(js_error)
    }

    fn remove_class(&mut self, node: &Element, class: &str) -> Result<(), DomError> {
        node.class_list().remove_1(class).map_err(js_error)
    }

    fn place_caret_at_end(&mut self, node: &Element) -> Result<(), DomError> {
        let range = self.document.create_range().map_err(js_error)?;
        range.select_node_contents(node).map_err(js_error)?;
        range.collapse_with_to_start(false);

        let Some(selection) = self.document.get_selection().map_err(js_error)? else {
            return Ok(());
        };
        selection.remove_all_ranges().map_err(js_error)?;
        selection.add_range(&range).map_err(js_error)
    }
}
