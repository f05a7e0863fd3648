//! Arena-backed DOM used off the browser (native builds, tests, benches)

use rustc_hash::FxHashMap;
use unicode_segmentation::UnicodeSegmentation;

use super::markup::{self, Attributes, Token};
use super::Dom;
use crate::error::DomError;

/// Handle to a node in a [`MemoryDom`]. Handles to nodes removed by
/// `set_inner_html` go stale and resolve to nothing, even after the slot is
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Collapsed caret position; `offset` counts grapheme clusters of the node's text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub node: NodeId,
    pub offset: usize,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element { tag: String, attrs: Attributes },
    Text(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    data: Option<NodeData>,
}

/// A minimal element/text tree in a generational slab. Nodes replaced by
/// `set_inner_html` are freed and their slots reused.
#[derive(Debug)]
pub struct MemoryDom {
    slots: Vec<Slot>,
    free: Vec<u32>,
    body: NodeId,
    /// `id` attribute -> attached element
    ids: FxHashMap<String, NodeId>,
    caret: Option<Caret>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// Create a document holding an empty `<body>`
    pub fn new() -> Self {
        let body = NodeData {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Element {
                tag: "body".to_string(),
                attrs: Attributes::new(),
            },
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                data: Some(body),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            ids: FxHashMap::default(),
            caret: None,
        }
    }

    /// Create a document whose body contains `html`
    pub fn from_html(html: &str) -> Result<Self, DomError> {
        let mut dom = Self::new();
        let body = dom.body;
        dom.set_inner_html(&body, html)?;
        Ok(dom)
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    pub fn caret(&self) -> Option<Caret> {
        self.caret
    }

    /// Tag name of an element, `None` for text nodes
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.node(node)?.kind {
            NodeKind::Element { tag, .. } => Some(tag.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// Allocated slots, live or free
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Nodes currently in the tree, `body` included
    pub fn live_nodes(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Whether `node` is reachable from `body`
    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.body {
                return true;
            }
            current = self.node(id).and_then(|data| data.parent);
        }
        false
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.serialize(node, &mut out);
        out
    }

    /// Attached elements under `root` carrying `class`, in document order
    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack: Vec<NodeId> = self.children(&root).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            if self.has_class(&id, class) {
                found.push(id);
            }
            stack.extend(self.children(&id).into_iter().rev());
        }
        found
    }

    fn node(&self, id: NodeId) -> Option<&NodeData> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.data.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.data.as_mut())
            .ok_or(DomError::MissingNode)
    }

    fn attrs(&self, id: NodeId) -> Option<&Attributes> {
        match &self.node(id)?.kind {
            NodeKind::Element { attrs, .. } => Some(attrs),
            NodeKind::Text(_) => None,
        }
    }

    fn attrs_mut(&mut self, id: NodeId) -> Result<&mut Attributes, DomError> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Element { attrs, .. } => Ok(attrs),
            NodeKind::Text(_) => Err(DomError::MissingNode),
        }
    }

    fn push_node(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, DomError> {
        let data = NodeData {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.data = Some(data);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = u32::try_from(self.slots.len())
                    .map_err(|_| DomError::Markup("node arena is full".into()))?;
                self.slots.push(Slot {
                    generation: 0,
                    data: Some(data),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        };
        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Free `root` and everything under it
    fn release(&mut self, root: NodeId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(slot) = self.slots.get_mut(id.index as usize) else {
                continue;
            };
            if slot.generation != id.generation {
                continue;
            }
            let Some(data) = slot.data.take() else {
                continue;
            };
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
            if self.caret.is_some_and(|caret| caret.node == id) {
                self.caret = None;
            }
            stack.extend(data.children);
        }
    }

    fn class_list(&self, id: NodeId) -> Vec<String> {
        self.attribute(&id, "class")
            .map(|classes| classes.split_ascii_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    fn register_ids(&mut self, root: NodeId, attach: bool) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if let Some(value) = self.attribute(&id, "id") {
                if attach {
                    self.ids.insert(value, id);
                } else if self.ids.get(&value) == Some(&id) {
                    self.ids.remove(&value);
                }
            }
            if let Some(data) = self.node(id) {
                stack.extend(data.children.iter().copied());
            }
        }
    }

    fn serialize(&self, id: NodeId, out: &mut String) {
        let Some(data) = self.node(id) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => markup::push_text(out, text),
            NodeKind::Element { tag, attrs } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    markup::push_attribute(out, value);
                    out.push('"');
                }
                out.push('>');
                if markup::is_void(tag) {
                    return;
                }
                for child in &data.children {
                    self.serialize(*child, out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(data) = self.node(id) else {
            return;
        };
        match &data.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element { .. } => {
                for child in &data.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }
}

impl Dom for MemoryDom {
    type Node = NodeId;

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.node(*node)?.parent
    }

    fn children(&self, node: &NodeId) -> Vec<NodeId> {
        self.node(*node)
            .map(|data| {
                data.children
                    .iter()
                    .copied()
                    .filter(|child| self.tag_name(*child).is_some())
                    .collect()
            })
            .unwrap_or_default()
    }

    fn child_fragments(&self, node: &NodeId) -> Vec<String> {
        let Some(data) = self.node(*node) else {
            return Vec::new();
        };
        data.children
            .iter()
            .filter_map(|child| match &self.node(*child)?.kind {
                NodeKind::Element { .. } => Some(self.inner_html(child)),
                NodeKind::Text(text) => {
                    let text = text.trim();
                    if text.is_empty() {
                        return None;
                    }
                    Some(markup::escape_text(text))
                }
            })
            .collect()
    }

    fn inner_html(&self, node: &NodeId) -> String {
        let mut out = String::new();
        if let Some(data) = self.node(*node) {
            for child in &data.children {
                self.serialize(*child, &mut out);
            }
        }
        out
    }

    fn set_inner_html(&mut self, node: &NodeId, html: &str) -> Result<(), DomError> {
        let tokens = markup::tokenize(html)?;
        let node = *node;

        let old_children = std::mem::take(&mut self.node_mut(node)?.children);
        let attached = self.is_attached(node);
        for child in old_children {
            if attached {
                self.register_ids(child, false);
            }
            self.release(child);
        }

        let mut stack: Vec<(NodeId, String)> = vec![(node, String::new())];
        for token in tokens {
            let parent = stack.last().map(|(id, _)| *id).unwrap_or(node);
            match token {
                Token::Text(text) => {
                    self.push_node(parent, NodeKind::Text(text))?;
                }
                Token::Start {
                    name,
                    attrs,
                    self_closing,
                } => {
                    let void = self_closing || markup::is_void(&name);
                    let id = self.push_node(
                        parent,
                        NodeKind::Element {
                            tag: name.clone(),
                            attrs,
                        },
                    )?;
                    if !void {
                        stack.push((id, name));
                    }
                }
                Token::End { name } => {
                    // Unmatched end tags are dropped, like a browser would
                    if let Some(pos) = stack.iter().skip(1).rposition(|(_, tag)| *tag == name) {
                        stack.truncate(pos + 1);
                    }
                }
            }
        }

        if attached {
            let children = self.node_mut(node)?.children.clone();
            for child in children {
                self.register_ids(child, true);
            }
        }
        Ok(())
    }

    fn text_content(&self, node: &NodeId) -> String {
        let mut out = String::new();
        self.collect_text(*node, &mut out);
        out
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.attrs(*node)?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.clone())
    }

    fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) -> Result<(), DomError> {
        let name = name.to_ascii_lowercase();
        let is_id = name == "id";
        if is_id && self.is_attached(*node) {
            self.register_ids(*node, false);
        }

        let attrs = self.attrs_mut(*node)?;
        match attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => attrs.push((name, value.to_string())),
        }

        if is_id && self.is_attached(*node) {
            self.ids.insert(value.to_string(), *node);
        }
        Ok(())
    }

    fn set_style(&mut self, node: &NodeId, property: &str, value: &str) -> Result<(), DomError> {
        let mut declarations: Vec<(String, String)> = self
            .attribute(node, "style")
            .unwrap_or_default()
            .split(';')
            .filter_map(|decl| {
                let (key, val) = decl.split_once(':')?;
                Some((key.trim().to_string(), val.trim().to_string()))
            })
            .collect();

        match declarations.iter_mut().find(|(key, _)| key == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => declarations.push((property.to_string(), value.to_string())),
        }

        let style = declarations
            .iter()
            .map(|(key, val)| format!("{key}: {val};"))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attribute(node, "style", &style)
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.class_list(*node).iter().any(|c| c == class)
    }

    fn add_class(&mut self, node: &NodeId, class: &str) -> Result<(), DomError> {
        let mut classes = self.class_list(*node);
        if classes.iter().any(|c| c == class) {
            return Ok(());
        }
        classes.push(class.to_string());
        self.set_attribute(node, "class", &classes.join(" "))
    }

    fn remove_class(&mut self, node: &NodeId, class: &str) -> Result<(), DomError> {
        let classes = self.class_list(*node);
        if !classes.iter().any(|c| c == class) {
            return Ok(());
        }
        let remaining: Vec<String> = classes.into_iter().filter(|c| c != class).collect();
        self.set_attribute(node, "class", &remaining.join(" "))
    }

    fn place_caret_at_end(&mut self, node: &NodeId) -> Result<(), DomError> {
        if self.node(*node).is_none() {
            return Err(DomError::MissingNode);
        }
        let offset = self.text_content(node).graphemes(true).count();
        self.caret = Some(Caret {
            node: *node,
            offset,
        });
        Ok(())
    }
}
