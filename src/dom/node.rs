//! Node handles with DOM-style accessors.

use std::fmt;
use std::hash::{Hash, Hasher};

use super::arena::{NodeData, NodeId};
use super::document::{Document, WeakDocument};
use super::markup::{self, Container};
use super::query;
use super::style::{self, InlineStyle};
use crate::error::{Error, Result};
use crate::event::{Event, Handler};
use crate::util;

/// `Node.nodeType`, plus the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeType {
    Element,
    Text,
    Comment,
    Document,
    Doctype,
    Window,
}

/// A handle to one node of a [`Document`].
///
/// Handles are cheap to clone and compare by identity: two handles are equal
/// when they point at the same node of the same document. A detached node
/// stays allocated while any handle to it, or to a node in its subtree, is
/// alive.
pub struct Node {
    doc: Document,
    id: NodeId,
}

/// Non-owning handle to a [`Node`].
///
/// It keeps neither the document nor the node alive, so listeners can
/// capture one without tying the document to itself.
#[derive(Clone)]
pub struct WeakNode {
    doc: WeakDocument,
    id: NodeId,
}

impl WeakNode {
    /// The node, if its document is alive and the node was not freed.
    pub fn upgrade(&self) -> Option<Node> {
        let doc = self.doc.upgrade()?;
        let live = doc.arena().get(self.id).is_some();
        live.then(|| doc.node(self.id))
    }
}

impl Node {
    pub(crate) fn new(doc: Document, id: NodeId) -> Self {
        doc.retain_handle(id);
        Self { doc, id }
    }

    pub fn downgrade(&self) -> WeakNode {
        WeakNode {
            doc: self.doc.downgrade(),
            id: self.id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn node_type(&self) -> NodeType {
        let arena = self.doc.arena();
        match arena.get(self.id).map(|n| &n.data) {
            Some(NodeData::Element { .. }) => NodeType::Element,
            Some(NodeData::Text(_)) => NodeType::Text,
            Some(NodeData::Comment(_)) => NodeType::Comment,
            Some(NodeData::Doctype { .. }) => NodeType::Doctype,
            Some(NodeData::Window) => NodeType::Window,
            Some(NodeData::Document) | None => NodeType::Document,
        }
    }

    pub fn is_element(&self) -> bool {
        self.doc.arena().is_element(self.id)
    }

    pub fn is_window(&self) -> bool {
        self.id == self.doc.arena().window()
    }

    pub fn is_document(&self) -> bool {
        self.id == self.doc.arena().document()
    }

    /// True for nodes a selector query can run against: elements and the
    /// document itself.
    pub fn is_queryable(&self) -> bool {
        self.doc.arena().is_container(self.id)
    }

    /// Upper-cased tag name, like `Element.tagName` for HTML elements.
    pub fn tag_name(&self) -> Option<String> {
        self.local_name().map(|name| name.to_ascii_uppercase())
    }

    pub fn local_name(&self) -> Option<String> {
        self.doc.arena().element_name(self.id).map(|n| n.to_string())
    }

    fn wrap(&self, id: Option<NodeId>) -> Option<Node> {
        id.map(|id| self.doc.node(id))
    }

    pub fn parent_node(&self) -> Option<Node> {
        let parent = self.doc.arena().parent(self.id);
        self.wrap(parent)
    }

    pub fn parent_element(&self) -> Option<Node> {
        let parent = self.doc.arena().parent_element(self.id);
        self.wrap(parent)
    }

    /// All child nodes, text included.
    pub fn child_nodes(&self) -> Vec<Node> {
        let ids: Vec<_> = self.doc.arena().children(self.id).collect();
        ids.into_iter().map(|id| self.doc.node(id)).collect()
    }

    /// Element children only.
    pub fn children(&self) -> Vec<Node> {
        let ids: Vec<_> = {
            let arena = self.doc.arena();
            arena
                .children(self.id)
                .filter(|&c| arena.is_element(c))
                .collect()
        };
        ids.into_iter().map(|id| self.doc.node(id)).collect()
    }

    pub fn first_child(&self) -> Option<Node> {
        let first = self.doc.arena().first_child(self.id);
        self.wrap(first)
    }

    pub fn next_sibling(&self) -> Option<Node> {
        let next = self
            .doc
            .arena()
            .get(self.id)
            .map(|n| n.next_sibling)
            .filter(|n| n.is_some());
        self.wrap(next)
    }

    /// True if `other` is this node or lies inside its subtree.
    pub fn contains(&self, other: &Node) -> bool {
        self.doc.ptr_eq(&other.doc) && self.doc.arena().contains(self.id, other.id)
    }

    pub fn is_connected(&self) -> bool {
        self.doc.arena().is_connected(self.id)
    }

    pub fn text_content(&self) -> String {
        self.doc.arena().text_content(self.id)
    }

    /// Replace the children with a single text node.
    pub fn set_text_content(&self, text: &str) {
        let replaced = {
            let mut arena = self.doc.arena_mut();
            if let Some(node) = arena.get_mut(self.id)
                && let NodeData::Text(existing) = &mut node.data
            {
                *existing = text.to_string();
                return;
            }
            if !arena.is_container(self.id) {
                return;
            }
            let replaced: Vec<_> = arena.children(self.id).collect();
            arena.clear_children(self.id);
            if !text.is_empty() {
                let child = arena.create_text(text.to_string());
                arena.append(self.id, child);
            }
            replaced
        };
        self.doc.reclaim(&replaced);
    }

    pub fn inner_html(&self) -> String {
        let arena = self.doc.arena();
        markup::inner_html(&arena, self.id)
    }

    pub fn outer_html(&self) -> String {
        let arena = self.doc.arena();
        markup::outer_html(&arena, self.id)
    }

    /// Replace the children with the parsed `markup`, like `innerHTML = markup`.
    pub fn set_inner_html(&self, markup: &str) {
        let container = match self.local_name() {
            Some(tag) => Container::for_context(&tag),
            None if self.is_document() => Container::Div,
            None => return,
        };
        let nodes = self.doc.parse_fragment(markup, container);
        let replaced = {
            let mut arena = self.doc.arena_mut();
            let replaced: Vec<_> = arena.children(self.id).collect();
            arena.clear_children(self.id);
            for node in &nodes {
                arena.append(self.id, node.id);
            }
            replaced
        };
        self.doc.reclaim(&replaced);
    }

    pub fn get_attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        self.doc.arena().get_attr(self.id, &name).map(str::to_string)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        self.doc.arena_mut().set_attr(self.id, name, value);
    }

    pub fn remove_attribute(&self, name: &str) {
        self.doc.arena_mut().remove_attr(self.id, name);
    }

    /// Attribute `(name, value)` pairs in source order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.doc
            .arena()
            .attrs(self.id)
            .iter()
            .map(|a| (a.name.local.to_string(), a.value.clone()))
            .collect()
    }

    /// `Element.id`: the `id` attribute, or empty.
    pub fn element_id(&self) -> String {
        self.doc
            .arena()
            .element_id(self.id)
            .unwrap_or_default()
            .to_string()
    }

    /// `Element.className`: the raw `class` attribute, or empty.
    pub fn class_name(&self) -> String {
        self.get_attribute("class").unwrap_or_default()
    }

    pub fn set_class_name(&self, value: &str) {
        self.set_attribute("class", value);
    }

    /// The class tokens, in order.
    pub fn class_list(&self) -> Vec<String> {
        self.doc.arena().element_classes(self.id).to_vec()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.doc
            .arena()
            .element_classes(self.id)
            .iter()
            .any(|c| c == class)
    }

    /// Parsed `style` attribute.
    pub fn inline_style(&self) -> InlineStyle {
        self.get_attribute("style")
            .map(|css| InlineStyle::parse(&css))
            .unwrap_or_default()
    }

    fn store_inline_style(&self, style: &InlineStyle) {
        if style.is_empty() && !self.has_attribute("style") {
            return;
        }
        self.set_attribute("style", &style.to_css_text());
    }

    /// `element.style[name]`: the inline value only.
    pub fn style(&self, property: &str) -> Option<String> {
        let property = util::css_property_name(property);
        self.inline_style().get(&property).map(str::to_string)
    }

    /// `element.style[name] = value`. An empty value removes the property.
    pub fn set_style(&self, property: &str, value: &str) {
        if !self.is_element() {
            return;
        }
        let mut style = self.inline_style();
        style.set(&util::css_property_name(property), value);
        self.store_inline_style(&style);
    }

    /// `element.style.cssText += css`.
    pub fn append_css_text(&self, css: &str) {
        if !self.is_element() {
            return;
        }
        let mut style = self.inline_style();
        style.append_css_text(css);
        self.store_inline_style(&style);
    }

    /// `getComputedStyle(element)[name]`, resolved against the document's
    /// `<style>` sheets and the user-agent defaults.
    pub fn computed_style(&self, property: &str) -> Option<String> {
        let arena = self.doc.arena();
        let sheets = style::document_stylesheets(&arena);
        style::computed_value(&arena, self.id, &util::css_property_name(property), &sheets)
    }

    /// `element.dataset[name]`, with `name` in camelCase.
    pub fn data(&self, name: &str) -> Option<String> {
        self.get_attribute(&util::data_attribute_name(name))
    }

    pub fn set_data(&self, name: &str, value: &str) {
        self.set_attribute(&util::data_attribute_name(name), value);
    }

    /// All `data-*` attributes as `(camelCaseName, value)`.
    pub fn dataset(&self) -> Vec<(String, String)> {
        self.attributes()
            .into_iter()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|rest| (util::to_camel_case(rest), value))
            })
            .collect()
    }

    fn check_insertable(&self, child: &Node) -> Result<()> {
        if !self.doc.ptr_eq(&child.doc) {
            return Err(Error::HierarchyRequest(
                "node belongs to another document".to_string(),
            ));
        }
        let arena = self.doc.arena();
        if !arena.is_container(self.id) {
            return Err(Error::HierarchyRequest(
                "parent cannot have children".to_string(),
            ));
        }
        if child.id == arena.document() || child.id == arena.window() {
            return Err(Error::HierarchyRequest(
                "the document and window cannot be inserted".to_string(),
            ));
        }
        if arena.contains(child.id, self.id) {
            return Err(Error::HierarchyRequest(
                "a node cannot be inserted into itself or its descendants".to_string(),
            ));
        }
        Ok(())
    }

    /// Move `child` to the end of this node's children.
    pub fn append_child(&self, child: &Node) -> Result<()> {
        self.check_insertable(child)?;
        self.doc.arena_mut().append(self.id, child.id);
        Ok(())
    }

    /// Move `child` before `reference`, or to the end when there is none.
    pub fn insert_before(&self, child: &Node, reference: Option<&Node>) -> Result<()> {
        self.check_insertable(child)?;
        match reference {
            Some(reference) if reference.id == child.id => Ok(()),
            Some(reference) => {
                if self.doc.arena().parent(reference.id) != Some(self.id) {
                    return Err(Error::HierarchyRequest(
                        "reference node is not a child of this node".to_string(),
                    ));
                }
                self.doc.arena_mut().insert_before(reference.id, child.id);
                Ok(())
            }
            None => {
                self.doc.arena_mut().append(self.id, child.id);
                Ok(())
            }
        }
    }

    /// Detach this node from its parent. Parentless nodes are left alone.
    pub fn remove(&self) {
        self.doc.arena_mut().detach(self.id);
    }

    /// True if this element matches the selector group.
    pub fn matches(&self, selector: &str) -> Result<bool> {
        let selectors = query::parse_selectors(selector)?;
        Ok(query::matches(&self.doc.arena(), self.id, &selectors))
    }

    /// Descendant elements matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        let selectors = query::parse_selectors(selector)?;
        Ok(self.select_parsed(&selectors))
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<Node>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub(crate) fn select_parsed(&self, selectors: &query::Selectors) -> Vec<Node> {
        let ids = query::select_all(&self.doc.arena(), self.id, selectors);
        ids.into_iter().map(|id| self.doc.node(id)).collect()
    }

    /// Register `handler` for `event`. Registering the same handler twice
    /// for one event has no effect.
    pub fn add_event_listener(&self, event: &str, handler: &Handler) {
        self.doc.arena_mut().add_listener(self.id, event, handler);
    }

    pub fn remove_event_listener(&self, event: &str, handler: &Handler) {
        self.doc.arena_mut().remove_listener(self.id, event, handler);
    }

    /// Dispatch `event` with this node as target. Returns false if a
    /// listener called `prevent_default`.
    pub fn dispatch_event(&self, event: &Event) -> bool {
        self.doc.dispatch(self.id, event)
    }
}

impl Clone for Node {
    fn clone(&self) -> Self {
        Node::new(self.doc.clone(), self.id)
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.doc.release_handle(self.id);
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.doc.ptr_eq(&other.doc)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(arena) = self.doc.try_arena() else {
            return write!(f, "Node({})", self.id.index());
        };
        match arena.get(self.id).map(|n| &n.data) {
            Some(NodeData::Element { name, id, .. }) => match id {
                Some(id) => write!(f, "<{}#{}>", name.local, id),
                None => write!(f, "<{}>", name.local),
            },
            Some(NodeData::Text(text)) => write!(f, "#text {:?}", text),
            Some(NodeData::Comment(_)) => write!(f, "#comment"),
            Some(NodeData::Doctype { .. }) => write!(f, "#doctype"),
            Some(NodeData::Document) => write!(f, "#document"),
            Some(NodeData::Window) => write!(f, "#window"),
            None => write!(f, "Node({})", self.id.index()),
        }
    }
}
