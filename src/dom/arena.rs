//! Arena-based node storage.
//!
//! Every node of a document lives in one slot vector; parent, child and
//! sibling links are ids into it. Detaching a node only unlinks it, so
//! handles held by a [`Selection`] stay valid after `remove()`. A detached
//! subtree nobody holds a handle to can be freed with [`NodeArena::reclaim`];
//! its slots are reused under a new generation, so stale ids resolve to
//! nothing instead of to the slot's next occupant.
//!
//! [`Selection`]: crate::Selection

use html5ever::{LocalName, Namespace, QualName, ns};

use crate::event::Handler;

/// Generation-tagged identifier for a node in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Sentinel value for no node.
    pub const NONE: NodeId = NodeId {
        index: u32::MAX,
        generation: 0,
    };

    /// Slot index.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// How many times the slot was freed before this node took it.
    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Check if this is a valid node ID.
    pub fn is_some(&self) -> bool {
        self.index != u32::MAX
    }

    /// Check if this is the sentinel value.
    pub fn is_none(&self) -> bool {
        self.index == u32::MAX
    }

    fn option(self) -> Option<NodeId> {
        self.is_some().then_some(self)
    }
}

/// Node payload.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// The global window. Never linked into the tree; only an event target.
    Window,
    /// Document root.
    Document,
    /// Element with name and attributes.
    Element {
        name: QualName,
        attrs: Vec<Attribute>,
        /// Cached `id` attribute for selector matching.
        id: Option<String>,
        /// Cached class tokens for selector matching.
        classes: Vec<String>,
    },
    Text(String),
    Comment(String),
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },
}

/// HTML attribute.
#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: QualName,
    pub value: String,
}

/// A registered event listener.
#[derive(Clone)]
pub(crate) struct Listener {
    pub event: String,
    pub handler: Handler,
}

/// A node in the arena.
pub struct ArenaNode {
    pub data: NodeData,
    pub parent: NodeId,
    pub first_child: NodeId,
    pub last_child: NodeId,
    pub prev_sibling: NodeId,
    pub next_sibling: NodeId,
    pub(crate) listeners: Vec<Listener>,
}

impl ArenaNode {
    fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: NodeId::NONE,
            first_child: NodeId::NONE,
            last_child: NodeId::NONE,
            prev_sibling: NodeId::NONE,
            next_sibling: NodeId::NONE,
            listeners: Vec::new(),
        }
    }
}

struct Slot {
    generation: u32,
    node: Option<ArenaNode>,
}

/// Arena-based DOM tree.
pub struct NodeArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    allocated_since_sweep: usize,
    document: NodeId,
    window: NodeId,
}

impl NodeArena {
    /// Create an arena holding only the document root and the window.
    pub fn new() -> Self {
        let mut arena = Self {
            slots: Vec::new(),
            free: Vec::new(),
            allocated_since_sweep: 0,
            document: NodeId::NONE,
            window: NodeId::NONE,
        };
        arena.document = arena.alloc(ArenaNode::new(NodeData::Document));
        arena.window = arena.alloc(ArenaNode::new(NodeData::Window));
        arena.allocated_since_sweep = 0;
        arena
    }

    fn alloc(&mut self, node: ArenaNode) -> NodeId {
        self.allocated_since_sweep += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return NodeId {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        NodeId {
            index,
            generation: 0,
        }
    }

    fn slot(&self, id: NodeId) -> Option<&Slot> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
    }

    pub fn document(&self) -> NodeId {
        self.document
    }

    pub fn window(&self) -> NodeId {
        self.window
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> Option<&ArenaNode> {
        self.slot(id).and_then(|slot| slot.node.as_ref())
    }

    /// Get a mutable node by ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut ArenaNode> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Number of live nodes, detached ones included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// True when nothing besides the document root and window exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 2
    }

    /// Number of slots, live or free.
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    /// Nodes allocated since the last [`NodeArena::sweep`].
    pub fn allocated_since_sweep(&self) -> usize {
        self.allocated_since_sweep
    }

    /// Create a new, parentless element node.
    pub fn create_element(&mut self, name: QualName, attrs: Vec<Attribute>) -> NodeId {
        let mut id = None;
        let mut classes = Vec::new();
        refresh_cached_attrs(&attrs, &mut id, &mut classes);

        self.alloc(ArenaNode::new(NodeData::Element {
            name,
            attrs,
            id,
            classes,
        }))
    }

    /// Create an HTML element from a bare tag name.
    pub fn create_html_element(&mut self, tag: &str) -> NodeId {
        let name = QualName::new(None, ns!(html), LocalName::from(tag.to_ascii_lowercase()));
        self.create_element(name, Vec::new())
    }

    pub fn create_text(&mut self, text: String) -> NodeId {
        self.alloc(ArenaNode::new(NodeData::Text(text)))
    }

    pub fn create_comment(&mut self, text: String) -> NodeId {
        self.alloc(ArenaNode::new(NodeData::Comment(text)))
    }

    pub fn create_doctype(&mut self, name: String, public_id: String, system_id: String) -> NodeId {
        self.alloc(ArenaNode::new(NodeData::Doctype {
            name,
            public_id,
            system_id,
        }))
    }

    /// Append `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
        }

        if let Some(last_node) = self.get_mut(last_child) {
            last_node.next_sibling = child;
        }

        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Insert `new_node` immediately before `sibling`, under the sibling's parent.
    pub fn insert_before(&mut self, sibling: NodeId, new_node: NodeId) {
        if sibling == new_node {
            return;
        }
        self.detach(new_node);

        let (parent, prev) = match self.get(sibling) {
            Some(n) => (n.parent, n.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }

        if let Some(sib) = self.get_mut(sibling) {
            sib.prev_sibling = new_node;
        }

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = new_node;
            }
        } else if let Some(par) = self.get_mut(parent) {
            par.first_child = new_node;
        }
    }

    /// Append text to the last child if it is a text node, otherwise create one.
    pub fn append_text(&mut self, parent: NodeId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(NodeId::NONE);

        if let Some(last) = self.get_mut(last_child)
            && let NodeData::Text(ref mut existing) = last.data
        {
            existing.push_str(text);
            return;
        }

        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    /// Unlink a node from its parent and siblings. The node itself (and its
    /// subtree) stays allocated.
    pub fn detach(&mut self, target: NodeId) {
        let (parent, prev, next) = match self.get(target) {
            Some(n) => (n.parent, n.prev_sibling, n.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(p) = self.get_mut(prev) {
                p.next_sibling = next;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.first_child = next;
        }

        if next.is_some() {
            if let Some(n) = self.get_mut(next) {
                n.prev_sibling = prev;
            }
        } else if let Some(p) = self.get_mut(parent) {
            p.last_child = prev;
        }

        if let Some(node) = self.get_mut(target) {
            node.parent = NodeId::NONE;
            node.prev_sibling = NodeId::NONE;
            node.next_sibling = NodeId::NONE;
        }
    }

    /// Detach every child of `parent`.
    pub fn clear_children(&mut self, parent: NodeId) {
        let children: Vec<_> = self.children(parent).collect();
        for child in children {
            self.detach(child);
        }
    }

    /// Free the subtree rooted at the parentless node `root`, unless
    /// `is_held` reports a handle to any node in it. The document and the
    /// window are never freed.
    ///
    /// The freed nodes are handed back: dropping them drops their listeners,
    /// which may run arbitrary destructors, so callers do that once no
    /// borrow of the arena is live.
    pub fn reclaim<F>(&mut self, root: NodeId, is_held: F) -> Vec<ArenaNode>
    where
        F: Fn(NodeId) -> bool,
    {
        if root == self.document || root == self.window {
            return Vec::new();
        }
        match self.get(root) {
            Some(node) if node.parent.is_none() => {}
            _ => return Vec::new(),
        }
        let subtree: Vec<NodeId> = std::iter::once(root).chain(self.descendants(root)).collect();
        if subtree.iter().any(|&id| is_held(id)) {
            return Vec::new();
        }
        subtree.into_iter().filter_map(|id| self.free(id)).collect()
    }

    /// [`NodeArena::reclaim`] every detached subtree.
    pub fn sweep<F>(&mut self, is_held: F) -> Vec<ArenaNode>
    where
        F: Fn(NodeId) -> bool,
    {
        self.allocated_since_sweep = 0;
        let roots: Vec<NodeId> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let node = slot.node.as_ref()?;
                node.parent.is_none().then_some(NodeId {
                    index: index as u32,
                    generation: slot.generation,
                })
            })
            .collect();
        roots
            .into_iter()
            .flat_map(|root| self.reclaim(root, &is_held))
            .collect()
    }

    fn free(&mut self, id: NodeId) -> Option<ArenaNode> {
        let slot = self
            .slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)?;
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    /// Deep-copy a subtree from another arena into this one. The copy is
    /// parentless and carries no listeners.
    pub fn adopt(&mut self, source: &NodeArena, id: NodeId) -> Option<NodeId> {
        let node = source.get(id)?;
        let copy = match &node.data {
            NodeData::Element { name, attrs, .. } => self.create_element(name.clone(), attrs.clone()),
            NodeData::Text(text) => self.create_text(text.clone()),
            NodeData::Comment(text) => self.create_comment(text.clone()),
            NodeData::Doctype {
                name,
                public_id,
                system_id,
            } => self.create_doctype(name.clone(), public_id.clone(), system_id.clone()),
            NodeData::Document | NodeData::Window => return None,
        };
        for child in source.children(id) {
            if let Some(child_copy) = self.adopt(source, child) {
                self.append(copy, child_copy);
            }
        }
        Some(copy)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent.option())
    }

    /// Parent, but only when it is an element.
    pub fn parent_element(&self, id: NodeId) -> Option<NodeId> {
        self.parent(id).filter(|&p| self.is_element(p))
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child.option())
    }

    /// Iterate over children of a node.
    pub fn children(&self, parent: NodeId) -> ChildrenIter<'_> {
        let first = self.get(parent).map(|n| n.first_child).unwrap_or(NodeId::NONE);
        ChildrenIter {
            arena: self,
            current: first,
        }
    }

    /// Iterate over the strict descendants of `root` in document (pre-)order.
    pub fn descendants(&self, root: NodeId) -> Descendants<'_> {
        Descendants {
            arena: self,
            root,
            current: self.first_child(root),
        }
    }

    /// Iterate from `id`'s parent up to the top of its tree.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&n| self.parent(n))
    }

    /// True if `node` is `ancestor` or lies inside its subtree.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// True if the node hangs off the document root.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.document, id)
    }

    /// Find the first node matching a predicate below `root`.
    pub fn find<F>(&self, root: NodeId, predicate: F) -> Option<NodeId>
    where
        F: Fn(&ArenaNode) -> bool,
    {
        self.descendants(root)
            .find(|&id| self.get(id).is_some_and(&predicate))
    }

    /// Find the first element with the given tag below `root`.
    pub fn find_by_tag(&self, root: NodeId, tag: &str) -> Option<NodeId> {
        self.find(root, |node| {
            matches!(&node.data, NodeData::Element { name, .. } if name.local.as_ref() == tag)
        })
    }

    /// Find the first element whose `id` attribute equals `id` in the document.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.find(self.document, |node| {
            matches!(&node.data, NodeData::Element { id: Some(found), .. } if found == id)
        })
    }
}

impl Default for NodeArena {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over children of a node.
pub struct ChildrenIter<'a> {
    arena: &'a NodeArena,
    current: NodeId,
}

impl Iterator for ChildrenIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let id = self.current;
        self.current = self.arena.get(id).map(|n| n.next_sibling).unwrap_or(NodeId::NONE);
        Some(id)
    }
}

/// Pre-order walk of a subtree, root excluded.
pub struct Descendants<'a> {
    arena: &'a NodeArena,
    root: NodeId,
    current: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.arena.first_child(id).or_else(|| {
            let mut cursor = id;
            loop {
                if cursor == self.root {
                    return None;
                }
                let node = self.arena.get(cursor)?;
                if node.next_sibling.is_some() {
                    return Some(node.next_sibling);
                }
                cursor = node.parent.option()?;
            }
        });
        Some(id)
    }
}

/// Element accessors.
impl NodeArena {
    pub fn element_name(&self, id: NodeId) -> Option<&LocalName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.local),
            _ => None,
        })
    }

    pub fn element_qual_name(&self, id: NodeId) -> Option<&QualName> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(name),
            _ => None,
        })
    }

    pub fn element_namespace(&self, id: NodeId) -> Option<&Namespace> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { name, .. } => Some(&name.ns),
            _ => None,
        })
    }

    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { attrs, .. } => Some(attrs.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn get_attr(&self, id: NodeId, attr_name: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.name.local.as_ref() == attr_name)
            .map(|a| a.value.as_str())
    }

    /// Set (or add) an attribute. No-op on non-elements.
    pub fn set_attr(&mut self, id: NodeId, attr_name: &str, value: &str) {
        let Some(NodeData::Element {
            attrs, id: cached_id, classes, ..
        }) = self.get_mut(id).map(|n| &mut n.data)
        else {
            return;
        };
        let attr_name = attr_name.to_ascii_lowercase();
        match attrs.iter_mut().find(|a| a.name.local.as_ref() == attr_name) {
            Some(existing) => existing.value = value.to_string(),
            None => attrs.push(Attribute {
                name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                value: value.to_string(),
            }),
        }
        refresh_cached_attrs(attrs, cached_id, classes);
    }

    /// Remove an attribute. Returns true if it was present.
    pub fn remove_attr(&mut self, id: NodeId, attr_name: &str) -> bool {
        let Some(NodeData::Element {
            attrs, id: cached_id, classes, ..
        }) = self.get_mut(id).map(|n| &mut n.data)
        else {
            return false;
        };
        let attr_name = attr_name.to_ascii_lowercase();
        let before = attrs.len();
        attrs.retain(|a| a.name.local.as_ref() != attr_name);
        refresh_cached_attrs(attrs, cached_id, classes);
        attrs.len() != before
    }

    pub fn element_id(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Element { id, .. } => id.as_deref(),
            _ => None,
        })
    }

    pub fn element_classes(&self, id: NodeId) -> &[String] {
        self.get(id)
            .and_then(|n| match &n.data {
                NodeData::Element { classes, .. } => Some(classes.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. }))
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| matches!(n.data, NodeData::Text(_)))
    }

    /// True for nodes that can scope a selector query.
    pub fn is_container(&self, id: NodeId) -> bool {
        self.get(id)
            .is_some_and(|n| matches!(n.data, NodeData::Element { .. } | NodeData::Document))
    }

    /// Text of a text node.
    pub fn text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.data {
            NodeData::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Concatenated text of every text node in the subtree.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(text) = self.text(id) {
            return text.to_string();
        }
        self.descendants(id).filter_map(|d| self.text(d)).collect()
    }
}

/// Listener storage.
impl NodeArena {
    /// Add a listener unless the same handler is already registered for the event.
    pub(crate) fn add_listener(&mut self, id: NodeId, event: &str, handler: &Handler) {
        let Some(node) = self.get_mut(id) else {
            return;
        };
        let duplicate = node
            .listeners
            .iter()
            .any(|l| l.event == event && l.handler == *handler);
        if !duplicate {
            node.listeners.push(Listener {
                event: event.to_string(),
                handler: handler.clone(),
            });
        }
    }

    pub(crate) fn remove_listener(&mut self, id: NodeId, event: &str, handler: &Handler) {
        if let Some(node) = self.get_mut(id) {
            node.listeners
                .retain(|l| !(l.event == event && l.handler == *handler));
        }
    }

    pub(crate) fn has_listener(&self, id: NodeId, event: &str, handler: &Handler) -> bool {
        self.get(id).is_some_and(|n| {
            n.listeners
                .iter()
                .any(|l| l.event == event && l.handler == *handler)
        })
    }

    /// Snapshot of the handlers registered for `event`, in registration order.
    pub(crate) fn listeners_for(&self, id: NodeId, event: &str) -> Vec<Handler> {
        self.get(id)
            .map(|n| {
                n.listeners
                    .iter()
                    .filter(|l| l.event == event)
                    .map(|l| l.handler.clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn refresh_cached_attrs(attrs: &[Attribute], id: &mut Option<String>, classes: &mut Vec<String>) {
    *id = None;
    classes.clear();
    for attr in attrs {
        match attr.name.local.as_ref() {
            "id" => *id = Some(attr.value.clone()),
            "class" => classes.extend(attr.value.split_whitespace().map(str::to_string)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_qname(local: &str) -> QualName {
        QualName::new(None, ns!(html), LocalName::from(local))
    }

    fn attr(name: &str, value: &str) -> Attribute {
        Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_create_elements() {
        let mut arena = NodeArena::new();
        let div = arena.create_element(make_qname("div"), vec![attr("id", "main")]);
        arena.append(arena.document(), div);

        assert_eq!(arena.element_name(div).unwrap().as_ref(), "div");
        assert_eq!(arena.element_id(div), Some("main"));
        assert_eq!(arena.find_by_id("main"), Some(div));
    }

    #[test]
    fn test_append_moves_node() {
        let mut arena = NodeArena::new();
        let a = arena.create_html_element("div");
        let b = arena.create_html_element("div");
        let child = arena.create_html_element("p");

        arena.append(a, child);
        arena.append(b, child);

        assert_eq!(arena.children(a).count(), 0);
        assert_eq!(arena.children(b).collect::<Vec<_>>(), vec![child]);
        assert_eq!(arena.parent(child), Some(b));
    }

    #[test]
    fn test_insert_before() {
        let mut arena = NodeArena::new();
        let parent = arena.create_html_element("ul");
        let one = arena.create_html_element("li");
        let two = arena.create_html_element("li");
        let zero = arena.create_html_element("li");

        arena.append(parent, one);
        arena.append(parent, two);
        arena.insert_before(one, zero);

        assert_eq!(arena.children(parent).collect::<Vec<_>>(), vec![zero, one, two]);
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut arena = NodeArena::new();
        let parent = arena.create_html_element("div");
        let child = arena.create_html_element("span");
        let text = arena.create_text("hi".to_string());
        arena.append(arena.document(), parent);
        arena.append(parent, child);
        arena.append(child, text);

        arena.detach(child);

        assert_eq!(arena.parent(child), None);
        assert_eq!(arena.children(parent).count(), 0);
        assert_eq!(arena.text_content(child), "hi");
        assert!(!arena.is_connected(child));
    }

    #[test]
    fn test_descendants_document_order() {
        let mut arena = NodeArena::new();
        let root = arena.create_html_element("div");
        let a = arena.create_html_element("a");
        let a1 = arena.create_html_element("b");
        let c = arena.create_html_element("c");
        arena.append(root, a);
        arena.append(a, a1);
        arena.append(root, c);

        assert_eq!(arena.descendants(root).collect::<Vec<_>>(), vec![a, a1, c]);
        assert_eq!(arena.descendants(a1).count(), 0);
    }

    #[test]
    fn test_class_cache_follows_attribute() {
        let mut arena = NodeArena::new();
        let div = arena.create_html_element("div");

        arena.set_attr(div, "class", "one  two");
        assert_eq!(arena.element_classes(div), ["one", "two"]);

        arena.remove_attr(div, "class");
        assert!(arena.element_classes(div).is_empty());
    }

    #[test]
    fn test_text_merging() {
        let mut arena = NodeArena::new();
        let p = arena.create_html_element("p");
        arena.append_text(p, "Hello, ");
        arena.append_text(p, "World!");

        let children: Vec<_> = arena.children(p).collect();
        assert_eq!(children.len(), 1);
        assert_eq!(arena.text(children[0]), Some("Hello, World!"));
    }

    #[test]
    fn test_reclaim_frees_unheld_subtree() {
        let mut arena = NodeArena::new();
        let div = arena.create_html_element("div");
        arena.append(arena.document(), div);
        let span = arena.create_html_element("span");
        let text = arena.create_text("x".to_string());
        arena.append(div, span);
        arena.append(span, text);
        let live = arena.len();

        arena.detach(span);
        let freed = arena.reclaim(span, |_| false);

        assert_eq!(freed.len(), 2);
        assert_eq!(arena.len(), live - 2);
        assert!(arena.get(span).is_none());

        // the slot comes back under a new generation
        let reused = arena.create_html_element("p");
        assert_eq!(reused.index(), text.index());
        assert_eq!(reused.generation(), text.generation() + 1);
        assert!(arena.get(text).is_none());
        assert_eq!(arena.slot_count(), live);
    }

    #[test]
    fn test_reclaim_keeps_held_and_attached_nodes() {
        let mut arena = NodeArena::new();
        let div = arena.create_html_element("div");
        arena.append(arena.document(), div);
        let outer = arena.create_html_element("section");
        let inner = arena.create_html_element("p");
        arena.append(outer, inner);

        assert!(arena.reclaim(div, |_| false).is_empty());
        assert!(arena.reclaim(arena.document(), |_| false).is_empty());
        assert!(arena.reclaim(inner, |_| false).is_empty());
        assert!(arena.reclaim(outer, |id| id == inner).is_empty());
        assert!(arena.get(outer).is_some());
        assert!(arena.get(inner).is_some());
    }

    #[test]
    fn test_sweep_collects_detached_roots() {
        let mut arena = NodeArena::new();
        let body = arena.create_html_element("body");
        arena.append(arena.document(), body);
        let kept = arena.create_html_element("i");
        let dropped = arena.create_html_element("b");
        assert_eq!(arena.allocated_since_sweep(), 3);

        let freed = arena.sweep(|id| id == kept);

        assert_eq!(freed.len(), 1);
        assert!(arena.get(dropped).is_none());
        assert!(arena.get(kept).is_some());
        assert!(arena.get(arena.window()).is_some());
        assert_eq!(arena.allocated_since_sweep(), 0);
    }
}
