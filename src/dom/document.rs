//! The document: owner of the node arena, the delegation registry and the
//! readiness state.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use tracing::{debug, trace};

use super::arena::{ArenaNode, NodeArena, NodeId};
use super::markup::{self, Container};
use super::node::Node;
use crate::error::Result;
use crate::event::{DelegationRegistry, Event, EventInit, EventPhase};
use crate::util;

/// Name of the event fired when the document finishes loading.
pub const DOM_CONTENT_LOADED: &str = "DOMContentLoaded";

/// Allocations between automatic sweeps of unreachable detached nodes, at
/// minimum. Larger documents wait for as many allocations as they have
/// live nodes.
const SWEEP_INTERVAL: usize = 256;

/// Parser and lifecycle options for a [`Document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOptions {
    /// Parse `<noscript>` content as raw text, as a scripting browser does.
    pub scripting_enabled: bool,
    /// Leave the doctype out of the tree.
    pub drop_doctype: bool,
    /// Keep the document in [`ReadyState::Loading`] until
    /// [`Document::finish_loading`] is called.
    pub defer_ready: bool,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            drop_doctype: false,
            defer_ready: false,
        }
    }
}

impl DocumentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scripting(mut self, enabled: bool) -> Self {
        self.scripting_enabled = enabled;
        self
    }

    pub fn with_drop_doctype(mut self, drop: bool) -> Self {
        self.drop_doctype = drop;
        self
    }

    pub fn with_defer_ready(mut self, defer: bool) -> Self {
        self.defer_ready = defer;
        self
    }
}

/// `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

pub(crate) struct DocumentInner {
    arena: RefCell<NodeArena>,
    /// Live [`Node`] handles per node.
    handles: RefCell<HashMap<NodeId, usize>>,
    registry: DelegationRegistry,
    ready_state: Cell<ReadyState>,
    ready_queue: RefCell<Vec<Box<dyn FnOnce()>>>,
    options: DocumentOptions,
}

/// A parsed HTML document.
///
/// Cloning is cheap and yields another handle to the same document.
/// Documents are single-threaded (`!Send`).
#[derive(Clone)]
pub struct Document {
    inner: Rc<DocumentInner>,
}

/// Non-owning handle to a [`Document`], held by listeners attached to its
/// own nodes.
#[derive(Clone)]
pub struct WeakDocument(Weak<DocumentInner>);

impl WeakDocument {
    pub fn upgrade(&self) -> Option<Document> {
        self.0.upgrade().map(|inner| Document { inner })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document (`<html><head></head><body></body></html>`).
    pub fn new() -> Self {
        Self::parse("")
    }

    pub fn parse(html: &str) -> Self {
        Self::parse_with(html, DocumentOptions::default())
    }

    pub fn parse_with(html: &str, options: DocumentOptions) -> Self {
        let arena = markup::parse_arena(html, &options);
        debug!(nodes = arena.len(), "parsed document");

        let ready_state = if options.defer_ready {
            ReadyState::Loading
        } else {
            ReadyState::Complete
        };
        Self {
            inner: Rc::new(DocumentInner {
                arena: RefCell::new(arena),
                handles: RefCell::new(HashMap::new()),
                registry: DelegationRegistry::new(),
                ready_state: Cell::new(ready_state),
                ready_queue: RefCell::new(Vec::new()),
                options,
            }),
        }
    }

    /// Parse raw bytes, honoring a `<meta charset>` hint and falling back to
    /// Windows-1252 when the bytes are not UTF-8.
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        Self::parse_bytes_with(bytes, DocumentOptions::default())
    }

    pub fn parse_bytes_with(bytes: &[u8], options: DocumentOptions) -> Self {
        let hint = util::extract_meta_charset(bytes);
        let html = util::decode_text(bytes, hint);
        Self::parse_with(&html, options)
    }

    /// Read and parse an HTML file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "read document");
        Ok(Self::parse_bytes(&bytes))
    }

    pub fn options(&self) -> &DocumentOptions {
        &self.inner.options
    }

    pub fn downgrade(&self) -> WeakDocument {
        WeakDocument(Rc::downgrade(&self.inner))
    }

    /// True if both handles refer to the same document.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn arena(&self) -> Ref<'_, NodeArena> {
        self.inner.arena.borrow()
    }

    /// The arena, unless a mutable borrow is live (used by `Debug`).
    pub(crate) fn try_arena(&self) -> Option<Ref<'_, NodeArena>> {
        self.inner.arena.try_borrow().ok()
    }

    pub(crate) fn arena_mut(&self) -> RefMut<'_, NodeArena> {
        self.inner.arena.borrow_mut()
    }

    pub(crate) fn registry(&self) -> &DelegationRegistry {
        &self.inner.registry
    }

    pub(crate) fn node(&self, id: NodeId) -> Node {
        Node::new(self.clone(), id)
    }

    pub(crate) fn retain_handle(&self, id: NodeId) {
        *self.inner.handles.borrow_mut().entry(id).or_default() += 1;
    }

    pub(crate) fn release_handle(&self, id: NodeId) {
        if let Entry::Occupied(mut count) = self.inner.handles.borrow_mut().entry(id) {
            *count.get_mut() -= 1;
            if *count.get() == 0 {
                count.remove();
            }
        }
    }

    /// Number of live nodes, detached ones included, plus the document and
    /// the window.
    pub fn node_count(&self) -> usize {
        self.arena().len()
    }

    /// Free every detached subtree that no [`Node`] handle refers to, and
    /// return how many nodes went. Listeners on the freed nodes are dropped.
    ///
    /// This also runs on its own as nodes are created.
    pub fn collect_garbage(&self) -> usize {
        let freed = {
            let handles = self.inner.handles.borrow();
            self.arena_mut().sweep(|id| handles.contains_key(&id))
        };
        self.drop_freed(freed)
    }

    /// Free the subtrees under each of `roots` that are detached and
    /// unreferenced.
    pub(crate) fn reclaim(&self, roots: &[NodeId]) -> usize {
        let freed: Vec<ArenaNode> = {
            let handles = self.inner.handles.borrow();
            let mut arena = self.arena_mut();
            roots
                .iter()
                .flat_map(|&root| arena.reclaim(root, |id| handles.contains_key(&id)))
                .collect()
        };
        self.drop_freed(freed)
    }

    fn drop_freed(&self, freed: Vec<ArenaNode>) -> usize {
        let count = freed.len();
        if count > 0 {
            trace!(freed = count, live = self.node_count(), "reclaimed detached nodes");
        }
        // Listener closures may own node handles; they release them here,
        // with no borrow of the arena or the handle table live.
        drop(freed);
        count
    }

    fn sweep_if_due(&self) {
        let due = {
            let arena = self.arena();
            arena.allocated_since_sweep() >= SWEEP_INTERVAL.max(arena.len())
        };
        if due {
            self.collect_garbage();
        }
    }

    /// The document node.
    pub fn root(&self) -> Node {
        let id = self.arena().document();
        self.node(id)
    }

    /// The window, an event target outside the tree.
    pub fn window(&self) -> Node {
        let id = self.arena().window();
        self.node(id)
    }

    /// The `<html>` element.
    pub fn document_element(&self) -> Option<Node> {
        let id = {
            let arena = self.arena();
            arena
                .children(arena.document())
                .find(|&child| arena.is_element(child))
        };
        id.map(|id| self.node(id))
    }

    pub fn head(&self) -> Option<Node> {
        let id = {
            let arena = self.arena();
            arena.find_by_tag(arena.document(), "head")
        };
        id.map(|id| self.node(id))
    }

    pub fn body(&self) -> Option<Node> {
        let id = {
            let arena = self.arena();
            arena.find_by_tag(arena.document(), "body")
        };
        id.map(|id| self.node(id))
    }

    /// A new, parentless HTML element.
    pub fn create_element(&self, tag: &str) -> Node {
        self.sweep_if_due();
        let id = self.arena_mut().create_html_element(tag);
        self.node(id)
    }

    pub fn create_text_node(&self, text: &str) -> Node {
        self.sweep_if_due();
        let id = self.arena_mut().create_text(text.to_string());
        self.node(id)
    }

    pub fn create_comment(&self, text: &str) -> Node {
        self.sweep_if_due();
        let id = self.arena_mut().create_comment(text.to_string());
        self.node(id)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Node> {
        let found = self.arena().find_by_id(id);
        found.map(|found| self.node(found))
    }

    /// `document.querySelectorAll`.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Node>> {
        self.root().query_selector_all(selector)
    }

    /// Serialize the whole document.
    pub fn to_html(&self) -> String {
        let arena = self.arena();
        markup::inner_html(&arena, arena.document())
    }

    /// Parse `markup` in `container` into new parentless nodes.
    pub(crate) fn parse_fragment(&self, markup: &str, container: Container) -> Vec<Node> {
        self.sweep_if_due();
        let ids = markup::parse_fragment(
            &mut self.arena_mut(),
            markup,
            container,
            &self.inner.options,
        );
        ids.into_iter().map(|id| self.node(id)).collect()
    }

    /// Number of live delegated subscriptions.
    pub fn delegation_count(&self) -> usize {
        self.inner.registry.len()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.inner.ready_state.get()
    }

    /// Run `callback` once the document is ready: immediately when it is no
    /// longer loading, otherwise from [`Document::finish_loading`].
    pub fn ready<F>(&self, callback: F)
    where
        F: FnOnce() + 'static,
    {
        if self.ready_state() != ReadyState::Loading {
            callback();
            return;
        }
        self.inner.ready_queue.borrow_mut().push(Box::new(callback));
    }

    /// Finish loading: become interactive, fire `DOMContentLoaded` on the
    /// document (bubbling to the window), flush queued `ready` callbacks and
    /// become complete. Does nothing when the document is already loaded.
    pub fn finish_loading(&self) {
        if self.ready_state() != ReadyState::Loading {
            return;
        }
        self.inner.ready_state.set(ReadyState::Interactive);

        let event = Event::new(DOM_CONTENT_LOADED, EventInit::default().with_bubbles(true));
        let root = self.arena().document();
        self.dispatch(root, &event);

        let queued = std::mem::take(&mut *self.inner.ready_queue.borrow_mut());
        debug!(callbacks = queued.len(), "document ready");
        for callback in queued {
            callback();
        }

        self.inner.ready_state.set(ReadyState::Complete);
    }

    /// Dispatch `event` at `target`: listeners of the target run first, then
    /// those of each ancestor when the event bubbles. Nodes attached to the
    /// document pass the event on to the window last.
    ///
    /// Listener lists are snapshotted per node; a listener removed by an
    /// earlier one in the same round does not run. Returns false if a
    /// listener cancelled the event.
    pub(crate) fn dispatch(&self, target: NodeId, event: &Event) -> bool {
        let path: Vec<NodeId> = {
            let arena = self.arena();
            let mut path = vec![target];
            path.extend(arena.ancestors(target));
            if path.last() == Some(&arena.document()) {
                path.push(arena.window());
            }
            path
        };
        trace!(
            event = event.event_type(),
            target = target.index(),
            path = path.len(),
            "dispatching event"
        );

        event.begin_dispatch(self.node(target));
        for (depth, &current) in path.iter().enumerate() {
            if depth > 0 && !event.bubbles() {
                break;
            }
            let phase = if depth == 0 {
                EventPhase::AtTarget
            } else {
                EventPhase::Bubbling
            };
            event.enter(self.node(current), phase);

            let listeners = self.arena().listeners_for(current, event.event_type());
            for handler in listeners {
                if event.immediate_propagation_stopped() {
                    break;
                }
                let registered = self
                    .arena()
                    .has_listener(current, event.event_type(), &handler);
                if registered {
                    handler.call(event);
                }
            }
            if event.propagation_stopped() {
                break;
            }
        }
        event.finish_dispatch();

        !event.default_prevented()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nodes = self.try_arena().map(|a| a.len());
        f.debug_struct("Document")
            .field("nodes", &nodes)
            .field("ready_state", &self.inner.ready_state.get())
            .field("delegations", &self.inner.registry.len())
            .finish()
    }
}
