//! Events, listener callbacks and the delegation registry.

mod registry;

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub use registry::{DelegationKey, DelegationRegistry};

use crate::dom::Node;

/// Process-unique identity of a [`Handler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        HandlerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "handler#{}", self.0)
    }
}

/// An event listener callback.
///
/// Clones share identity, so a clone passed to `off` removes the listener
/// registered with the original. Two handlers wrapping the same closure code
/// but created separately are distinct.
///
/// A listener lives in its node's document. A callback that captures a
/// [`Node`], a [`Selection`] or a [`Document`] of that same document owns
/// it strongly, and the document then outlives every outside handle.
/// Capture a [`WeakNode`] (from [`Node::downgrade`]) instead when the
/// document should be freed once the caller lets go of it.
///
/// [`Selection`]: crate::Selection
/// [`Document`]: crate::Document
/// [`WeakNode`]: crate::WeakNode
#[derive(Clone)]
pub struct Handler {
    id: HandlerId,
    callback: Rc<dyn Fn(&Event)>,
}

impl Handler {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&Event) + 'static,
    {
        Self {
            id: HandlerId::next(),
            callback: Rc::new(callback),
        }
    }

    /// Wrap a callback that runs at most once, however often it is invoked.
    pub fn once<F>(callback: F) -> Self
    where
        F: FnOnce(&Event) + 'static,
    {
        let slot = RefCell::new(Some(callback));
        Self::new(move |event| {
            let callback = slot.borrow_mut().take();
            if let Some(callback) = callback {
                callback(event);
            }
        })
    }

    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn call(&self, event: &Event) {
        (self.callback)(event)
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Handler {}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.id).finish()
    }
}

/// Options for a synthesized event.
#[derive(Clone, Default)]
pub struct EventInit {
    pub bubbles: bool,
    pub cancelable: bool,
    pub detail: Option<Rc<dyn Any>>,
}

impl EventInit {
    /// A bubbling, cancelable event without detail, as `trigger` fires.
    pub fn bubbling() -> Self {
        Self {
            bubbles: true,
            cancelable: true,
            detail: None,
        }
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn with_detail<T: Any>(mut self, detail: T) -> Self {
        self.detail = Some(Rc::new(detail));
        self
    }
}

impl fmt::Debug for EventInit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventInit")
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("detail", &self.detail.is_some())
            .finish()
    }
}

/// Dispatch phase an event is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventPhase {
    #[default]
    None,
    AtTarget,
    Bubbling,
}

/// An event being dispatched. Handlers receive it by shared reference; the
/// propagation flags use interior mutability.
pub struct Event {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    detail: Option<Rc<dyn Any>>,
    target: RefCell<Option<Node>>,
    current_target: RefCell<Option<Node>>,
    phase: Cell<EventPhase>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
    immediate_propagation_stopped: Cell<bool>,
}

impl Event {
    pub fn new(event_type: &str, init: EventInit) -> Self {
        Self {
            event_type: event_type.to_string(),
            bubbles: init.bubbles,
            cancelable: init.cancelable,
            detail: init.detail,
            target: RefCell::new(None),
            current_target: RefCell::new(None),
            phase: Cell::new(EventPhase::None),
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
            immediate_propagation_stopped: Cell::new(false),
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    /// The node the event was dispatched on.
    pub fn target(&self) -> Option<Node> {
        self.target.borrow().clone()
    }

    /// The node whose listener is currently running.
    pub fn current_target(&self) -> Option<Node> {
        self.current_target.borrow().clone()
    }

    pub fn event_phase(&self) -> EventPhase {
        self.phase.get()
    }

    /// The detail payload, if it has type `T`.
    pub fn detail<T: Any>(&self) -> Option<&T> {
        self.detail.as_deref().and_then(|d| d.downcast_ref::<T>())
    }

    pub fn prevent_default(&self) {
        if self.cancelable {
            self.default_prevented.set(true);
        }
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    /// Stop after the listeners of the current node have run.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    /// Stop before the next listener, even on the current node.
    pub fn stop_immediate_propagation(&self) {
        self.propagation_stopped.set(true);
        self.immediate_propagation_stopped.set(true);
    }

    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }

    pub(crate) fn immediate_propagation_stopped(&self) -> bool {
        self.immediate_propagation_stopped.get()
    }

    pub(crate) fn begin_dispatch(&self, target: Node) {
        *self.target.borrow_mut() = Some(target);
    }

    pub(crate) fn enter(&self, current: Node, phase: EventPhase) {
        *self.current_target.borrow_mut() = Some(current);
        self.phase.set(phase);
    }

    pub(crate) fn finish_dispatch(&self) {
        *self.current_target.borrow_mut() = None;
        self.phase.set(EventPhase::None);
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("type", &self.event_type)
            .field("bubbles", &self.bubbles)
            .field("cancelable", &self.cancelable)
            .field("phase", &self.phase.get())
            .field("default_prevented", &self.default_prevented.get())
            .finish()
    }
}

/// Strip a jQuery-style namespace: `"click.menu"` and `"click menu"` both
/// bind `"click"`.
pub fn normalize_event_name(name: &str) -> &str {
    name.split(['.', ' ']).next().unwrap_or(name)
}
