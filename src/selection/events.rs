//! Direct and delegated listeners, and manual triggering.

use std::collections::HashSet;

use tracing::trace;

use super::Selection;
use crate::dom::{Node, Selectors, WeakNode, parse_selectors};
use crate::error::Result;
use crate::event::{DelegationKey, Event, EventInit, Handler, normalize_event_name};

impl Selection {
    /// Add `handler` as a listener for `event` on every node. A namespace
    /// suffix (`"click.menu"`) is discarded.
    pub fn on(&self, event: &str, handler: &Handler) -> &Self {
        let event = normalize_event_name(event);
        for node in &self.results {
            node.add_event_listener(event, handler);
        }
        self
    }

    /// Alias of [`Selection::on`].
    pub fn bind(&self, event: &str, handler: &Handler) -> &Self {
        self.on(event, handler)
    }

    /// Listen for `event` on every node, but call `handler` only when the
    /// event target is, or sits inside, a descendant matching `selector`.
    ///
    /// Matches are looked up again on every dispatch, so elements added
    /// after binding are covered. `handler` runs at most once per dispatch
    /// on each bound node.
    pub fn on_delegated(&self, event: &str, selector: &str, handler: &Handler) -> Result<&Self> {
        let event = normalize_event_name(event);
        let selectors = parse_selectors(selector)?;

        let dispatch = self.delegated_dispatch(selectors, selector, handler);
        let key = DelegationKey::new(handler, event, selector);
        self.doc.registry().insert(key, dispatch.clone());

        for node in &self.results {
            node.add_event_listener(event, &dispatch);
        }
        Ok(self)
    }

    /// [`Selection::on_delegated`] with jQuery's `delegate` argument order.
    pub fn delegate(&self, selector: &str, event: &str, handler: &Handler) -> Result<&Self> {
        self.on_delegated(event, selector, handler)
    }

    /// Remove a listener added with [`Selection::on`].
    pub fn off(&self, event: &str, handler: &Handler) -> &Self {
        let event = normalize_event_name(event);
        for node in &self.results {
            node.remove_event_listener(event, handler);
        }
        self
    }

    /// Alias of [`Selection::off`].
    pub fn unbind(&self, event: &str, handler: &Handler) -> &Self {
        self.off(event, handler)
    }

    /// Remove a listener added with [`Selection::on_delegated`] for the same
    /// event, selector and handler. Unknown registrations are ignored.
    pub fn off_delegated(&self, event: &str, selector: &str, handler: &Handler) -> &Self {
        let event = normalize_event_name(event);
        let key = DelegationKey::new(handler, event, selector);
        let Some(dispatch) = self.doc.registry().take(&key) else {
            return self;
        };
        for node in &self.results {
            node.remove_event_listener(event, &dispatch);
        }
        self
    }

    /// [`Selection::off_delegated`] with jQuery's `undelegate` argument order.
    pub fn undelegate(&self, selector: &str, event: &str, handler: &Handler) -> &Self {
        self.off_delegated(event, selector, handler)
    }

    /// Fire a bubbling, cancelable `event` on every node in turn.
    pub fn trigger(&self, event: &str) -> &Self {
        self.trigger_with(event, EventInit::bubbling())
    }

    /// Fire `event` on every node in turn, each with a fresh [`Event`]
    /// built from `init`.
    pub fn trigger_with(&self, event: &str, init: EventInit) -> &Self {
        for node in &self.results {
            let event = Event::new(event, init.clone());
            node.dispatch_event(&event);
        }
        self
    }

    /// Build the listener attached in place of `handler` by `on_delegated`.
    ///
    /// It holds the bound nodes weakly: it lives in their own arena.
    fn delegated_dispatch(&self, selectors: Selectors, selector: &str, handler: &Handler) -> Handler {
        let scopes: Vec<WeakNode> = self.results.iter().map(Node::downgrade).collect();
        let selector = selector.to_string();
        let handler = handler.clone();

        Handler::new(move |event| {
            let Some(target) = event.target() else {
                return;
            };
            let candidates: HashSet<Node> = scopes
                .iter()
                .filter_map(WeakNode::upgrade)
                .flat_map(|scope| scope.select_parsed(&selectors))
                .collect();

            let matched = std::iter::successors(Some(target), Node::parent_node)
                .find(|node| candidates.contains(node));
            match matched {
                Some(node) => {
                    trace!(selector = %selector, ?node, candidates = candidates.len(), "delegated match");
                    handler.call(event);
                }
                None => {
                    trace!(selector = %selector, candidates = candidates.len(), "no delegated match");
                }
            }
        })
    }
}
