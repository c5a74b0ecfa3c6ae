//! Delegation bookkeeping.
//!
//! A delegated listener is a generated dispatch closure attached to the bound
//! elements in place of the user's handler. The registry remembers which
//! closure belongs to which `(handler, event, selector)` triple so the
//! matching `off` can find and detach it.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::debug;

use super::{Handler, HandlerId};

/// Logical identity of one delegated subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DelegationKey {
    pub handler: HandlerId,
    pub event: String,
    pub selector: String,
}

impl DelegationKey {
    pub fn new(handler: &Handler, event: &str, selector: &str) -> Self {
        Self {
            handler: handler.id(),
            event: event.to_string(),
            selector: selector.to_string(),
        }
    }
}

/// Map from delegation keys to their dispatch closures.
#[derive(Debug, Default)]
pub struct DelegationRegistry {
    entries: RefCell<HashMap<DelegationKey, Handler>>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the dispatch closure for `key`, returning the one it replaces.
    pub fn insert(&self, key: DelegationKey, dispatch: Handler) -> Option<Handler> {
        debug!(
            handler = %key.handler,
            event = %key.event,
            selector = %key.selector,
            "registering delegated listener"
        );
        self.entries.borrow_mut().insert(key, dispatch)
    }

    /// Remove and return the dispatch closure for `key`.
    pub fn take(&self, key: &DelegationKey) -> Option<Handler> {
        let removed = self.entries.borrow_mut().remove(key);
        if removed.is_some() {
            debug!(
                handler = %key.handler,
                event = %key.event,
                selector = %key.selector,
                "removed delegated listener"
            );
        }
        removed
    }

    pub fn get(&self, key: &DelegationKey) -> Option<Handler> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &DelegationKey) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_take() {
        let registry = DelegationRegistry::new();
        let user = Handler::new(|_| {});
        let dispatch = Handler::new(|_| {});
        let key = DelegationKey::new(&user, "click", "li");

        assert!(registry.insert(key.clone(), dispatch.clone()).is_none());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(&key), Some(dispatch.clone()));

        assert_eq!(registry.take(&key), Some(dispatch));
        assert!(registry.is_empty());
        assert_eq!(registry.take(&key), None);
    }

    #[test]
    fn test_keys_are_distinct_per_triple() {
        let registry = DelegationRegistry::new();
        let user = Handler::new(|_| {});

        registry.insert(DelegationKey::new(&user, "click", "li"), Handler::new(|_| {}));
        registry.insert(DelegationKey::new(&user, "click", "a"), Handler::new(|_| {}));
        registry.insert(DelegationKey::new(&user, "keyup", "li"), Handler::new(|_| {}));

        assert_eq!(registry.len(), 3);
        assert!(!registry.contains(&DelegationKey::new(&Handler::new(|_| {}), "click", "li")));
    }

    #[test]
    fn test_reinsert_replaces() {
        let registry = DelegationRegistry::new();
        let user = Handler::new(|_| {});
        let key = DelegationKey::new(&user, "click", "li");
        let first = Handler::new(|_| {});
        let second = Handler::new(|_| {});

        registry.insert(key.clone(), first.clone());
        assert_eq!(registry.insert(key.clone(), second.clone()), Some(first));
        assert_eq!(registry.get(&key), Some(second));
        assert_eq!(registry.len(), 1);
    }
}
