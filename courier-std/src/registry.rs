//! Handler registry.
//!
//! Two independent maps: subject → route and subject → validator. Each
//! subject has at most one of each; the last registration wins. Removing a
//! route never touches the validator map.

use crate::reply::ReplyListener;
use courier_core::{CorrelationId, DynHandler, Validator};
use std::{collections::HashMap, fmt, sync::Arc};

/// What a subject dispatches to.
pub enum Route<D> {
    /// A long-lived named handler.
    Handler(Arc<dyn DynHandler<D>>),
    /// A one-shot listener waiting for the reply to a sent request.
    Reply(Arc<ReplyListener<D>>),
}

impl<D> Clone for Route<D> {
    fn clone(&self) -> Self {
        match self {
            Route::Handler(handler) => Route::Handler(handler.clone()),
            Route::Reply(listener) => Route::Reply(listener.clone()),
        }
    }
}

impl<D> fmt::Debug for Route<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Handler(_) => f.write_str("Route::Handler"),
            Route::Reply(_) => f.write_str("Route::Reply"),
        }
    }
}

/// Per-router mapping from subjects to routes and validators.
pub struct HandlerRegistry<D> {
    routes: HashMap<String, Route<D>>,
    validators: HashMap<String, Arc<dyn Validator<D>>>,
}

impl<D> Default for HandlerRegistry<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D> HandlerRegistry<D> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            validators: HashMap::new(),
        }
    }

    /// Registers or replaces the handler for `subject`.
    pub fn set_handler(&mut self, subject: impl Into<String>, handler: Arc<dyn DynHandler<D>>) {
        self.routes.insert(subject.into(), Route::Handler(handler));
    }

    /// Registers a one-shot reply listener under `correlation_id`.
    pub fn set_reply_listener(
        &mut self,
        correlation_id: &CorrelationId,
        listener: Arc<ReplyListener<D>>,
    ) {
        self.routes
            .insert(correlation_id.as_str().to_owned(), Route::Reply(listener));
    }

    /// Registers or replaces the validator for `subject`.
    pub fn set_validator(&mut self, subject: impl Into<String>, validator: Arc<dyn Validator<D>>) {
        self.validators.insert(subject.into(), validator);
    }

    /// Removes the route for `subject`, leaving its validator in place.
    pub fn remove(&mut self, subject: &str) -> Option<Route<D>> {
        self.routes.remove(subject)
    }

    /// Removes `listener` if it is still the route for `subject`.
    pub fn remove_reply_listener(&mut self, subject: &str, listener: &Arc<ReplyListener<D>>) -> bool {
        match self.routes.get(subject) {
            Some(Route::Reply(current)) if Arc::ptr_eq(current, listener) => {
                self.routes.remove(subject);
                true
            }
            _ => false,
        }
    }

    /// Returns the route for `subject`.
    pub fn route(&self, subject: &str) -> Option<Route<D>> {
        self.routes.get(subject).cloned()
    }

    /// Returns the validator registered for `subject`.
    pub fn validator(&self, subject: &str) -> Option<Arc<dyn Validator<D>>> {
        self.validators.get(subject).cloned()
    }

    /// Whether `subject` has a route.
    pub fn contains(&self, subject: &str) -> bool {
        self.routes.contains_key(subject)
    }

    /// Whether `subject` has a validator.
    pub fn has_validator(&self, subject: &str) -> bool {
        self.validators.contains_key(subject)
    }

    /// Number of one-shot reply listeners still waiting.
    pub fn pending_replies(&self) -> usize {
        self.routes
            .values()
            .filter(|route| matches!(route, Route::Reply(_)))
            .count()
    }

    /// Get the number of routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Check if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{FnHandler, InboundEvent};
    use serde_json::Value;

    type Registry = HandlerRegistry<u8>;

    fn handler(tag: u32) -> Arc<dyn DynHandler<u8>> {
        Arc::new(FnHandler::new(move |_: Value, _: &InboundEvent<u8>| Ok(tag)))
    }

    fn run(registry: &Registry, subject: &str) -> Value {
        let event = InboundEvent::new(Value::Null, "", 0);
        match registry.route(subject) {
            Some(Route::Handler(h)) => h.handle(Value::Null, &event).unwrap(),
            other => panic!("expected handler, got {:?}", other),
        }
    }

    #[test]
    fn test_last_registration_wins() {
        let mut registry = Registry::new();
        registry.set_handler("init", handler(1));
        registry.set_handler("init", handler(2));

        assert_eq!(registry.len(), 1);
        assert_eq!(run(&registry, "init"), Value::from(2));
    }

    #[test]
    fn test_remove_keeps_validator() {
        let mut registry = Registry::new();
        registry.set_handler("init", handler(1));
        registry.set_validator("init", Arc::new(|_: &InboundEvent<u8>| false));

        assert!(registry.remove("init").is_some());
        assert!(!registry.contains("init"));
        assert!(registry.has_validator("init"));
        assert!(registry.remove("init").is_none());
    }

    #[test]
    fn test_reply_listener_removal_is_identity_checked() {
        let mut registry = Registry::new();
        let id = CorrelationId::from("c1");
        let first = Arc::new(ReplyListener::new(1, Box::new(|_| {})));
        let second = Arc::new(ReplyListener::new(1, Box::new(|_| {})));
        registry.set_reply_listener(&id, first.clone());

        assert_eq!(registry.pending_replies(), 1);
        assert!(!registry.remove_reply_listener("c1", &second));
        assert!(registry.remove_reply_listener("c1", &first));
        assert_eq!(registry.pending_replies(), 0);
    }

    #[test]
    fn test_pending_replies_ignores_handlers() {
        let mut registry = Registry::new();
        registry.set_handler("echo", handler(0));
        registry.set_reply_listener(
            &CorrelationId::generate(),
            Arc::new(ReplyListener::new(1, Box::new(|_| {}))),
        );
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.pending_replies(), 1);
    }
}
