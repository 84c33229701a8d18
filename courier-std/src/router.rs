//! # Router
//!
//! The message-routing and correlation engine. A router owns a private
//! [`HandlerRegistry`] and a mutable options set, subscribes to its
//! [`Transport`] once at construction, and implements receive, dispatch and
//! send.
//!
//! # Receive
//!
//! 1. Decode the envelope from the delivered data.
//! 2. Resolve the validator: subject-specific, else the router default,
//!    else accept.
//! 3. Drop the event if the validator rejects it, or if nothing is
//!    registered for the subject.
//! 4. Run the route. Handler failures and panics become an
//!    [`Exception`] value.
//! 5. If the sender asked for a reply, send the result back to the event
//!    source, filtered by the event origin.
//!
//! Nothing escapes [`Router::receive`]: it runs inside the transport's
//! delivery callback, where a panic would take down all future deliveries.
//!
//! # Locking
//!
//! Registry and options sit behind mutexes that are never held while user
//! code or the transport runs. Handlers may therefore call back into the
//! router, e.g. to adopt the sender as the default destination.

use crate::{
    hooks::LoggingHook,
    registry::{HandlerRegistry, Route},
    reply::{self, PendingReply, Reply, ReplyCallback, ReplyListener},
    sync::{lock, panic_message},
};
use courier_core::{
    CorrelationId, Direction, DispatchError, Disposition, Envelope, Exception, FnHandler, Handler,
    HandlerError, HandlerResult, Hook, InboundEvent, SendError, Traffic, Transport, Validator,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex},
};

// ============================================================================
// Configuration
// ============================================================================

/// Construction-time configuration for a [`Router`].
///
/// # Example
///
/// ```rust,ignore
/// let router = Router::new(
///     transport,
///     RouterConfig::new()
///         .default_validator(ExactOrigin::new("https://pay.example.com"))
///         .debug_logging(true),
/// );
/// ```
pub struct RouterConfig<D> {
    default_validator: Option<Arc<dyn Validator<D>>>,
    debug_logging: bool,
    hooks: Vec<Arc<dyn Hook>>,
}

impl<D: 'static> RouterConfig<D> {
    /// Create a configuration with no default validator, debug logging off
    /// and the stock [`LoggingHook`] installed.
    pub fn new() -> Self {
        Self {
            default_validator: None,
            debug_logging: false,
            hooks: vec![Arc::new(LoggingHook::new())],
        }
    }

    /// Validator used for subjects without their own.
    pub fn default_validator<V: Validator<D>>(mut self, validator: V) -> Self {
        self.default_validator = Some(Arc::new(validator));
        self
    }

    /// Report traffic to the hooks.
    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = enabled;
        self
    }

    /// Add a traffic hook.
    pub fn hook<H: Hook>(mut self, hook: H) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }
}

impl<D: 'static> Default for RouterConfig<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// A runtime-mutable router option.
pub enum RouterOption<D> {
    /// Default destination for outbound envelopes.
    Destination(Option<D>),
    /// Default origin filter for outbound envelopes.
    DestinationOrigin(Option<String>),
    /// Validator used for subjects without their own.
    DefaultValidator(Option<Arc<dyn Validator<D>>>),
    /// Report traffic to the hooks.
    DebugLogging(bool),
}

struct RouterOptions<D> {
    destination: Option<D>,
    destination_origin: Option<String>,
    default_validator: Option<Arc<dyn Validator<D>>>,
    debug_logging: bool,
}

// ============================================================================
// Outbound
// ============================================================================

/// An envelope about to be sent, with optional overrides.
pub struct Outgoing<D> {
    subject: String,
    content: Value,
    on_reply: Option<ReplyCallback<D>>,
    destination: Option<D>,
    destination_origin: Option<String>,
}

impl<D> Outgoing<D> {
    /// Create an outgoing envelope with raw content.
    pub fn new(subject: impl AsRef<str>, content: Value) -> Self {
        Self {
            subject: subject.as_ref().to_owned(),
            content,
            on_reply: None,
            destination: None,
            destination_origin: None,
        }
    }

    /// Create an outgoing envelope, encoding `content`.
    pub fn encode<C: Serialize + ?Sized>(
        subject: impl AsRef<str>,
        content: &C,
    ) -> Result<Self, SendError> {
        let content = serde_json::to_value(content).map_err(SendError::Encode)?;
        Ok(Self::new(subject, content))
    }

    /// Send to `destination` instead of the router default.
    pub fn to(mut self, destination: D) -> Self {
        self.destination = Some(destination);
        self
    }

    /// Filter by `origin` instead of the router default.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.destination_origin = Some(origin.into());
        self
    }

    /// Ask for a reply, delivered to `callback`.
    pub fn on_reply<F>(mut self, callback: F) -> Self
    where
        F: FnOnce(Reply<D>) + Send + 'static,
    {
        self.on_reply = Some(Box::new(callback));
        self
    }

    /// The addressed subject.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl<D: fmt::Debug> fmt::Debug for Outgoing<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outgoing")
            .field("subject", &self.subject)
            .field("content", &self.content)
            .field("reply", &self.on_reply.is_some())
            .field("destination", &self.destination)
            .field("destination_origin", &self.destination_origin)
            .finish()
    }
}

// ============================================================================
// Inbound outcome
// ============================================================================

/// What [`Router::receive`] did with an event.
#[derive(Debug)]
pub enum Delivery {
    /// The validator rejected the event.
    Rejected,
    /// No handler is registered for the subject.
    NoHandler,
    /// A handler ran.
    Handled {
        /// The handler failed; its exception was the result.
        failed: bool,
        /// A reply was posted.
        replied: bool,
    },
    /// A reply listener exists for the subject, but the event came from a
    /// different source. The listener stays registered.
    ForeignReply,
    /// The event could not be processed at all.
    Dropped(DispatchError),
}

impl Delivery {
    /// Whether a handler or reply listener was invoked.
    pub fn is_handled(&self) -> bool {
        matches!(self, Delivery::Handled { .. })
    }
}

// ============================================================================
// Router
// ============================================================================

/// The cross-context message router.
pub struct Router<T: Transport> {
    transport: T,
    registry: Mutex<HandlerRegistry<T::Destination>>,
    options: Mutex<RouterOptions<T::Destination>>,
    hooks: Vec<Arc<dyn Hook>>,
}

impl<T: Transport> Router<T> {
    /// Creates a router and subscribes it to `transport`.
    ///
    /// The transport holds only a weak reference: deliveries after the last
    /// `Arc<Router>` is dropped are ignored.
    pub fn new(transport: T, config: RouterConfig<T::Destination>) -> Arc<Self> {
        let RouterConfig {
            default_validator,
            debug_logging,
            hooks,
        } = config;

        let router = Arc::new(Self {
            transport,
            registry: Mutex::new(HandlerRegistry::new()),
            options: Mutex::new(RouterOptions {
                destination: None,
                destination_origin: None,
                default_validator,
                debug_logging,
            }),
            hooks,
        });

        let weak = Arc::downgrade(&router);
        router.transport.subscribe(Arc::new(move |event: InboundEvent<T::Destination>| {
            if let Some(router) = weak.upgrade() {
                router.receive(event);
            }
        }));
        router
    }

    /// The transport this router sends through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Registers or replaces the handler for `subject`.
    ///
    /// The envelope content is decoded into `In`; the returned `Out` becomes
    /// the reply content. Any validator already set for `subject` is kept.
    pub fn set_listener<In, Out, F>(&self, subject: impl AsRef<str>, handler: F)
    where
        In: DeserializeOwned + 'static,
        Out: Serialize + 'static,
        F: Fn(In, &InboundEvent<T::Destination>) -> HandlerResult<Out> + Send + Sync + 'static,
    {
        self.set_handler(subject, FnHandler::new::<T::Destination>(handler));
    }

    /// Registers or replaces the handler and the validator for `subject`.
    pub fn set_listener_with_validator<In, Out, F, V>(
        &self,
        subject: impl AsRef<str>,
        handler: F,
        validator: V,
    ) where
        In: DeserializeOwned + 'static,
        Out: Serialize + 'static,
        F: Fn(In, &InboundEvent<T::Destination>) -> HandlerResult<Out> + Send + Sync + 'static,
        V: Validator<T::Destination>,
    {
        let subject = subject.as_ref();
        let mut registry = lock(&self.registry);
        registry.set_handler(subject, Arc::new(FnHandler::new::<T::Destination>(handler)));
        registry.set_validator(subject, Arc::new(validator));
    }

    /// Registers or replaces a struct handler for `subject`.
    pub fn set_handler<H: Handler<T::Destination>>(&self, subject: impl AsRef<str>, handler: H) {
        lock(&self.registry).set_handler(subject.as_ref(), Arc::new(handler));
    }

    /// Registers or replaces the validator for `subject`.
    pub fn set_validator<V: Validator<T::Destination>>(&self, subject: impl AsRef<str>, validator: V) {
        lock(&self.registry).set_validator(subject.as_ref(), Arc::new(validator));
    }

    /// Removes the handler for `subject`. Its validator stays registered and
    /// is still consulted for later events.
    pub fn remove_listener(&self, subject: impl AsRef<str>) -> bool {
        lock(&self.registry).remove(subject.as_ref()).is_some()
    }

    /// Whether something is registered for `subject`.
    pub fn has_listener(&self, subject: impl AsRef<str>) -> bool {
        lock(&self.registry).contains(subject.as_ref())
    }

    /// Whether a validator is registered for `subject`.
    pub fn has_validator(&self, subject: impl AsRef<str>) -> bool {
        lock(&self.registry).has_validator(subject.as_ref())
    }

    /// Number of one-shot reply listeners still waiting for their reply.
    pub fn pending_replies(&self) -> usize {
        lock(&self.registry).pending_replies()
    }

    /// Stops waiting for the reply to `correlation_id`.
    ///
    /// Reply listeners are never expired by the router; this is how a caller
    /// gives up. A [`PendingReply`] for the request resolves to
    /// `ReplyError::Canceled`. Returns `false` if no listener was waiting.
    pub fn forget(&self, correlation_id: &CorrelationId) -> bool {
        let mut registry = lock(&self.registry);
        match registry.route(correlation_id.as_str()) {
            Some(Route::Reply(listener)) => {
                registry.remove_reply_listener(correlation_id.as_str(), &listener)
            }
            _ => false,
        }
    }

    // ------------------------------------------------------------------------
    // Options
    // ------------------------------------------------------------------------

    /// Changes one option.
    pub fn set_option(&self, option: RouterOption<T::Destination>) {
        let mut options = lock(&self.options);
        match option {
            RouterOption::Destination(destination) => options.destination = destination,
            RouterOption::DestinationOrigin(origin) => options.destination_origin = origin,
            RouterOption::DefaultValidator(validator) => options.default_validator = validator,
            RouterOption::DebugLogging(enabled) => options.debug_logging = enabled,
        }
    }

    /// Sets the default destination and its origin filter.
    pub fn set_destination(&self, destination: T::Destination, origin: impl Into<String>) {
        let mut options = lock(&self.options);
        options.destination = Some(destination);
        options.destination_origin = Some(origin.into());
    }

    /// The default destination.
    pub fn destination(&self) -> Option<T::Destination> {
        lock(&self.options).destination.clone()
    }

    /// The default destination origin.
    pub fn destination_origin(&self) -> Option<String> {
        lock(&self.options).destination_origin.clone()
    }

    /// Whether traffic is reported to the hooks.
    pub fn debug_logging(&self) -> bool {
        lock(&self.options).debug_logging
    }

    // ------------------------------------------------------------------------
    // Send
    // ------------------------------------------------------------------------

    /// Sends `content` to the default destination without asking for a reply.
    pub fn send<C: Serialize + ?Sized>(
        &self,
        subject: impl AsRef<str>,
        content: &C,
    ) -> Result<CorrelationId, SendError> {
        self.dispatch(Outgoing::encode(subject, content)?)
    }

    /// Sends `content` to the default destination; `on_reply` runs once when
    /// the correlated reply arrives from that destination.
    pub fn send_with_reply<C, F>(
        &self,
        subject: impl AsRef<str>,
        content: &C,
        on_reply: F,
    ) -> Result<CorrelationId, SendError>
    where
        C: Serialize + ?Sized,
        F: FnOnce(Reply<T::Destination>) + Send + 'static,
    {
        self.dispatch(Outgoing::encode(subject, content)?.on_reply(on_reply))
    }

    /// Sends `content` to the default destination and returns a future for
    /// the reply.
    pub fn request<C: Serialize + ?Sized>(
        &self,
        subject: impl AsRef<str>,
        content: &C,
    ) -> Result<PendingReply<T::Destination>, SendError> {
        let (callback, receiver) = reply::pending();
        let mut outgoing = Outgoing::encode(subject, content)?;
        outgoing.on_reply = Some(callback);
        let correlation_id = self.dispatch(outgoing)?;
        Ok(PendingReply::new(correlation_id, receiver))
    }

    /// Sends an envelope.
    ///
    /// Explicit destination and origin override the defaults. Nothing is sent
    /// when no destination able to receive envelopes resolves. With a reply
    /// callback, a one-shot listener is registered under the new correlation
    /// id before the envelope is posted.
    pub fn dispatch(
        &self,
        outgoing: Outgoing<T::Destination>,
    ) -> Result<CorrelationId, SendError> {
        let Outgoing {
            subject,
            content,
            on_reply,
            destination,
            destination_origin,
        } = outgoing;

        let (destination, origin) = {
            let options = lock(&self.options);
            (
                destination.or_else(|| options.destination.clone()),
                destination_origin.or_else(|| options.destination_origin.clone()),
            )
        };
        let destination = destination
            .filter(|destination| self.transport.can_receive(destination))
            .ok_or(SendError::NoDestination)?;
        let origin = origin.ok_or(SendError::NoDestinationOrigin)?;

        let envelope = Envelope::new(subject, content, on_reply.is_some());
        let listener = on_reply.map(|callback| {
            let listener = Arc::new(ReplyListener::new(destination.clone(), callback));
            lock(&self.registry).set_reply_listener(&envelope.correlation_id, listener.clone());
            listener
        });

        if let Err(err) = self.transport.post(&destination, &envelope, &origin) {
            if let Some(listener) = &listener {
                lock(&self.registry)
                    .remove_reply_listener(envelope.correlation_id.as_str(), listener);
            }
            tracing::warn!(
                subject = %envelope.subject,
                correlation_id = %envelope.correlation_id,
                error = %err,
                "transport refused envelope"
            );
            return Err(err.into());
        }

        self.observe(Direction::Sent, &envelope, &origin, Disposition::Delivered);
        Ok(envelope.correlation_id)
    }

    // ------------------------------------------------------------------------
    // Receive
    // ------------------------------------------------------------------------

    /// Processes one inbound event. Never panics.
    pub fn receive(&self, event: InboundEvent<T::Destination>) -> Delivery {
        match panic::catch_unwind(AssertUnwindSafe(|| self.route(event))) {
            Ok(delivery) => delivery,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(error = %message, "dispatch panicked; event dropped");
                Delivery::Dropped(DispatchError::Panicked(message))
            }
        }
    }

    fn route(&self, event: InboundEvent<T::Destination>) -> Delivery {
        let envelope = match event.envelope() {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(origin = %event.origin, error = %err, "dropping malformed envelope");
                return Delivery::Dropped(DispatchError::Malformed(err));
            }
        };
        let subject = envelope.subject.as_str();

        let (validator, route) = {
            let registry = lock(&self.registry);
            (registry.validator(subject), registry.route(subject))
        };
        let validator = validator.or_else(|| lock(&self.options).default_validator.clone());

        let is_valid_source = validator.is_none_or(|validator| validator.validate(&event));
        if !is_valid_source {
            self.observe(Direction::Received, &envelope, &event.origin, Disposition::Rejected);
            return Delivery::Rejected;
        }
        let Some(route) = route else {
            self.observe(Direction::Received, &envelope, &event.origin, Disposition::NoHandler);
            return Delivery::NoHandler;
        };
        self.observe(Direction::Received, &envelope, &event.origin, Disposition::Accepted);

        let mut foreign = false;
        let result = match route {
            Route::Handler(handler) => {
                let content = envelope.content.clone();
                guarded(|| handler.handle(content, &event))
            }
            Route::Reply(listener) if listener.matches(&event) => {
                let content = envelope.content.clone();
                let result = guarded(|| {
                    listener.fire(content, &event);
                    Ok(Value::Null)
                });
                lock(&self.registry).remove_reply_listener(subject, &listener);
                result
            }
            Route::Reply(_) => {
                foreign = true;
                Ok(Value::Null)
            }
        };

        let (content, failed) = match result {
            Ok(content) => (content, false),
            Err(err) => {
                tracing::debug!(subject = %subject, error = %err, "handler failed");
                (Exception::new(err.to_string()).into_value(), true)
            }
        };

        let replied = envelope.reply && self.reply(&envelope.correlation_id, content, &event);

        if foreign {
            Delivery::ForeignReply
        } else {
            Delivery::Handled { failed, replied }
        }
    }

    fn reply(
        &self,
        correlation_id: &CorrelationId,
        content: Value,
        event: &InboundEvent<T::Destination>,
    ) -> bool {
        let outgoing = Outgoing::new(correlation_id, content)
            .to(event.source.clone())
            .origin(event.origin.clone());
        match self.dispatch(outgoing) {
            Ok(_) => true,
            Err(err) => {
                tracing::debug!(correlation_id = %correlation_id, error = %err, "reply not sent");
                false
            }
        }
    }

    fn observe(
        &self,
        direction: Direction,
        envelope: &Envelope,
        origin: &str,
        disposition: Disposition,
    ) {
        if !self.debug_logging() {
            return;
        }
        let traffic = Traffic {
            direction,
            subject: &envelope.subject,
            correlation_id: envelope.correlation_id.as_str(),
            origin,
            disposition,
        };
        for hook in &self.hooks {
            hook.on_traffic(&traffic);
        }
    }
}

impl<T: Transport> fmt::Debug for Router<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        f.debug_struct("Router")
            .field("routes", &registry.len())
            .field("pending_replies", &registry.pending_replies())
            .field("destination", &self.destination())
            .field("debug_logging", &self.debug_logging())
            .finish()
    }
}

/// Runs `f`, converting a panic into a handler error.
fn guarded(f: impl FnOnce() -> HandlerResult<Value>) -> HandlerResult<Value> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|payload| Err(HandlerError::Panicked(panic_message(payload.as_ref()))))
}
