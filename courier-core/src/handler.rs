//! # Handlers
//!
//! A handler is the body of a named operation. It receives the envelope
//! content, already decoded into its input type, together with the inbound
//! event, and returns an explicit result.
//!
//! # Usage Patterns
//!
//! 1. **Closure**: `router.set_listener("echo", |n: u32, _event| Ok(n))`
//! 2. **Struct implementation**: `impl Handler<Dest> for MyHandler`
//!
//! Both are erased to [`DynHandler`], which works on raw JSON values so the
//! registry can hold handlers of different input and output types.

use crate::{
    error::{HandlerError, HandlerResult},
    event::InboundEvent,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::marker::PhantomData;

/// A typed handler for one subject.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Handler` for events from `{D}`",
    label = "missing `Handler` implementation",
    note = "Handlers must implement `call` for their `Input` type."
)]
pub trait Handler<D>: Send + Sync + 'static {
    /// The decoded envelope content.
    type Input: DeserializeOwned;

    /// The value sent back as reply content, usually a struct or `()`.
    type Output: Serialize;

    /// Runs the operation.
    fn call(&self, input: Self::Input, event: &InboundEvent<D>) -> HandlerResult<Self::Output>;
}

/// Object-safe, type-erased version of [`Handler`].
pub trait DynHandler<D>: Send + Sync + 'static {
    /// Decodes `content`, runs the handler and encodes its output.
    fn handle(&self, content: Value, event: &InboundEvent<D>) -> HandlerResult<Value>;
}

impl<D, H> DynHandler<D> for H
where
    H: Handler<D>,
{
    fn handle(&self, content: Value, event: &InboundEvent<D>) -> HandlerResult<Value> {
        let input = serde_json::from_value(content).map_err(HandlerError::InvalidContent)?;
        let output = self.call(input, event)?;
        serde_json::to_value(output).map_err(HandlerError::InvalidOutput)
    }
}

/// Adapts a closure to [`Handler`], fixing its input and output types.
pub struct FnHandler<F, In, Out> {
    f: F,
    _phantom: PhantomData<fn(In) -> Out>,
}

impl<F, In, Out> FnHandler<F, In, Out> {
    /// Wraps `f`.
    pub fn new<D>(f: F) -> Self
    where
        F: Fn(In, &InboundEvent<D>) -> HandlerResult<Out>,
    {
        Self {
            f,
            _phantom: PhantomData,
        }
    }
}

impl<D, F, In, Out> Handler<D> for FnHandler<F, In, Out>
where
    D: 'static,
    F: Fn(In, &InboundEvent<D>) -> HandlerResult<Out> + Send + Sync + 'static,
    In: DeserializeOwned + 'static,
    Out: Serialize + 'static,
{
    type Input = In;
    type Output = Out;

    fn call(&self, input: In, event: &InboundEvent<D>) -> HandlerResult<Out> {
        (self.f)(input, event)
    }
}
