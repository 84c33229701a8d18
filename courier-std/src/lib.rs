//! # courier-std
//!
//! Standard implementations for the Courier cross-context message router.
//!
//! This crate provides:
//! - **Routing**: [`router::Router`], with its registry and one-shot reply
//!   correlation
//! - **Standard validators**: exact origin, origin prefix, base domain,
//!   frame-anchored, source identity
//! - **Standard hooks**: Logging
//! - **In-process transport**: [`memory::MemoryHub`]
//! - **Testing utilities**: fake transport, recording hook

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use courier_core;

// Modules
pub mod hooks;
pub mod memory;
pub mod registry;
pub mod reply;
pub mod router;
pub mod testing;
pub mod validators;

mod sync;
