//! Logging Hook - Observability for router traffic.

use courier_core::{Disposition, Hook, Traffic};

/// A Hook that logs traffic through `tracing`.
///
/// Sent and accepted envelopes are logged at `debug`; rejected envelopes and
/// envelopes without a handler at `warn`. Every router installs one; it only
/// runs while debug logging is enabled.
///
/// # Example
///
/// ```rust,ignore
/// let config = RouterConfig::new()
///     .debug_logging(true)
///     .hook(LoggingHook::named("checkout-frame"));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct LoggingHook {
    name: &'static str,
}

impl LoggingHook {
    /// Create a new `LoggingHook` with a default name.
    pub fn new() -> Self {
        Self { name: "router" }
    }

    /// Create a new `LoggingHook` with a custom name.
    ///
    /// The name is used in log messages to identify the router.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The name attached to every log line.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for LoggingHook {
    fn default() -> Self {
        Self::new()
    }
}

impl Hook for LoggingHook {
    fn on_traffic(&self, traffic: &Traffic<'_>) {
        match traffic.disposition {
            Disposition::Rejected => tracing::warn!(
                router = %self.name,
                direction = %traffic.direction,
                subject = %traffic.subject,
                correlation_id = %traffic.correlation_id,
                origin = %traffic.origin,
                disposition = %traffic.disposition,
                "ignored envelope from unknown source"
            ),
            Disposition::NoHandler => tracing::warn!(
                router = %self.name,
                direction = %traffic.direction,
                subject = %traffic.subject,
                correlation_id = %traffic.correlation_id,
                origin = %traffic.origin,
                disposition = %traffic.disposition,
                "no handler for subject"
            ),
            Disposition::Accepted | Disposition::Delivered => tracing::debug!(
                router = %self.name,
                direction = %traffic.direction,
                subject = %traffic.subject,
                correlation_id = %traffic.correlation_id,
                origin = %traffic.origin,
                disposition = %traffic.disposition,
                "envelope {}",
                traffic.direction
            ),
        }
    }
}
