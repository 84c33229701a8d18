//! Stock validators.
//!
//! - [`ExactOrigin`]: the sender's origin equals a configured origin
//! - [`OriginPrefix`]: the sender's origin starts with a configured prefix
//! - [`SameBaseDomain`]: the sender shares a base domain with a reference URL
//! - [`FrameAnchored`]: an embedded frame (the trust anchor) must be present
//!   and served from the sender's origin, on the expected base domain
//! - [`SourceIs`]: the sender is a specific context
//!
//! Every validator answers `false` when trust cannot be established.

use courier_core::{InboundEvent, Validator};
use regex::Regex;
use std::sync::LazyLock;

static BASE_DOMAIN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(https?://)?([a-z0-9\-]+\.)*([a-z0-9\-]+\.[a-z0-9]+)")
        .expect("base domain pattern is valid")
});

/// Extracts the base domain (last `label.tld` pair) of a URL or origin.
///
/// Returns an empty string when the input has no dotted host, e.g.
/// `base_domain("https://pay.secure.example.com/x") == "example.com"` and
/// `base_domain("http://localhost") == ""`.
pub fn base_domain(url: &str) -> String {
    BASE_DOMAIN
        .captures(url)
        .and_then(|captures| captures.get(3))
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default()
}

/// Accepts events whose origin equals the configured origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactOrigin(String);

impl ExactOrigin {
    /// Create a validator for `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self(origin.into())
    }
}

impl<D> Validator<D> for ExactOrigin {
    fn validate(&self, event: &InboundEvent<D>) -> bool {
        event.origin == self.0
    }
}

/// Accepts events whose origin starts with the configured prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPrefix(String);

impl OriginPrefix {
    /// Create a validator for `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self(prefix.into())
    }
}

impl<D> Validator<D> for OriginPrefix {
    fn validate(&self, event: &InboundEvent<D>) -> bool {
        event.origin.starts_with(&self.0)
    }
}

/// Accepts events whose origin shares a base domain with a reference URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SameBaseDomain {
    base: String,
}

impl SameBaseDomain {
    /// Create a validator matching the base domain of `url`.
    pub fn new(url: &str) -> Self {
        Self {
            base: base_domain(url),
        }
    }

    /// The base domain events must come from.
    pub fn base(&self) -> &str {
        &self.base
    }

    fn matches(&self, origin: &str) -> bool {
        !self.base.is_empty() && base_domain(origin) == self.base
    }
}

impl<D> Validator<D> for SameBaseDomain {
    fn validate(&self, event: &InboundEvent<D>) -> bool {
        self.matches(&event.origin)
    }
}

/// Locates a companion trust anchor in the hosting page.
///
/// Returns the anchor's URL (for an embedded frame, its `src`), or `None`
/// when the anchor is absent.
pub trait TrustAnchor: Send + Sync + 'static {
    /// Find the anchor.
    fn locate(&self) -> Option<String>;
}

impl<F> TrustAnchor for F
where
    F: Fn() -> Option<String> + Send + Sync + 'static,
{
    fn locate(&self) -> Option<String> {
        (self)()
    }
}

/// Accepts events only while a trust anchor is present.
///
/// The event must come from the expected base domain, and the anchor's URL
/// must start with the event origin. An absent anchor rejects.
pub struct FrameAnchored<A> {
    anchor: A,
    domain: SameBaseDomain,
}

impl<A: TrustAnchor> FrameAnchored<A> {
    /// Create a validator requiring `anchor`, on the base domain of `expected_url`.
    pub fn new(anchor: A, expected_url: &str) -> Self {
        Self {
            anchor,
            domain: SameBaseDomain::new(expected_url),
        }
    }
}

impl<A: TrustAnchor, D> Validator<D> for FrameAnchored<A> {
    fn validate(&self, event: &InboundEvent<D>) -> bool {
        let Some(anchor_url) = self.anchor.locate() else {
            return false;
        };
        self.domain.matches(&event.origin) && anchor_url.starts_with(&event.origin)
    }
}

/// Accepts events from one specific context.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceIs<D>(pub D);

impl<D> Validator<D> for SourceIs<D>
where
    D: PartialEq + Send + Sync + 'static,
{
    fn validate(&self, event: &InboundEvent<D>) -> bool {
        event.source == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    };

    fn from(origin: &str) -> InboundEvent<u8> {
        InboundEvent::new(Value::Null, origin, 1)
    }

    #[test]
    fn test_base_domain() {
        assert_eq!(base_domain("https://pay.secure.example.com/hpf/1_1"), "example.com");
        assert_eq!(base_domain("HTTP://Shop.Example.COM"), "example.com");
        assert_eq!(base_domain("example.com:8443/path"), "example.com");
        assert_eq!(base_domain("https://my-shop.co"), "my-shop.co");
        assert_eq!(base_domain("http://localhost:8080"), "");
        assert_eq!(base_domain(""), "");
    }

    #[test]
    fn test_exact_and_prefix() {
        let exact = ExactOrigin::new("https://frame.example.com");
        assert!(exact.validate(&from("https://frame.example.com")));
        assert!(!exact.validate(&from("https://frame.example.com.evil.io")));

        let prefix = OriginPrefix::new("https://frame.");
        assert!(prefix.validate(&from("https://frame.example.com")));
        assert!(!prefix.validate(&from("http://frame.example.com")));
    }

    #[test]
    fn test_same_base_domain() {
        let validator = SameBaseDomain::new("https://cdn.example.com/js/parent.js");
        assert_eq!(validator.base(), "example.com");
        assert!(validator.validate(&from("https://pay.example.com")));
        assert!(!validator.validate(&from("https://example.org")));

        let nothing = SameBaseDomain::new("http://localhost");
        assert!(!nothing.validate(&from("http://localhost")));
    }

    #[test]
    fn test_frame_anchored_requires_anchor() {
        let present = Arc::new(AtomicBool::new(false));
        let flag = present.clone();
        let validator = FrameAnchored::new(
            move || {
                flag.load(Ordering::SeqCst)
                    .then(|| "https://pay.example.com/hpf/1_1?sid=9".to_string())
            },
            "https://cdn.example.com/js/parent.js",
        );

        // Absent anchor rejects rather than failing.
        assert!(!validator.validate(&from("https://pay.example.com")));

        present.store(true, Ordering::SeqCst);
        assert!(validator.validate(&from("https://pay.example.com")));
        // Right domain, but the frame is not served from this origin.
        assert!(!validator.validate(&from("https://other.example.com")));
        // Wrong base domain.
        assert!(!validator.validate(&from("https://pay.example.org")));
    }

    #[test]
    fn test_source_is() {
        let validator = SourceIs(1u8);
        assert!(validator.validate(&from("https://any.example")));
        assert!(!validator.validate(&InboundEvent::new(Value::Null, "", 2u8)));
    }
}
