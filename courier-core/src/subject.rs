//! Closed subject enumerations.
//!
//! The router keys handlers by plain strings so it stays reusable. An
//! application that owns a fixed set of operations describes them as an enum
//! implementing [`Subject`] (usually via `#[derive(Subject)]`) and passes the
//! variants wherever the router accepts `impl AsRef<str>`.
//!
//! ```rust,ignore
//! #[derive(Subject, Clone, Copy, Debug, PartialEq)]
//! enum Hosted {
//!     Init,
//!     #[subject(rename = "scrollRelay")]
//!     Scroll,
//! }
//!
//! router.set_listener(Hosted::Init, |_: (), _| Ok(()));
//! ```

/// A closed set of subject names.
pub trait Subject: AsRef<str> + Copy + Sized + 'static {
    /// Every variant, in declaration order.
    const ALL: &'static [Self];

    /// The wire name of this subject.
    fn as_str(&self) -> &'static str;

    /// Looks up the variant with the given wire name.
    fn from_subject(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.as_str() == name)
    }
}
