//! The wire envelope exchanged between contexts.
//!
//! ```json
//! { "correlationId": "5f0c…", "subject": "echo", "content": 42, "reply": true }
//! ```
//!
//! Field names are the contract. A `null` content is left off the wire and
//! decodes back to `null`; a missing `reply` decodes as `false`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Identifier generated by the sender of every envelope.
///
/// The correlation id of a request doubles as the subject of its reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generates a fresh, random correlation id.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for CorrelationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for CorrelationId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A structured message unit exchanged between contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Fresh per envelope.
    pub correlation_id: CorrelationId,
    /// The addressed operation, or the correlation id of the request being answered.
    pub subject: String,
    /// Schema-flexible payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub content: Value,
    /// Whether the sender expects a reply.
    #[serde(default)]
    pub reply: bool,
}

impl Envelope {
    /// Builds a request envelope with a freshly generated correlation id.
    pub fn new(subject: impl Into<String>, content: Value, reply: bool) -> Self {
        Self {
            correlation_id: CorrelationId::generate(),
            subject: subject.into(),
            content,
            reply,
        }
    }

    /// Builds the reply to `request`: its subject is the request's correlation id.
    pub fn reply_to(request: &CorrelationId, content: Value) -> Self {
        Self::new(request.as_str(), content, false)
    }

    /// Decodes an envelope from delivered data.
    pub fn from_value(data: &Value) -> Result<Self, serde_json::Error> {
        Envelope::deserialize(data)
    }

    /// Encodes the envelope for the wire.
    pub fn to_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

/// The content of a reply produced by a failed handler.
///
/// Serializes as `{ "exception": "<message>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exception {
    /// Human-readable failure message.
    pub exception: String,
}

impl Exception {
    /// Creates an exception descriptor.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            exception: message.into(),
        }
    }

    /// Recognizes the exception shape: an object whose only field is a string
    /// `exception`.
    pub fn detect(content: &Value) -> Option<Self> {
        let object = content.as_object()?;
        if object.len() != 1 {
            return None;
        }
        object
            .get("exception")
            .and_then(Value::as_str)
            .map(Exception::new)
    }

    /// Encodes the descriptor as envelope content.
    pub fn into_value(self) -> Value {
        serde_json::json!({ "exception": self.exception })
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.exception)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let envelope = Envelope {
            correlation_id: "c1".into(),
            subject: "echo".into(),
            content: json!(42),
            reply: true,
        };
        assert_eq!(
            envelope.to_value().unwrap(),
            json!({ "correlationId": "c1", "subject": "echo", "content": 42, "reply": true })
        );
    }

    #[test]
    fn test_null_content_is_omitted() {
        let envelope = Envelope::reply_to(&"c1".into(), Value::Null);
        let wire = envelope.to_value().unwrap();
        assert!(wire.get("content").is_none());
        assert_eq!(wire["subject"], "c1");
        assert_eq!(wire["reply"], false);
    }

    #[test]
    fn test_decode_defaults() {
        let envelope =
            Envelope::from_value(&json!({ "correlationId": "c9", "subject": "init" })).unwrap();
        assert_eq!(envelope.content, Value::Null);
        assert!(!envelope.reply);
    }

    #[test]
    fn test_decode_rejects_missing_subject() {
        assert!(Envelope::from_value(&json!({ "correlationId": "c9" })).is_err());
        assert!(Envelope::from_value(&json!("not an envelope")).is_err());
    }

    #[test]
    fn test_generated_ids_differ() {
        let a = CorrelationId::generate();
        let b = CorrelationId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
    }

    #[test]
    fn test_exception_detection() {
        assert_eq!(
            Exception::detect(&json!({ "exception": "boom" })),
            Some(Exception::new("boom"))
        );
        // A regular result object that happens to carry the field is not an exception.
        assert_eq!(
            Exception::detect(&json!({ "returnValue": "", "exception": "x" })),
            None
        );
        assert_eq!(Exception::detect(&json!(42)), None);
        assert_eq!(
            Exception::new("boom").into_value(),
            json!({ "exception": "boom" })
        );
    }
}
