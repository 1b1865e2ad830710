//! Inbound event envelope.
//!
//! App Store Connect webhooks carry a JSON:API style document:
//!
//! ```json
//! {
//!   "data": {
//!     "id": "…",
//!     "type": "buildUploadStateUpdated",
//!     "attributes": { "newState": "COMPLETE", "timestamp": "…" },
//!     "relationships": { "instance": { "data": { "id": "…" } } }
//!   }
//! }
//! ```
//!
//! Parsing happens once, up front. Only `data.type` is required; every other
//! field is optional and handlers decide what to do when it is absent.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{EnvelopeError, EventId, InstanceId};

/// The normalized representation of one inbound webhook event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    event_type: String,
    id: Option<EventId>,
    attributes: Map<String, Value>,
    related_instance: Option<InstanceId>,
    raw: Value,
    received_at: DateTime<Utc>,
}

impl EventEnvelope {
    /// Parses raw webhook bytes, stamping the envelope with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError`] when the body is not JSON or has no
    /// `data.type`.
    pub fn parse(body: &[u8]) -> Result<Self, EnvelopeError> {
        let raw: Value = serde_json::from_slice(body)?;
        Self::from_value(raw, Utc::now())
    }

    /// Builds an envelope from an already-decoded JSON value.
    ///
    /// `received_at` is the capture time used when the event carries no
    /// `timestamp` attribute of its own.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MissingData`] or [`EnvelopeError::MissingType`]
    /// when the discriminant cannot be found.
    pub fn from_value(raw: Value, received_at: DateTime<Utc>) -> Result<Self, EnvelopeError> {
        let data = raw
            .get("data")
            .and_then(Value::as_object)
            .ok_or(EnvelopeError::MissingData)?;

        let event_type = match data.get("type") {
            Some(Value::String(t)) if !t.trim().is_empty() => t.clone(),
            _ => return Err(EnvelopeError::MissingType),
        };

        // Optional sections with an unexpected shape count as absent.
        let id = data
            .get("id")
            .cloned()
            .and_then(value_as_id)
            .and_then(EventId::new);
        let attributes = data
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let related_instance = data
            .get("relationships")
            .and_then(|r| r.pointer("/instance/data/id"))
            .cloned()
            .and_then(value_as_id)
            .and_then(InstanceId::new);

        Ok(Self {
            event_type,
            id,
            attributes,
            related_instance,
            raw,
            received_at,
        })
    }

    /// The `data.type` discriminant.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The event's own identifier, if present.
    pub fn id(&self) -> Option<&EventId> {
        self.id.as_ref()
    }

    /// The related instance identifier, if present.
    pub fn related_instance(&self) -> Option<&InstanceId> {
        self.related_instance.as_ref()
    }

    /// Returns a string attribute, treating non-strings and blanks as absent.
    pub fn attribute_str(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    /// The event's `timestamp` attribute, if present.
    pub fn timestamp(&self) -> Option<&str> {
        self.attribute_str("timestamp")
    }

    /// When the relay captured the event.
    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// The payload exactly as received.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

// Ids are strings in practice, but tolerate numbers.
fn value_as_id(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
