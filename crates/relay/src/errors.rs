//! Configuration and processing errors.

use events::{EnvelopeError, InterpretError, TimeZoneError};
use serde_json::{json, Value};
use thiserror::Error;

/// The relay configuration is invalid. The process must not start.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// `TIMEZONE` is not a known IANA zone.
    #[error(transparent)]
    InvalidTimeZone(#[from] TimeZoneError),

    /// `HTTP_TIMEOUT_SECS` is not a positive integer.
    #[error("HTTP_TIMEOUT_SECS must be a positive integer, got '{value}'")]
    InvalidTimeout {
        /// The rejected value.
        value: String,
    },

    /// `LOG_FORMAT` is neither `json` nor `pretty`.
    #[error("LOG_FORMAT must be 'json' or 'pretty', got '{value}'")]
    InvalidLogFormat {
        /// The rejected value.
        value: String,
    },
}

/// Processing one event failed before delivery.
///
/// Delivery failures are not represented here; they appear as `failed`
/// outcomes in the report.
#[derive(Debug, Error)]
pub enum ProcessingError {
    /// The inbound payload is not a usable envelope.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(#[from] EnvelopeError),

    /// The event could not be interpreted.
    #[error(transparent)]
    Interpret(#[from] InterpretError),
}

impl ProcessingError {
    /// Stable machine-readable error category.
    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingError::MalformedEnvelope(_) => "malformed_envelope",
            ProcessingError::Interpret(InterpretError::Enrichment(_)) => "enrichment",
            ProcessingError::Interpret(InterpretError::Timestamp(_)) => "invalid_timestamp",
            ProcessingError::Interpret(InterpretError::MissingRelatedInstance { .. }) => {
                "missing_related_instance"
            }
        }
    }

    /// The error as a response body: `{"ok": false, "error": ..., "kind": ...}`.
    pub fn to_response(&self) -> Value {
        json!({
            "ok": false,
            "error": self.to_string(),
            "kind": self.kind(),
        })
    }
}
