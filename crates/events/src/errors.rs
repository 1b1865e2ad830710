//! Error types for the relay domain.
//!
//! Each stage of event processing has its own error type so callers can tell
//! a rejected envelope from a failed enrichment without inspecting messages:
//!
//! - [`EnvelopeError`]: the inbound payload is structurally invalid. Reported
//!   to the caller before interpretation; never retried.
//! - [`EnrichmentError`]: the App Store Connect lookup failed. Aborts the
//!   current event only.
//! - [`InterpretError`]: a handler could not produce a document.
//! - [`TimestampError`] / [`TimeZoneError`]: time parsing failures.
//!
//! Delivery failures are not errors at this level; they are downgraded to a
//! per-channel outcome by the `delivery` crate.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

/// The inbound payload could not be turned into an [`crate::EventEnvelope`].
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The body is not valid JSON.
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The body has no `data` object.
    #[error("payload has no 'data' object")]
    MissingData,

    /// `data.type` is absent, not a string, or empty.
    #[error("payload has no 'data.type' discriminant")]
    MissingType,
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// An event timestamp could not be parsed as an ISO-8601 instant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid ISO-8601 timestamp '{input}'")]
pub struct TimestampError {
    /// The rejected input.
    pub input: String,
}

/// A configured time zone name is not a known IANA zone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time zone '{name}'")]
pub struct TimeZoneError {
    /// The rejected zone name.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

/// Failure while fetching build metadata from App Store Connect.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// Neither a pre-generated token nor a key id + issuer id is configured.
    #[error(
        "App Store Connect credential configuration incomplete: set a pre-generated token, or both key id and issuer id"
    )]
    IncompleteCredentials,

    /// Key id and issuer id are configured but no private key is.
    #[error("no App Store Connect private key configured")]
    MissingPrivateKey,

    /// The private key is not valid base64 or not a valid EC PEM key.
    #[error("invalid App Store Connect private key: {0}")]
    InvalidKey(String),

    /// Signing the bearer token failed.
    #[error("failed to sign App Store Connect token: {0}")]
    Signing(String),

    /// The request could not be sent or the response could not be read.
    #[error("App Store Connect request failed: {0}")]
    Transport(String),

    /// The request did not complete within the configured timeout.
    #[error("App Store Connect request timed out")]
    Timeout,

    /// The API answered with a non-success status.
    #[error("App Store Connect returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text, for diagnostics.
        body: String,
    },

    /// The response body lacks the expected build attributes.
    #[error("malformed App Store Connect response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// Interpretation
// ---------------------------------------------------------------------------

/// A handler could not turn an envelope into a notification document.
#[derive(Debug, Error)]
pub enum InterpretError {
    /// Build metadata enrichment failed.
    #[error("enrichment failed: {0}")]
    Enrichment(#[from] EnrichmentError),

    /// The event's own timestamp attribute is malformed.
    #[error(transparent)]
    Timestamp(#[from] TimestampError),

    /// The event requires a related instance id but carries none.
    #[error("event '{event_type}' has no related instance id")]
    MissingRelatedInstance {
        /// The `data.type` of the offending event.
        event_type: String,
    },
}
