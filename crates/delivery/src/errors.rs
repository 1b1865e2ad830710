//! Delivery error types.

use thiserror::Error;

/// A single webhook POST did not succeed.
///
/// The dispatcher never propagates this; it is logged and recorded as a
/// `failed` outcome for the channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The request did not complete within the configured timeout.
    #[error("webhook request timed out")]
    Timeout,

    /// The request could not be sent.
    #[error("webhook request failed: {0}")]
    Network(String),

    /// The endpoint answered with a non-success status.
    #[error("webhook returned HTTP {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },
}
