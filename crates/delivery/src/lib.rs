//! Notification delivery for the App Store Connect relay.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** [`WebhookTransport`] is the seam between the
//! dispatcher and the network; [`HttpTransport`] implements it with
//! `reqwest`. [`DeliveryDispatcher`] fans rendered payloads out to the
//! configured [`ChannelEndpoints`] and folds every result into a
//! [`DeliveryReport`].
//!
//! Delivery failures are never errors to the caller. Each one is logged and
//! recorded as [`DeliveryOutcome::Failed`].

pub mod dispatcher;
pub mod errors;
pub mod transport;

pub use dispatcher::{ChannelEndpoints, DeliveryDispatcher, DeliveryOutcome, DeliveryReport};
pub use errors::DeliveryError;
pub use transport::{HttpTransport, WebhookTransport};
