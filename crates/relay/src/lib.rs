//! App Store Connect relay orchestration.
//!
//! [`RelayConfig`] reads and validates the environment once. The
//! [`EventProcessor`] then drives each webhook body through the pipeline:
//!
//! 1. parse the [`events::EventEnvelope`] (rejecting malformed bodies);
//! 2. interpret it into a notification document, enriching build events;
//! 3. render the document for every channel;
//! 4. deliver concurrently and fold the outcomes into a [`ProcessingReport`].
//!
//! ## Architectural Layer
//!
//! **Application.** This crate wires the `appstore` and `delivery` adapters
//! into the `events` domain. It performs no I/O of its own.

pub mod config;
pub mod errors;
pub mod processor;

pub use config::{LogFormat, RelayConfig, DEFAULT_HTTP_TIMEOUT_SECS};
pub use errors::{ConfigError, ProcessingError};
pub use processor::{EventProcessor, ProcessingReport};
