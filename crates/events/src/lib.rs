//! App Store Connect relay domain.
//!
//! This crate turns an inbound App Store Connect webhook into a
//! channel-agnostic [`NotificationDocument`]. It owns every domain concept:
//! identifiers, the parsed [`EventEnvelope`], state labels, timestamp
//! formatting, the [`EventInterpreter`] dispatch, and the error taxonomy.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! Build metadata enrichment is reached through the [`BuildInfoSource`] port;
//! the `appstore` crate supplies the HTTP implementation.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`EventId`, `InstanceId`, `AdamId`, etc.) |
//! | [`envelope`] | Validated inbound event envelope |
//! | [`document`] | `NotificationDocument`, `Fact`, `BuildUploadInfo` |
//! | [`labels`] | State code labels and glyphs |
//! | [`timestamp`] | ISO-8601 parsing and zone-aware display |
//! | [`interpreter`] | Event-type dispatch and handlers |
//! | [`ports`] | Traits implemented by infrastructure crates |
//! | [`errors`] | Error types |

pub mod document;
pub mod envelope;
pub mod errors;
pub mod identifiers;
pub mod interpreter;
pub mod labels;
pub mod ports;
pub mod timestamp;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use document::{BuildUploadInfo, Fact, NotificationDocument};
pub use envelope::EventEnvelope;
pub use errors::{EnrichmentError, EnvelopeError, InterpretError, TimeZoneError, TimestampError};
pub use identifiers::{AdamId, BundleId, EventId, InstanceId, PlatformId, ProcessingRunId};
pub use interpreter::{AppLinks, EventInterpreter, EventKind, Interpretation, InterpreterSettings};
pub use labels::{
    resolve, AppVersionState, BuildUploadState, ExternalBuildState, StateCode, StatusDisplay,
};
pub use ports::BuildInfoSource;
pub use timestamp::{format_timestamp, parse_instant, DisplayZone};
