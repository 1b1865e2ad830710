//! Newtype domain identifiers.
//!
//! Every identifier that appears in an App Store Connect webhook, in the relay
//! configuration, or in a deep link is a distinct newtype. An [`EventId`] can
//! therefore never be passed where an [`InstanceId`] is expected, even though
//! both are opaque strings on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is blank.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.trim().is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers carried by webhook payloads
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies one webhook event (`data.id`).
    EventId
}

string_id! {
    /// Identifies the resource an event is about (`data.relationships.instance.data.id`).
    ///
    /// Depending on the event type this is an app store version, a build
    /// upload, a feedback submission, or a build beta detail.
    InstanceId
}

// ---------------------------------------------------------------------------
// Identifiers supplied by configuration
// ---------------------------------------------------------------------------

string_id! {
    /// The numeric Apple ID of the app (`APP_ADAM_ID`), used in App Store
    /// Connect and Xcode Organizer links.
    AdamId
}

string_id! {
    /// The app bundle identifier (e.g. `"com.example.app"`).
    BundleId
}

string_id! {
    /// The App Store Connect platform identifier used by Xcode Organizer links.
    PlatformId
}

// ---------------------------------------------------------------------------
// UUID-backed identifiers (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single processing run (one inbound event through the pipeline).
///
/// Generated fresh for every processed event; recorded on the processing span
/// so enrichment and delivery logs for one event can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProcessingRunId(Uuid);

impl ProcessingRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ProcessingRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_identifiers_are_rejected() {
        assert!(EventId::new("").is_none());
        assert!(InstanceId::new("   ").is_none());
    }

    #[test]
    fn identifiers_display_their_value() {
        let id = InstanceId::new("b1f3-42").unwrap();
        assert_eq!(id.as_str(), "b1f3-42");
        assert_eq!(id.to_string(), "b1f3-42");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(ProcessingRunId::new_random(), ProcessingRunId::new_random());
    }
}
