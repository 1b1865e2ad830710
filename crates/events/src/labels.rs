//! Human-readable labels and glyphs for App Store Connect state codes.
//!
//! Three state domains appear in webhook attributes:
//!
//! | Domain | Enum | Attribute |
//! |--------|------|-----------|
//! | App version review status | [`AppVersionState`] | `newValue` / `oldValue` |
//! | Build upload processing | [`BuildUploadState`] | `newState` / `oldState` |
//! | External (TestFlight) availability | [`ExternalBuildState`] | `newExternalBuildState` |
//!
//! [`resolve`] is total: codes outside the enumeration resolve to
//! `"Unknown (<code>)"` and a neutral glyph.

use serde::Serialize;

/// Glyph used for unknown or absent codes.
pub const UNKNOWN_GLYPH: &str = "❔";

/// Label and glyph for one state code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusDisplay {
    /// Human-readable label; never empty.
    pub label: String,
    /// Decorative glyph.
    pub glyph: &'static str,
}

/// A closed enumeration of state codes with display metadata.
pub trait StateCode: Sized + Copy {
    /// Looks up a wire code (e.g. `"READY_FOR_SALE"`).
    fn from_code(code: &str) -> Option<Self>;
    /// The wire code.
    fn code(self) -> &'static str;
    /// Human-readable label.
    fn label(self) -> &'static str;
    /// Decorative glyph.
    fn glyph(self) -> &'static str;
}

/// Resolves an optional wire code in domain `S` to its display.
pub fn resolve<S: StateCode>(code: Option<&str>) -> StatusDisplay {
    match code {
        Some(c) => match S::from_code(c) {
            Some(state) => StatusDisplay {
                label: state.label().to_string(),
                glyph: state.glyph(),
            },
            None => StatusDisplay {
                label: format!("Unknown ({c})"),
                glyph: UNKNOWN_GLYPH,
            },
        },
        None => StatusDisplay {
            label: "Unknown".to_string(),
            glyph: UNKNOWN_GLYPH,
        },
    }
}

// ---------------------------------------------------------------------------
// Macro for state enums.
// Generates: enum, StateCode impl with code/label/glyph tables.
// ---------------------------------------------------------------------------
macro_rules! state_codes {
    (
        $(#[$attr:meta])*
        $name:ident {
            $( $variant:ident => ($code:literal, $label:literal, $glyph:literal), )+
        }
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( #[doc = $label] $variant, )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$( $name::$variant, )+];
        }

        impl StateCode for $name {
            fn from_code(code: &str) -> Option<Self> {
                match code {
                    $( $code => Some(Self::$variant), )+
                    _ => None,
                }
            }

            fn code(self) -> &'static str {
                match self {
                    $( Self::$variant => $code, )+
                }
            }

            fn label(self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }

            fn glyph(self) -> &'static str {
                match self {
                    $( Self::$variant => $glyph, )+
                }
            }
        }
    };
}

state_codes! {
    /// App Store version review status.
    AppVersionState {
        Accepted => ("ACCEPTED", "Accepted", "👍"),
        DeveloperRejected => ("DEVELOPER_REJECTED", "Developer Rejected", "↩️"),
        DeveloperRemovedFromSale => ("DEVELOPER_REMOVED_FROM_SALE", "Developer Removed from Sale", "🚫"),
        InReview => ("IN_REVIEW", "In Review", "🔍"),
        InvalidBinary => ("INVALID_BINARY", "Invalid Binary", "⚠️"),
        MetadataRejected => ("METADATA_REJECTED", "Metadata Rejected", "📝"),
        NotApplicable => ("NOT_APPLICABLE", "Not Applicable", "➖"),
        PendingAppleRelease => ("PENDING_APPLE_RELEASE", "Pending Apple Release", "⏳"),
        PendingContract => ("PENDING_CONTRACT", "Pending Contract", "📄"),
        PendingDeveloperRelease => ("PENDING_DEVELOPER_RELEASE", "Pending Developer Release", "🟡"),
        PrepareForSubmission => ("PREPARE_FOR_SUBMISSION", "Prepare for Submission", "🛠️"),
        PreorderReadyForSale => ("PREORDER_READY_FOR_SALE", "Pre-Order Ready for Sale", "🛒"),
        ProcessingForAppStore => ("PROCESSING_FOR_APP_STORE", "Processing for App Store", "⚙️"),
        ProcessingForDistribution => ("PROCESSING_FOR_DISTRIBUTION", "Processing for Distribution", "⚙️"),
        ReadyForDistribution => ("READY_FOR_DISTRIBUTION", "Ready for Distribution", "✅"),
        ReadyForReview => ("READY_FOR_REVIEW", "Ready for Review", "📬"),
        ReadyForSale => ("READY_FOR_SALE", "Ready for Sale", "✅"),
        Rejected => ("REJECTED", "Rejected", "❌"),
        RemovedFromSale => ("REMOVED_FROM_SALE", "Removed from Sale", "🚫"),
        ReplacedWithNewVersion => ("REPLACED_WITH_NEW_VERSION", "Replaced with New Version", "🔁"),
        WaitingForExportCompliance => ("WAITING_FOR_EXPORT_COMPLIANCE", "Waiting for Export Compliance", "📋"),
        WaitingForReview => ("WAITING_FOR_REVIEW", "Waiting for Review", "⏳"),
    }
}

state_codes! {
    /// Processing state of an uploaded build.
    BuildUploadState {
        AwaitingUpload => ("AWAITING_UPLOAD", "Awaiting Upload", "⏳"),
        Processing => ("PROCESSING", "Processing", "⚙️"),
        Failed => ("FAILED", "Failed", "❌"),
        Complete => ("COMPLETE", "Complete", "✅"),
    }
}

state_codes! {
    /// External TestFlight availability of a build.
    ExternalBuildState {
        Processing => ("PROCESSING", "Processing", "⚙️"),
        ProcessingException => ("PROCESSING_EXCEPTION", "Processing Exception", "⚠️"),
        MissingExportCompliance => ("MISSING_EXPORT_COMPLIANCE", "Missing Export Compliance", "📋"),
        ReadyForBetaTesting => ("READY_FOR_BETA_TESTING", "Ready for Beta Testing", "✅"),
        InBetaTesting => ("IN_BETA_TESTING", "In Beta Testing", "🧪"),
        Expired => ("EXPIRED", "Expired", "⌛"),
        ReadyForBetaSubmission => ("READY_FOR_BETA_SUBMISSION", "Ready for Beta Submission", "📤"),
        InExportComplianceReview => ("IN_EXPORT_COMPLIANCE_REVIEW", "In Export Compliance Review", "🔍"),
        WaitingForBetaReview => ("WAITING_FOR_BETA_REVIEW", "Waiting for Beta Review", "⏳"),
        InBetaReview => ("IN_BETA_REVIEW", "In Beta Review", "🔍"),
        BetaRejected => ("BETA_REJECTED", "Beta Rejected", "❌"),
        BetaApproved => ("BETA_APPROVED", "Beta Approved", "👍"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn known_codes_resolve_to_their_labels() {
        let d = resolve::<AppVersionState>(Some("READY_FOR_SALE"));
        assert_eq!(d.label, "Ready for Sale");
        assert_eq!(d.glyph, "✅");

        assert_eq!(resolve::<BuildUploadState>(Some("FAILED")).label, "Failed");
        assert_eq!(
            resolve::<ExternalBuildState>(Some("IN_BETA_TESTING")).label,
            "In Beta Testing"
        );
    }

    #[test]
    fn unknown_code_resolves_to_fallback() {
        let d = resolve::<BuildUploadState>(Some("EXPLODED"));
        assert_eq!(d.label, "Unknown (EXPLODED)");
        assert_eq!(d.glyph, UNKNOWN_GLYPH);
    }

    #[test]
    fn absent_code_resolves_to_fallback() {
        let d = resolve::<ExternalBuildState>(None);
        assert_eq!(d.label, "Unknown");
        assert_eq!(d.glyph, UNKNOWN_GLYPH);
    }

    #[test]
    fn codes_round_trip_through_tables() {
        for state in AppVersionState::ALL {
            assert_eq!(AppVersionState::from_code(state.code()), Some(*state));
        }
        for state in BuildUploadState::ALL {
            assert_eq!(BuildUploadState::from_code(state.code()), Some(*state));
        }
        for state in ExternalBuildState::ALL {
            assert_eq!(ExternalBuildState::from_code(state.code()), Some(*state));
        }
    }

    #[test]
    fn codes_are_case_sensitive() {
        assert_eq!(
            resolve::<BuildUploadState>(Some("complete")).label,
            "Unknown (complete)"
        );
    }

    proptest! {
        #[test]
        fn resolve_never_returns_empty_label(code in ".*") {
            prop_assert!(!resolve::<AppVersionState>(Some(code.as_str())).label.is_empty());
            prop_assert!(!resolve::<BuildUploadState>(Some(code.as_str())).label.is_empty());
            prop_assert!(!resolve::<ExternalBuildState>(Some(code.as_str())).label.is_empty());
        }

        #[test]
        fn unknown_codes_embed_the_code(code in "[a-z]{1,12}") {
            let d = resolve::<AppVersionState>(Some(code.as_str()));
            prop_assert_eq!(d.label, format!("Unknown ({code})"));
        }
    }
}
