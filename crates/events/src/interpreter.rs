//! Event interpretation: envelope in, notification document out.
//!
//! Dispatch is a closed match over [`EventKind`]. Adding support for a new
//! App Store Connect event means adding a variant, its wire name in
//! [`EventKind::from_type`], and one handler method.
//!
//! # Event Types
//!
//! | `data.type` | Handler | Notes |
//! |-------------|---------|-------|
//! | `appStoreVersionAppVersionStateUpdated` | `app_version_state_updated` | |
//! | `webhookPingCreated` | `ping_created` | |
//! | `webhookPings` | | suppressed, returns `None` |
//! | `betaFeedbackScreenshotSubmissionCreated` | `screenshot_submitted` | deep links |
//! | `betaFeedbackCrashSubmissionCreated` | `crash_submitted` | deep link |
//! | `buildUploadStateUpdated` | `build_upload_state_updated` | enriched |
//! | `buildBetaDetailExternalBuildStateUpdated` | `external_build_state_updated` | |
//! | anything else | `unhandled` | raw payload fact |

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::labels::{resolve, AppVersionState, BuildUploadState, ExternalBuildState};
use crate::timestamp::{format_timestamp, DisplayZone};
use crate::{
    AdamId, BuildInfoSource, BuildUploadInfo, BundleId, EventEnvelope, InterpretError,
    NotificationDocument, PlatformId,
};

const TIMESTAMP_LABEL: &str = "⏱️ Timestamp";

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// Every event type the relay knows how to interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// An app store version moved to a new review status.
    AppVersionStateUpdated,
    /// A test ping sent from App Store Connect.
    PingCreated,
    /// Ping bookkeeping event; never notified.
    Pings,
    /// A TestFlight tester submitted screenshot feedback.
    ScreenshotSubmissionCreated,
    /// A TestFlight tester submitted crash feedback.
    CrashSubmissionCreated,
    /// A build upload changed processing state.
    BuildUploadStateUpdated,
    /// A build changed external TestFlight availability.
    ExternalBuildStateUpdated,
    /// Any other `data.type`.
    Unknown(String),
}

impl EventKind {
    /// Classifies a `data.type` value.
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "appStoreVersionAppVersionStateUpdated" => Self::AppVersionStateUpdated,
            "webhookPingCreated" => Self::PingCreated,
            "webhookPings" => Self::Pings,
            "betaFeedbackScreenshotSubmissionCreated" => Self::ScreenshotSubmissionCreated,
            "betaFeedbackCrashSubmissionCreated" => Self::CrashSubmissionCreated,
            "buildUploadStateUpdated" => Self::BuildUploadStateUpdated,
            "buildBetaDetailExternalBuildStateUpdated" => Self::ExternalBuildStateUpdated,
            other => Self::Unknown(other.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Identifiers used to build optional links in notifications.
///
/// Every field is optional; facts that need a missing identifier are omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppLinks {
    /// Apple ID of the app.
    pub adam_id: Option<AdamId>,
    /// Bundle identifier.
    pub bundle_id: Option<BundleId>,
    /// Xcode Organizer platform identifier.
    pub platform_id: Option<PlatformId>,
    /// Public App Store page.
    pub app_store_url: Option<String>,
}

/// Configuration consumed by [`EventInterpreter`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterpreterSettings {
    /// Zone timestamps are rendered in.
    pub zone: DisplayZone,
    /// Deep-link identifiers.
    pub links: AppLinks,
}

// ---------------------------------------------------------------------------
// Interpretation
// ---------------------------------------------------------------------------

/// The outcome of interpreting an event that should be notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpretation {
    /// The document to render.
    pub document: NotificationDocument,
    /// Build metadata, when the handler performed enrichment.
    pub build_info: Option<BuildUploadInfo>,
}

impl From<NotificationDocument> for Interpretation {
    fn from(document: NotificationDocument) -> Self {
        Self {
            document,
            build_info: None,
        }
    }
}

/// Turns envelopes into notification documents.
pub struct EventInterpreter {
    settings: InterpreterSettings,
    build_info: Arc<dyn BuildInfoSource>,
}

impl EventInterpreter {
    /// Creates an interpreter that enriches build events through `build_info`.
    pub fn new(settings: InterpreterSettings, build_info: Arc<dyn BuildInfoSource>) -> Self {
        Self {
            settings,
            build_info,
        }
    }

    /// Interprets one event.
    ///
    /// Returns `Ok(None)` for event types that are deliberately not notified.
    ///
    /// # Errors
    ///
    /// - [`InterpretError::Timestamp`] if the event's timestamp is malformed.
    /// - [`InterpretError::MissingRelatedInstance`] if a build upload event has
    ///   no upload id to enrich with.
    /// - [`InterpretError::Enrichment`] if the build lookup fails.
    #[instrument(skip_all, fields(event_type = %envelope.event_type()))]
    pub async fn interpret(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<Option<Interpretation>, InterpretError> {
        let kind = EventKind::from_type(envelope.event_type());
        debug!(?kind, "interpreting event");

        let interpretation: Interpretation = match kind {
            EventKind::AppVersionStateUpdated => self.app_version_state_updated(envelope)?.into(),
            EventKind::PingCreated => self.ping_created(envelope)?.into(),
            EventKind::Pings => {
                debug!("suppressing webhookPings event");
                return Ok(None);
            }
            EventKind::ScreenshotSubmissionCreated => self.screenshot_submitted(envelope)?.into(),
            EventKind::CrashSubmissionCreated => self.crash_submitted(envelope)?.into(),
            EventKind::BuildUploadStateUpdated => self.build_upload_state_updated(envelope).await?,
            EventKind::ExternalBuildStateUpdated => {
                self.external_build_state_updated(envelope)?.into()
            }
            EventKind::Unknown(event_type) => {
                warn!(%event_type, "no handler for event type, using fallback");
                self.unhandled(&event_type, envelope)?.into()
            }
        };

        Ok(Some(interpretation))
    }

    // -----------------------------------------------------------------------
    // Handlers
    // -----------------------------------------------------------------------

    fn app_version_state_updated(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<NotificationDocument, InterpretError> {
        let current = resolve::<AppVersionState>(envelope.attribute_str("newValue"));
        let previous = resolve::<AppVersionState>(envelope.attribute_str("oldValue"));

        let mut doc = NotificationDocument::new("🚀 App Version Status Updated");
        doc.push_fact(
            format!("{} Current Status", current.glyph),
            format!("**{}**", current.label),
        );
        doc.push_fact("Previous Status", previous.label);
        if let Some(url) = &self.settings.links.app_store_url {
            doc.push_fact("App Store", format!("[View on App Store]({url})"));
        }
        doc.push_fact(TIMESTAMP_LABEL, self.timestamp(envelope)?);
        if let Some(version_id) = envelope.related_instance() {
            doc.push_fact("Version ID", version_id.as_str());
        }
        Ok(doc)
    }

    fn ping_created(&self, envelope: &EventEnvelope) -> Result<NotificationDocument, InterpretError> {
        let mut doc = NotificationDocument::new("🔄 Webhook Test Ping");
        doc.push_fact(
            "📨 Ping ID",
            envelope.id().map(|id| id.to_string()).unwrap_or_default(),
        );
        doc.push_fact(TIMESTAMP_LABEL, self.timestamp(envelope)?);
        Ok(doc)
    }

    fn screenshot_submitted(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<NotificationDocument, InterpretError> {
        let links = &self.settings.links;
        let feedback_id = envelope.related_instance();

        let mut doc = NotificationDocument::new("🧪 TestFlight Feedback Screenshot Submitted");
        doc.push_fact("🆔 Screenshot ID", code_span(feedback_id.map(|id| id.as_str())));
        doc.push_fact(TIMESTAMP_LABEL, self.timestamp(envelope)?);

        if let (Some(feedback_id), Some(adam_id)) = (feedback_id, &links.adam_id) {
            let web_link = format!(
                "https://appstoreconnect.apple.com/apps/{adam_id}/testflight/screenshots/{feedback_id}"
            );
            doc.push_fact("🌐 View in App Store Connect", format!("[Open Link]({web_link})"));

            if let (Some(bundle_id), Some(platform_id)) = (&links.bundle_id, &links.platform_id) {
                let xcode_link = format!(
                    "xcode://organizer/feedback/downloadFeedback?adamId={adam_id}&feedbackId={feedback_id}&bundleId={bundle_id}&platformId={platform_id}&userAgent=appStoreConnect"
                );
                doc.push_fact("💻 Open in Xcode Organizer", format!("[Open in Xcode]({xcode_link})"));
            }
        }
        Ok(doc)
    }

    fn crash_submitted(&self, envelope: &EventEnvelope) -> Result<NotificationDocument, InterpretError> {
        let crash_id = envelope.related_instance();

        let mut doc = NotificationDocument::new("🐞 TestFlight Crash Feedback Submitted");
        doc.push_fact("🆔 Crash ID", code_span(crash_id.map(|id| id.as_str())));
        doc.push_fact(TIMESTAMP_LABEL, self.timestamp(envelope)?);

        if let (Some(crash_id), Some(adam_id)) = (crash_id, &self.settings.links.adam_id) {
            let web_link = format!(
                "https://appstoreconnect.apple.com/apps/{adam_id}/testflight/crashes/{crash_id}"
            );
            doc.push_fact("🌐 View in App Store Connect", format!("[Open Link]({web_link})"));
        }
        Ok(doc)
    }

    async fn build_upload_state_updated(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<Interpretation, InterpretError> {
        let upload_id =
            envelope
                .related_instance()
                .ok_or_else(|| InterpretError::MissingRelatedInstance {
                    event_type: envelope.event_type().to_string(),
                })?;
        let timestamp = self.timestamp(envelope)?;

        debug!(%upload_id, "fetching build upload info");
        let info = self.build_info.fetch_build_info(upload_id).await?;

        let current = resolve::<BuildUploadState>(envelope.attribute_str("newState"));
        let previous = resolve::<BuildUploadState>(envelope.attribute_str("oldState"));

        let mut doc = NotificationDocument::new("⬆️ App Store Build Upload Processed")
            .with_subtitle(format!("📱 {}", info.summary()));
        doc.push_fact(
            format!("{} Current State", current.glyph),
            format!("**{}**", current.label),
        );
        doc.push_fact("Previous State", previous.label);
        doc.push_fact("🆔 Upload ID", code_span(Some(upload_id.as_str())));
        doc.push_fact(TIMESTAMP_LABEL, timestamp);

        Ok(Interpretation {
            document: doc,
            build_info: Some(info),
        })
    }

    fn external_build_state_updated(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<NotificationDocument, InterpretError> {
        let state = resolve::<ExternalBuildState>(envelope.attribute_str("newExternalBuildState"));

        let mut doc = NotificationDocument::new("📣 TestFlight External Availability Updated");
        doc.push_fact(
            format!("{} External Status", state.glyph),
            format!("**{}**", state.label),
        );
        doc.push_fact(
            "🆔 Build Detail ID",
            code_span(envelope.related_instance().map(|id| id.as_str())),
        );
        doc.push_fact(TIMESTAMP_LABEL, self.timestamp(envelope)?);
        Ok(doc)
    }

    fn unhandled(
        &self,
        event_type: &str,
        envelope: &EventEnvelope,
    ) -> Result<NotificationDocument, InterpretError> {
        let pretty = serde_json::to_string_pretty(envelope.raw())
            .unwrap_or_else(|_| envelope.raw().to_string());

        let mut doc = NotificationDocument::new(format!("📬 Unhandled App Store Event: `{event_type}`"));
        doc.push_fact(TIMESTAMP_LABEL, self.timestamp(envelope)?);
        doc.push_fact("🧾 Raw Payload", format!("```json\n{pretty}\n```"));
        Ok(doc)
    }

    // -----------------------------------------------------------------------

    /// The event's own timestamp if present, else the capture time.
    fn timestamp(&self, envelope: &EventEnvelope) -> Result<String, InterpretError> {
        match envelope.timestamp() {
            Some(iso) => Ok(format_timestamp(iso, self.settings.zone)?),
            None => Ok(self.settings.zone.format(envelope.received_at())),
        }
    }
}

fn code_span(value: Option<&str>) -> String {
    value.map(|v| format!("`{v}`")).unwrap_or_default()
}
