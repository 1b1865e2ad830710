//! The event processor: parse, interpret, render, deliver.

use std::sync::Arc;

use appstore::AppStoreClient;
use delivery::{DeliveryDispatcher, DeliveryReport, HttpTransport};
use events::{BuildUploadInfo, EventEnvelope, EventInterpreter, ProcessingRunId};
use serde::Serialize;
use tracing::{field, info, instrument, warn, Span};

use crate::{ProcessingError, RelayConfig};

/// Summary of one processed event.
///
/// Serialises as
/// `{"ok": true, "receivedType": ..., "results": {"teams": ..., "slack": ...}, "suppressed": ..., ...}`
/// with the build fields (`version`, `build`, `appName`) flattened in when
/// enrichment ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingReport {
    /// Always `true`; failures are [`ProcessingError`]s.
    pub ok: bool,
    /// The event's `data.type`.
    pub received_type: String,
    /// Delivery outcome per channel.
    pub results: DeliveryReport,
    /// `true` when the event type is deliberately not notified.
    pub suppressed: bool,
    /// Build metadata, when the event was enriched.
    #[serde(flatten)]
    pub build_info: Option<BuildUploadInfo>,
}

/// Drives one event through the relay.
pub struct EventProcessor {
    interpreter: EventInterpreter,
    dispatcher: DeliveryDispatcher,
}

impl EventProcessor {
    /// Creates a processor from its parts.
    pub fn new(interpreter: EventInterpreter, dispatcher: DeliveryDispatcher) -> Self {
        Self {
            interpreter,
            dispatcher,
        }
    }

    /// Wires the production adapters from `config`.
    pub fn from_config(config: &RelayConfig) -> Self {
        let build_info = Arc::new(AppStoreClient::new(config.appstore.clone()));
        let transport = Arc::new(HttpTransport::new(config.http_timeout));

        Self::new(
            EventInterpreter::new(config.interpreter.clone(), build_info),
            DeliveryDispatcher::new(transport, config.endpoints.clone()),
        )
    }

    /// Processes one raw webhook body.
    ///
    /// # Errors
    ///
    /// - [`ProcessingError::MalformedEnvelope`] if the body is not JSON or
    ///   lacks `data.type`.
    /// - [`ProcessingError::Interpret`] if interpretation or enrichment fails.
    ///   Nothing is delivered in that case.
    pub async fn process(&self, body: &[u8]) -> Result<ProcessingReport, ProcessingError> {
        let envelope = EventEnvelope::parse(body).inspect_err(|err| {
            warn!(error = %err, "rejecting malformed envelope");
        })?;
        self.process_envelope(&envelope).await
    }

    /// Processes an already parsed envelope.
    ///
    /// # Errors
    ///
    /// See [`EventProcessor::process`].
    #[instrument(
        skip_all,
        fields(run_id = field::Empty, event_type = %envelope.event_type())
    )]
    pub async fn process_envelope(
        &self,
        envelope: &EventEnvelope,
    ) -> Result<ProcessingReport, ProcessingError> {
        let run_id = ProcessingRunId::new_random();
        Span::current().record("run_id", field::display(&run_id));
        info!("processing event");

        let received_type = envelope.event_type().to_string();

        let interpretation = self
            .interpreter
            .interpret(envelope)
            .await
            .inspect_err(|err| warn!(error = %err, "event interpretation failed"))?;

        let Some(interpretation) = interpretation else {
            info!("event suppressed");
            return Ok(ProcessingReport {
                ok: true,
                received_type,
                results: DeliveryReport::skipped_all(),
                suppressed: true,
                build_info: None,
            });
        };

        let payloads = channels::render_all(&interpretation.document);
        let results = self.dispatcher.deliver(payloads).await;
        info!(
            sent = results.count(delivery::DeliveryOutcome::Sent),
            failed = results.count(delivery::DeliveryOutcome::Failed),
            "event processed"
        );

        Ok(ProcessingReport {
            ok: true,
            received_type,
            results,
            suppressed: false,
            build_info: interpretation.build_info,
        })
    }
}
