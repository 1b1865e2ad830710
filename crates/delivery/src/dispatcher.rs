//! Per-channel delivery fan-out.

use std::collections::BTreeMap;
use std::sync::Arc;

use channels::{ChannelKind, ChannelPayload};
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::WebhookTransport;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Configured webhook URL per channel. A channel without a URL is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelEndpoints {
    urls: BTreeMap<ChannelKind, String>,
}

impl ChannelEndpoints {
    /// No channel configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL for `channel`. Blank URLs leave the channel unconfigured.
    #[must_use]
    pub fn with(mut self, channel: ChannelKind, url: impl Into<String>) -> Self {
        let url = url.into();
        if url.trim().is_empty() {
            self.urls.remove(&channel);
        } else {
            self.urls.insert(channel, url);
        }
        self
    }

    /// The URL for `channel`, if configured.
    pub fn get(&self, channel: ChannelKind) -> Option<&str> {
        self.urls.get(&channel).map(String::as_str)
    }

    /// Returns `true` when `channel` has a URL.
    pub fn is_configured(&self, channel: ChannelKind) -> bool {
        self.urls.contains_key(&channel)
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// Result of delivering to one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// The endpoint accepted the payload.
    Sent,
    /// No endpoint is configured, or nothing was rendered.
    Skipped,
    /// The POST timed out, failed, or was rejected.
    Failed,
}

/// Outcome per channel. Serialises as `{"teams": "sent", "slack": "skipped"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeliveryReport {
    outcomes: BTreeMap<ChannelKind, DeliveryOutcome>,
}

impl DeliveryReport {
    /// A report with every channel skipped.
    pub fn skipped_all() -> Self {
        Self {
            outcomes: ChannelKind::ALL
                .iter()
                .map(|channel| (*channel, DeliveryOutcome::Skipped))
                .collect(),
        }
    }

    /// The outcome recorded for `channel`.
    pub fn outcome(&self, channel: ChannelKind) -> Option<DeliveryOutcome> {
        self.outcomes.get(&channel).copied()
    }

    /// Iterates outcomes in channel order.
    pub fn iter(&self) -> impl Iterator<Item = (ChannelKind, DeliveryOutcome)> + '_ {
        self.outcomes.iter().map(|(c, o)| (*c, *o))
    }

    /// Number of channels with the given outcome.
    pub fn count(&self, outcome: DeliveryOutcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }

    fn record(&mut self, channel: ChannelKind, outcome: DeliveryOutcome) {
        self.outcomes.insert(channel, outcome);
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Delivers rendered payloads to their configured endpoints.
///
/// Each configured channel is posted on its own task; one channel failing
/// never affects another. There is no retry.
pub struct DeliveryDispatcher {
    transport: Arc<dyn WebhookTransport>,
    endpoints: ChannelEndpoints,
}

impl DeliveryDispatcher {
    /// Creates a dispatcher posting through `transport`.
    pub fn new(transport: Arc<dyn WebhookTransport>, endpoints: ChannelEndpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// The configured endpoints.
    pub fn endpoints(&self) -> &ChannelEndpoints {
        &self.endpoints
    }

    /// Delivers every payload and reports one outcome per payload channel.
    #[instrument(skip_all, fields(payloads = payloads.len()))]
    pub async fn deliver(&self, payloads: Vec<ChannelPayload>) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        let mut tasks = JoinSet::new();

        for payload in payloads {
            let channel = payload.channel;
            let Some(url) = self.endpoints.get(channel) else {
                debug!(%channel, "no endpoint configured, skipping");
                report.record(channel, DeliveryOutcome::Skipped);
                continue;
            };

            // Stays failed unless the task reports back.
            report.record(channel, DeliveryOutcome::Failed);

            let transport = Arc::clone(&self.transport);
            let url = url.to_string();
            tasks.spawn(async move {
                let result = transport.post_json(&url, &payload.body).await;
                (channel, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((channel, Ok(()))) => {
                    info!(%channel, "notification delivered");
                    report.record(channel, DeliveryOutcome::Sent);
                }
                Ok((channel, Err(err))) => {
                    warn!(%channel, error = %err, "notification delivery failed");
                }
                Err(err) => {
                    warn!(error = %err, "delivery task aborted");
                }
            }
        }

        report
    }
}
