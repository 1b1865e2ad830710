//! Chat-platform renderers for notification documents.
//!
//! Each [`ChannelKind`] has one renderer that turns an
//! [`events::NotificationDocument`] into the JSON body its incoming-webhook
//! endpoint expects:
//!
//! | Channel | Module | Wire format |
//! |---------|--------|-------------|
//! | Microsoft Teams | [`teams`] | message with one Adaptive Card 1.4 attachment |
//! | Slack | [`slack`] | Block Kit message with a `text` fallback |
//!
//! ## Architectural Layer
//!
//! **Pure translation.** Renderers perform no I/O and hold no state, so
//! rendering the same document twice yields byte-identical JSON. Delivery is
//! the `delivery` crate's concern.

pub mod slack;
pub mod teams;

use events::NotificationDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subtitle shown when a document has none.
pub const DEFAULT_SUBTITLE: &str = "App Store Connect via Proxy";

/// One outbound notification destination type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelKind {
    /// Microsoft Teams incoming webhook / workflow.
    Teams,
    /// Slack incoming webhook.
    Slack,
}

impl ChannelKind {
    /// Every supported channel.
    pub const ALL: [ChannelKind; 2] = [ChannelKind::Teams, ChannelKind::Slack];

    /// Lower-case channel name used in reports and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Teams => "teams",
            ChannelKind::Slack => "slack",
        }
    }
}

impl std::fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rendered, channel-specific JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPayload {
    /// The channel this body is for.
    pub channel: ChannelKind,
    /// The JSON body to POST.
    pub body: Value,
}

/// Renders `document` for `channel`.
pub fn render(document: &NotificationDocument, channel: ChannelKind) -> ChannelPayload {
    let body = match channel {
        ChannelKind::Teams => teams::render(document),
        ChannelKind::Slack => slack::render(document),
    };
    ChannelPayload { channel, body }
}

/// Renders `document` for every supported channel.
pub fn render_all(document: &NotificationDocument) -> Vec<ChannelPayload> {
    ChannelKind::ALL
        .iter()
        .map(|channel| render(document, *channel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_names_are_lowercase() {
        assert_eq!(ChannelKind::Teams.to_string(), "teams");
        assert_eq!(
            serde_json::to_string(&ChannelKind::Slack).unwrap(),
            "\"slack\""
        );
    }

    #[test]
    fn render_all_covers_every_channel() {
        let payloads = render_all(&NotificationDocument::new("t"));
        let kinds: Vec<_> = payloads.iter().map(|p| p.channel).collect();
        assert_eq!(kinds, ChannelKind::ALL.to_vec());
    }
}
