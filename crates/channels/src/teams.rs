//! Microsoft Teams renderer (Adaptive Card 1.4).

use events::NotificationDocument;
use serde_json::{json, Value};

use crate::DEFAULT_SUBTITLE;

/// Attachment content type for Adaptive Cards.
pub const ADAPTIVE_CARD_CONTENT_TYPE: &str = "application/vnd.microsoft.card.adaptive";

const CARD_SCHEMA: &str = "http://adaptivecards.io/schemas/adaptive-card.json";
const APP_STORE_ICON: &str =
    "https://developer.apple.com/assets/elements/icons/app-store/app-store-128x128_2x.png";

/// Wraps the Adaptive Card for `document` in a Teams message.
pub fn render(document: &NotificationDocument) -> Value {
    json!({
        "type": "message",
        "attachments": [
            {
                "contentType": ADAPTIVE_CARD_CONTENT_TYPE,
                "content": adaptive_card(document),
            }
        ],
    })
}

/// Builds the bare Adaptive Card.
///
/// Body: App Store icon, title, subtitle (or [`DEFAULT_SUBTITLE`]), and a
/// `FactSet` only when the document has facts.
pub fn adaptive_card(document: &NotificationDocument) -> Value {
    let mut body = vec![
        json!({
            "type": "Image",
            "url": APP_STORE_ICON,
            "size": "Medium",
            "horizontalAlignment": "Left",
        }),
        json!({
            "type": "TextBlock",
            "text": document.title,
            "weight": "Bolder",
            "size": "Large",
            "wrap": true,
            "spacing": "Medium",
        }),
        json!({
            "type": "TextBlock",
            "text": document.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE),
            "weight": "Default",
            "size": "Medium",
            "isSubtle": true,
            "wrap": true,
            "spacing": "Small",
        }),
    ];

    if !document.facts.is_empty() {
        let facts: Vec<Value> = document
            .facts
            .iter()
            .map(|f| json!({ "title": f.label, "value": f.value }))
            .collect();
        body.push(json!({
            "type": "FactSet",
            "facts": facts,
            "spacing": "Medium",
        }));
    }

    json!({
        "type": "AdaptiveCard",
        "$schema": CARD_SCHEMA,
        "version": "1.4",
        "body": body,
    })
}
