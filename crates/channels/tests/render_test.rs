use channels::{render, render_all, slack, teams, ChannelKind, DEFAULT_SUBTITLE};
use events::NotificationDocument;
use serde_json::json;

fn sample_document() -> NotificationDocument {
    let mut doc = NotificationDocument::new("⬆️ App Store Build Upload Processed")
        .with_subtitle("📱 Relay 2.4.0 (118)");
    doc.push_fact("✅ Current State", "**Complete**");
    doc.push_fact("Previous State", "Processing");
    doc.push_fact("🌐 View in App Store Connect", "[Open Link](https://example.com/x)");
    doc
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[test]
fn teams_message_wraps_adaptive_card() {
    let payload = render(&sample_document(), ChannelKind::Teams);

    assert_eq!(payload.channel, ChannelKind::Teams);
    assert_eq!(
        payload.body,
        json!({
            "type": "message",
            "attachments": [{
                "contentType": "application/vnd.microsoft.card.adaptive",
                "content": {
                    "type": "AdaptiveCard",
                    "$schema": "http://adaptivecards.io/schemas/adaptive-card.json",
                    "version": "1.4",
                    "body": [
                        {
                            "type": "Image",
                            "url": "https://developer.apple.com/assets/elements/icons/app-store/app-store-128x128_2x.png",
                            "size": "Medium",
                            "horizontalAlignment": "Left"
                        },
                        {
                            "type": "TextBlock",
                            "text": "⬆️ App Store Build Upload Processed",
                            "weight": "Bolder",
                            "size": "Large",
                            "wrap": true,
                            "spacing": "Medium"
                        },
                        {
                            "type": "TextBlock",
                            "text": "📱 Relay 2.4.0 (118)",
                            "weight": "Default",
                            "size": "Medium",
                            "isSubtle": true,
                            "wrap": true,
                            "spacing": "Small"
                        },
                        {
                            "type": "FactSet",
                            "facts": [
                                { "title": "✅ Current State", "value": "**Complete**" },
                                { "title": "Previous State", "value": "Processing" },
                                { "title": "🌐 View in App Store Connect", "value": "[Open Link](https://example.com/x)" }
                            ],
                            "spacing": "Medium"
                        }
                    ]
                }
            }]
        })
    );
}

#[test]
fn teams_card_uses_default_subtitle_and_omits_empty_fact_set() {
    let card = teams::adaptive_card(&NotificationDocument::new("🔄 Webhook Test Ping"));

    let body = card["body"].as_array().unwrap();
    assert_eq!(body.len(), 3);
    assert_eq!(body[2]["text"], DEFAULT_SUBTITLE);
    assert!(body.iter().all(|block| block["type"] != "FactSet"));
}

// ---------------------------------------------------------------------------
// Slack
// ---------------------------------------------------------------------------

#[test]
fn slack_message_has_header_context_and_fields() {
    let body = slack::render(&sample_document());

    assert_eq!(body["text"], "⬆️ App Store Build Upload Processed");
    let blocks = body["blocks"].as_array().unwrap();
    assert_eq!(blocks.len(), 3);
    assert_eq!(blocks[0]["type"], "header");
    assert_eq!(blocks[0]["text"]["text"], "⬆️ App Store Build Upload Processed");
    assert_eq!(blocks[1]["elements"][0]["text"], "📱 Relay 2.4.0 (118)");

    let fields = blocks[2]["fields"].as_array().unwrap();
    assert_eq!(fields[0]["text"], "*✅ Current State*\n*Complete*");
    assert_eq!(fields[1]["text"], "*Previous State*\nProcessing");
    assert_eq!(
        fields[2]["text"],
        "*🌐 View in App Store Connect*\n<https://example.com/x|Open Link>"
    );
}

#[test]
fn slack_splits_facts_into_sections_of_ten() {
    let mut doc = NotificationDocument::new("many");
    for i in 0..12 {
        doc.push_fact(format!("label {i}"), format!("value {i}"));
    }

    let body = slack::render(&doc);
    let blocks = body["blocks"].as_array().unwrap();

    assert_eq!(blocks.len(), 4);
    assert_eq!(blocks[2]["fields"].as_array().unwrap().len(), 10);
    assert_eq!(blocks[3]["fields"].as_array().unwrap().len(), 2);
    assert_eq!(blocks[3]["fields"][1]["text"], "*label 11*\nvalue 11");
}

#[test]
fn slack_without_facts_has_no_sections() {
    let body = slack::render(&NotificationDocument::new("t"));
    let blocks = body["blocks"].as_array().unwrap();

    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[1]["elements"][0]["text"], DEFAULT_SUBTITLE);
}

#[test]
fn slack_truncates_oversized_fields() {
    let mut doc = NotificationDocument::new("big");
    doc.push_fact("🧾 Raw Payload", "x".repeat(5000));

    let body = slack::render(&doc);
    let text = body["blocks"][2]["fields"][0]["text"].as_str().unwrap();

    assert_eq!(text.chars().count(), slack::MAX_FIELD_CHARS);
    assert!(text.ends_with('…'));
}

// ---------------------------------------------------------------------------
// Purity
// ---------------------------------------------------------------------------

#[test]
fn rendering_is_deterministic() {
    let doc = sample_document();

    for channel in ChannelKind::ALL {
        let first = serde_json::to_vec(&render(&doc, channel).body).unwrap();
        let second = serde_json::to_vec(&render(&doc, channel).body).unwrap();
        assert_eq!(first, second, "{channel} output differs between renders");
    }
}

#[test]
fn render_all_produces_one_payload_per_channel() {
    let payloads = render_all(&sample_document());

    assert_eq!(payloads.len(), 2);
    assert_eq!(payloads[0].body, render(&sample_document(), ChannelKind::Teams).body);
    assert_eq!(payloads[1].body, render(&sample_document(), ChannelKind::Slack).body);
}
