//! Slack renderer (Block Kit).
//!
//! Layout: a `header` block with the title, a `context` block with the
//! subtitle, then one `section` per ten facts (Slack's field limit). Fact
//! values are converted from CommonMark to Slack `mrkdwn`.

use events::NotificationDocument;
use serde_json::{json, Value};

use crate::DEFAULT_SUBTITLE;

/// Slack rejects sections with more fields than this.
pub const MAX_FIELDS_PER_SECTION: usize = 10;
/// Slack rejects `mrkdwn` fields longer than this.
pub const MAX_FIELD_CHARS: usize = 2000;
/// Slack rejects header text longer than this.
pub const MAX_HEADER_CHARS: usize = 150;

/// Builds the Slack message for `document`.
pub fn render(document: &NotificationDocument) -> Value {
    let subtitle = document.subtitle.as_deref().unwrap_or(DEFAULT_SUBTITLE);

    let mut blocks = vec![
        json!({
            "type": "header",
            "text": {
                "type": "plain_text",
                "text": truncate(&document.title, MAX_HEADER_CHARS),
                "emoji": true,
            },
        }),
        json!({
            "type": "context",
            "elements": [ { "type": "mrkdwn", "text": to_mrkdwn(subtitle) } ],
        }),
    ];

    for chunk in document.facts.chunks(MAX_FIELDS_PER_SECTION) {
        let fields: Vec<Value> = chunk
            .iter()
            .map(|f| {
                let text = format!("*{}*\n{}", escape(&f.label), to_mrkdwn(&f.value));
                json!({ "type": "mrkdwn", "text": truncate(&text, MAX_FIELD_CHARS) })
            })
            .collect();
        blocks.push(json!({ "type": "section", "fields": fields }));
    }

    json!({
        "text": document.title,
        "blocks": blocks,
    })
}

/// Converts CommonMark-flavoured fact text to Slack `mrkdwn`.
///
/// `**bold**` becomes `*bold*` and `[text](url)` becomes `<url|text>`.
/// Text inside triple-backtick fences and link URLs is left as written.
/// `&`, `<` and `>` are escaped everywhere outside link URLs.
pub fn to_mrkdwn(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (i, segment) in text.split(CODE_FENCE).enumerate() {
        if i > 0 {
            out.push_str(CODE_FENCE);
        }
        if i % 2 == 1 {
            out.push_str(&escape(segment));
        } else {
            push_prose(segment, &mut out);
        }
    }
    out
}

const CODE_FENCE: &str = "```";

fn push_prose(text: &str, out: &mut String) {
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&inline(&rest[..open]));
        let candidate = &rest[open..];
        match parse_link(candidate) {
            Some((label, url, consumed)) => {
                out.push('<');
                out.push_str(url);
                out.push('|');
                out.push_str(&inline(label));
                out.push('>');
                rest = &candidate[consumed..];
            }
            None => {
                out.push('[');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(&inline(rest));
}

fn inline(text: &str) -> String {
    escape(text).replace("**", "*")
}

/// Parses `[label](url)` at the start of `s`, returning the label, the url,
/// and the number of bytes consumed.
fn parse_link(s: &str) -> Option<(&str, &str, usize)> {
    let close = s.find("](")?;
    let label = &s[1..close];
    if label.contains('[') || label.contains('\n') {
        return None;
    }
    let url_start = close + 2;
    let url_len = s[url_start..].find(')')?;
    let url = &s[url_start..url_start + url_len];
    if url.is_empty() || url.contains(char::is_whitespace) {
        return None;
    }
    Some((label, url, url_start + url_len + 1))
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_bold_and_links() {
        assert_eq!(to_mrkdwn("**Ready for Sale**"), "*Ready for Sale*");
        assert_eq!(
            to_mrkdwn("[Open Link](https://example.com/a?b=1&c=2)"),
            "<https://example.com/a?b=1&c=2|Open Link>"
        );
    }

    #[test]
    fn bold_conversion_skips_urls_and_code_fences() {
        assert_eq!(
            to_mrkdwn("[Open](https://example.com/a**b)"),
            "<https://example.com/a**b|Open>"
        );
        assert_eq!(
            to_mrkdwn("```json\n{\"note\": \"a**b\"}\n```"),
            "```json\n{\"note\": \"a**b\"}\n```"
        );
        assert_eq!(
            to_mrkdwn("**Done** then ```x**y``` and **more**"),
            "*Done* then ```x**y``` and *more*"
        );
    }

    #[test]
    fn escapes_control_characters_outside_links() {
        assert_eq!(to_mrkdwn("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn leaves_unmatched_brackets_alone() {
        assert_eq!(to_mrkdwn("[1, 2, 3]"), "[1, 2, 3]");
        assert_eq!(to_mrkdwn("see [docs] (later)"), "see [docs] (later)");
        assert_eq!(to_mrkdwn("["), "[");
    }

    #[test]
    fn truncates_on_char_boundaries() {
        assert_eq!(truncate("héllo", 10), "héllo");
        assert_eq!(truncate("héllo", 3), "hé…");
    }
}
