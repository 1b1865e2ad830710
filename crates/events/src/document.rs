//! Channel-agnostic notification documents and enrichment results.

use serde::{Deserialize, Serialize};

/// One label/value row of a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fact {
    /// Row label (may include a leading glyph).
    pub label: String,
    /// Row value, in CommonMark-flavoured text (`**bold**`, `[text](url)`).
    pub value: String,
}

impl Fact {
    /// Creates a fact.
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// The rendered meaning of one event, independent of any chat platform.
///
/// Fact order is significant: renderers reproduce it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationDocument {
    /// Headline.
    pub title: String,
    /// Secondary line; renderers substitute their own default when `None`.
    pub subtitle: Option<String>,
    /// Ordered facts. May be empty.
    pub facts: Vec<Fact>,
}

impl NotificationDocument {
    /// Creates a document with no subtitle and no facts.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            facts: Vec::new(),
        }
    }

    /// Sets the subtitle.
    #[must_use]
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Appends a fact.
    pub fn push_fact(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.facts.push(Fact::new(label, value));
    }

    /// Returns the fact labels in order.
    pub fn labels(&self) -> Vec<&str> {
        self.facts.iter().map(|f| f.label.as_str()).collect()
    }

    /// Returns the value of the first fact with the given label.
    pub fn fact_value(&self, label: &str) -> Option<&str> {
        self.facts
            .iter()
            .find(|f| f.label == label)
            .map(|f| f.value.as_str())
    }
}

/// Build metadata fetched from App Store Connect for a build upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildUploadInfo {
    /// Marketing version (`CFBundleShortVersionString`).
    pub version: String,
    /// Build number (`CFBundleVersion`).
    pub build: String,
    /// App display name, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
}

impl BuildUploadInfo {
    /// Formats the build as `"[app ]version (build)"`.
    pub fn summary(&self) -> String {
        match &self.app_name {
            Some(name) => format!("{name} {} ({})", self.version, self.build),
            None => format!("{} ({})", self.version, self.build),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_keep_insertion_order() {
        let mut doc = NotificationDocument::new("t");
        doc.push_fact("b", "2");
        doc.push_fact("a", "1");

        assert_eq!(doc.labels(), vec!["b", "a"]);
        assert_eq!(doc.fact_value("a"), Some("1"));
        assert_eq!(doc.fact_value("c"), None);
    }

    #[test]
    fn build_summary_omits_missing_app_name() {
        let mut info = BuildUploadInfo {
            version: "2.4.0".into(),
            build: "118".into(),
            app_name: None,
        };
        assert_eq!(info.summary(), "2.4.0 (118)");

        info.app_name = Some("Relay".into());
        assert_eq!(info.summary(), "Relay 2.4.0 (118)");
    }
}
