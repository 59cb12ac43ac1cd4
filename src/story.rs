//! Story values supplied by the content collaborator

use serde::{Deserialize, Serialize};

/// How a story's raw content should be interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Html,
    /// Never parsed as markup
    PlainText,
}

impl ContentType {
    /// Interpret a MIME type or short hint; anything unrecognized is HTML
    pub fn from_hint(hint: &str) -> Self {
        let hint = hint.trim().to_ascii_lowercase();
        let essence = hint.split(';').next().unwrap_or_default().trim();
        match essence {
            "text/plain" | "plain" | "text" | "plaintext" | "txt" => ContentType::PlainText,
            _ => ContentType::Html,
        }
    }
}

/// A story as exposed by the content collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// Full body, possibly a complete HTML document
    #[serde(default)]
    pub content: Option<String>,
    /// Feed summary used when no body is available
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content_type: ContentType,
}

impl Story {
    pub fn new(id: &str, content: &str, content_type: ContentType) -> Self {
        Self {
            id: id.to_string(),
            title: String::new(),
            content: Some(content.to_string()),
            summary: None,
            content_type,
        }
    }

    /// The body if present and non-blank, else the summary, else empty
    pub fn raw_content(&self) -> &str {
        [self.content.as_deref(), self.summary.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_hints() {
        assert_eq!(ContentType::from_hint("text/plain; charset=utf-8"), ContentType::PlainText);
        assert_eq!(ContentType::from_hint("TEXT"), ContentType::PlainText);
        assert_eq!(ContentType::from_hint("text/html"), ContentType::Html);
        assert_eq!(ContentType::from_hint("application/xhtml+xml"), ContentType::Html);
        assert_eq!(ContentType::from_hint(""), ContentType::Html);
    }

    #[test]
    fn test_raw_content_fallback() {
        let mut story = Story::new("s1", "  ", ContentType::Html);
        assert_eq!(story.raw_content(), "");

        story.summary = Some("Summary".to_string());
        assert_eq!(story.raw_content(), "Summary");

        story.content = Some("<p>Body</p>".to_string());
        assert_eq!(story.raw_content(), "<p>Body</p>");
    }

    #[test]
    fn test_deserialize_story() {
        let story: Story = serde_json::from_str(
            r#"{"id":"s1","content":"Hello","contentType":"plaintext"}"#,
        )
        .unwrap();
        assert_eq!(story.content_type, ContentType::PlainText);
        assert_eq!(story.raw_content(), "Hello");
    }
}
