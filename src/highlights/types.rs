//! Highlight records and creation requests

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dom::visit::char_len;
use crate::error::{Error, Result};

/// The closed set of highlight colors
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightColor {
    #[default]
    Yellow,
    Blue,
    Green,
    Pink,
    Purple,
}

impl HighlightColor {
    pub const ALL: [HighlightColor; 5] = [
        HighlightColor::Yellow,
        HighlightColor::Blue,
        HighlightColor::Green,
        HighlightColor::Pink,
        HighlightColor::Purple,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightColor::Yellow => "yellow",
            HighlightColor::Blue => "blue",
            HighlightColor::Green => "green",
            HighlightColor::Pink => "pink",
            HighlightColor::Purple => "purple",
        }
    }
}

impl fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HighlightColor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|color| color.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("Unknown highlight color: {}", s)))
    }
}

/// A persisted highlight.
///
/// Offsets index the flattened text of the story's normalized content.
/// Text and offsets are immutable once created; only the color changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Highlight {
    pub id: String,
    pub story_id: String,
    pub user_id: String,
    pub highlighted_text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_after: Option<String>,
    pub color: HighlightColor,
    /// Normalizer rule-set version the offsets were computed against
    pub normalizer_version: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Highlight {
    pub fn len(&self) -> usize {
        self.end_offset.saturating_sub(self.start_offset)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the char ranges of two highlights share any position
    pub fn overlaps(&self, other: &Highlight) -> bool {
        self.start_offset < other.end_offset && other.start_offset < self.end_offset
    }
}

/// Create highlight request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHighlight {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_after: Option<String>,
    #[serde(default)]
    pub color: Option<HighlightColor>,
}

impl NewHighlight {
    pub fn new(text: &str, start_offset: usize, end_offset: usize) -> Self {
        Self {
            text: text.to_string(),
            start_offset,
            end_offset,
            context_before: None,
            context_after: None,
            color: None,
        }
    }

    pub fn with_color(mut self, color: HighlightColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_context(mut self, before: &str, after: &str) -> Self {
        self.context_before = Some(before.to_string());
        self.context_after = Some(after.to_string());
        self
    }

    /// Check the record invariants before anything reaches the store
    pub fn validate(&self) -> Result<()> {
        if self.text.is_empty() {
            return Err(Error::Validation("Highlight text is empty".to_string()));
        }
        if self.end_offset <= self.start_offset {
            return Err(Error::Validation(format!(
                "Invalid highlight range {}..{}",
                self.start_offset, self.end_offset
            )));
        }
        let text_len = char_len(&self.text);
        if text_len != self.end_offset - self.start_offset {
            return Err(Error::Validation(format!(
                "Highlight text length {} does not match range {}..{}",
                text_len, self.start_offset, self.end_offset
            )));
        }
        Ok(())
    }

    pub fn color_or_default(&self) -> HighlightColor {
        self.color.unwrap_or_default()
    }
}
