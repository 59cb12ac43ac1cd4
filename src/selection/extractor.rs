//! Conversion of a UI selection snapshot into a character-offset range

use serde::{Deserialize, Serialize};

use crate::config::SelectionConfig;
use crate::dom::{visit, Boundary, Fragment, NodePath};
use crate::highlights::{HighlightColor, NewHighlight};

/// Screen-space bounding box of a selection; carried through for the UI only
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Immutable copy of the platform selection, taken once per selection event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionSnapshot {
    pub start: Boundary,
    pub end: Boundary,
    pub bounding_rect: Option<Rect>,
}

impl SelectionSnapshot {
    pub fn new(start: Boundary, end: Boundary) -> Self {
        Self {
            start,
            end,
            bounding_rect: None,
        }
    }

    pub fn with_rect(mut self, rect: Rect) -> Self {
        self.bounding_rect = Some(rect);
        self
    }
}

/// A validated selection inside a story's normalized content.
///
/// Transient: never persisted, only turned into a create request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSelection {
    pub text: String,
    pub start_offset: usize,
    pub end_offset: usize,
    pub context_before: String,
    pub context_after: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_rect: Option<Rect>,
}

impl TextSelection {
    pub fn to_new_highlight(&self, color: HighlightColor) -> NewHighlight {
        NewHighlight::new(&self.text, self.start_offset, self.end_offset)
            .with_context(&self.context_before, &self.context_after)
            .with_color(color)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SelectionExtractor {
    config: SelectionConfig,
}

impl SelectionExtractor {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Extract a selection relative to the container at `container`.
    ///
    /// Returns `None` when the selection is empty, reaches outside the
    /// container, or is shorter than the configured minimum once trimmed.
    /// A backward selection (end before start) is normalized.
    pub fn extract(
        &self,
        tree: &Fragment,
        container: &NodePath,
        snapshot: &SelectionSnapshot,
    ) -> Option<TextSelection> {
        let Some(nodes) = tree.children_at(container) else {
            tracing::debug!(container = ?container, "Selection container is not an element");
            return None;
        };

        let (Some(start), Some(end)) = (
            relative_to(container, &snapshot.start),
            relative_to(container, &snapshot.end),
        ) else {
            tracing::debug!("Selection lies outside the content container");
            return None;
        };

        let (Some(anchor), Some(focus)) = (
            visit::offset_at(nodes, &start),
            visit::offset_at(nodes, &end),
        ) else {
            tracing::debug!("Selection boundary does not resolve");
            return None;
        };
        let (from, to) = if anchor <= focus {
            (anchor, focus)
        } else {
            (focus, anchor)
        };
        if from == to {
            return None;
        }

        let text = visit::flatten(nodes);
        let selected = visit::slice_chars(&text, from, to)?;
        let trimmed = selected.trim();
        let trimmed_len = visit::char_len(trimmed);
        if trimmed_len < self.config.min_length {
            tracing::debug!(
                length = trimmed_len,
                min = self.config.min_length,
                "Selection too short"
            );
            return None;
        }

        let leading = visit::char_len(selected) - visit::char_len(selected.trim_start());
        let start_offset = from + leading;
        let end_offset = start_offset + trimmed_len;
        let text_len = visit::char_len(&text);
        let context = self.config.context_chars;

        let context_before =
            visit::slice_chars(&text, start_offset.saturating_sub(context), start_offset)
                .unwrap_or_default();
        let context_after =
            visit::slice_chars(&text, end_offset, (end_offset + context).min(text_len))
                .unwrap_or_default();

        Some(TextSelection {
            text: trimmed.to_string(),
            start_offset,
            end_offset,
            context_before: context_before.to_string(),
            context_after: context_after.to_string(),
            bounding_rect: snapshot.bounding_rect,
        })
    }
}

/// Re-root a boundary at `container`; `None` if it lies outside
fn relative_to(container: &NodePath, boundary: &Boundary) -> Option<Boundary> {
    let rest = boundary.path.strip_prefix(container.as_slice())?;
    Some(Boundary::new(rest.to_vec(), boundary.offset))
}
