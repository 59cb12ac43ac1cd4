//! Highlight injection into normalized story HTML
//!
//! Stored highlights are re-projected onto the content by character offset.
//! Each highlight is validated against the current flattened text before its
//! marker is inserted; a highlight that no longer fits the content is reported
//! stale and the rest still render.

use serde::Deserialize;

use crate::dom::{visit, Element, Fragment, Node, NodePath};
use crate::error::{StaleHighlight, StaleReason};
use crate::highlights::Highlight;

/// Configuration for highlight markers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HighlightConfig {
    /// CSS class prefix for markers
    pub class_prefix: String,
    /// Attribute carrying the highlight id
    pub id_attribute: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            class_prefix: "highlight".to_string(),
            id_attribute: "data-highlight-id".to_string(),
        }
    }
}

/// Result of highlight injection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InjectionResult {
    /// The annotated HTML
    pub html: String,
    /// Number of highlights that received a marker
    pub injected_count: usize,
    /// Highlights that could not be placed, in processing order
    pub stale: Vec<StaleHighlight>,
}

impl InjectionResult {
    pub fn stale_ids(&self) -> Vec<&str> {
        self.stale.iter().map(|s| s.id.as_str()).collect()
    }
}

/// One text node's share of a highlight range
struct Segment {
    path: NodePath,
    start: usize,
    end: usize,
    blank: bool,
}

/// Inserts `<mark>` markers for stored highlights
#[derive(Debug, Clone, Default)]
pub struct HighlightInjector {
    config: HighlightConfig,
}

impl HighlightInjector {
    pub fn new(config: HighlightConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HighlightConfig {
        &self.config
    }

    /// Inject markers for `highlights` into `html`.
    ///
    /// Highlights are processed by `start_offset` descending. When nothing
    /// could be injected the input is returned byte-for-byte.
    pub fn inject(&self, html: &str, highlights: &[Highlight]) -> InjectionResult {
        if highlights.is_empty() {
            return InjectionResult {
                html: html.to_string(),
                injected_count: 0,
                stale: Vec::new(),
            };
        }

        let mut fragment = match Fragment::parse(html) {
            Ok(fragment) => fragment,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot parse content, no highlights rendered");
                return InjectionResult {
                    html: html.to_string(),
                    injected_count: 0,
                    stale: highlights
                        .iter()
                        .map(|h| stale(h, StaleReason::Unparseable))
                        .collect(),
                };
            }
        };

        let mut ordered: Vec<&Highlight> = highlights.iter().collect();
        ordered.sort_by(|a, b| {
            b.start_offset
                .cmp(&a.start_offset)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut injected_count = 0;
        let mut stale_highlights = Vec::new();

        for highlight in ordered {
            match self.plan(&fragment, highlight) {
                Ok(segments) => {
                    self.wrap_segments(&mut fragment, highlight, segments);
                    injected_count += 1;
                }
                Err(reason) => {
                    let report = stale(highlight, reason);
                    tracing::debug!(
                        highlight_id = %report.id,
                        reason = %report.reason,
                        "Skipping stale highlight"
                    );
                    stale_highlights.push(report);
                }
            }
        }

        let html = if injected_count == 0 {
            html.to_string()
        } else {
            fragment.to_html()
        };

        InjectionResult {
            html,
            injected_count,
            stale: stale_highlights,
        }
    }

    /// Validate a highlight against the current tree and compute the text
    /// node segments its marker covers
    fn plan(
        &self,
        fragment: &Fragment,
        highlight: &Highlight,
    ) -> std::result::Result<Vec<Segment>, StaleReason> {
        let (start, end) = (highlight.start_offset, highlight.end_offset);
        if end <= start {
            return Err(StaleReason::EmptyRange);
        }

        let text = fragment.text();
        let text_len = visit::char_len(&text);
        let found = visit::slice_chars(&text, start, end)
            .ok_or(StaleReason::OutOfBounds { text_len })?;
        if found != highlight.highlighted_text {
            return Err(StaleReason::TextMismatch {
                found: found.to_string(),
            });
        }

        let spans: Vec<_> = visit::text_spans(&fragment.children)
            .into_iter()
            .filter(|span| span.intersects(start, end))
            .collect();

        let overlaps_marker = spans.iter().any(|span| {
            visit::ancestors(&fragment.children, &span.path)
                .iter()
                .any(|el| self.is_marker(el))
        });
        if overlaps_marker {
            return Err(StaleReason::Overlap);
        }

        let segments: Vec<Segment> = spans
            .iter()
            .map(|span| {
                let local_start = start.max(span.start) - span.start;
                let local_end = end.min(span.end()) - span.start;
                let blank = visit::slice_chars(span.text, local_start, local_end)
                    .map_or(true, |s| s.trim().is_empty());
                Segment {
                    path: span.path.clone(),
                    start: local_start,
                    end: local_end,
                    blank,
                }
            })
            .collect();

        if segments.iter().all(|segment| segment.blank) {
            return Ok(segments);
        }
        Ok(segments.into_iter().filter(|segment| !segment.blank).collect())
    }

    /// Wrap segments in reverse document order so earlier paths stay valid
    fn wrap_segments(
        &self,
        fragment: &mut Fragment,
        highlight: &Highlight,
        segments: Vec<Segment>,
    ) {
        for segment in segments.into_iter().rev() {
            let Some((index, parent)) = segment.path.split_last() else {
                continue;
            };
            let Some(children) = fragment.children_at_mut(parent) else {
                continue;
            };
            let Some(Node::Text(text)) = children.get(*index) else {
                continue;
            };

            let head = visit::byte_index(text, segment.start);
            let tail = visit::byte_index(text, segment.end);
            let before = &text[..head];
            let marked = &text[head..tail];
            let after = &text[tail..];

            let mut replacement = Vec::with_capacity(3);
            if !before.is_empty() {
                replacement.push(Node::text(before));
            }
            replacement.push(self.marker(highlight, marked).into());
            if !after.is_empty() {
                replacement.push(Node::text(after));
            }
            children.remove(*index);
            for (offset, node) in replacement.into_iter().enumerate() {
                children.insert(index + offset, node);
            }
        }
    }

    fn marker(&self, highlight: &Highlight, text: &str) -> Element {
        let prefix = &self.config.class_prefix;
        Element::new("mark")
            .with_attr("class", &format!("{} {}-{}", prefix, prefix, highlight.color))
            .with_attr(&self.config.id_attribute, &highlight.id)
            .with_child(Node::text(text))
    }

    fn is_marker(&self, el: &Element) -> bool {
        el.name == "mark" && el.attr(&self.config.id_attribute).is_some()
    }
}

fn stale(highlight: &Highlight, reason: StaleReason) -> StaleHighlight {
    StaleHighlight {
        id: highlight.id.clone(),
        start_offset: highlight.start_offset,
        end_offset: highlight.end_offset,
        reason,
    }
}

/// Inject highlights with the default marker configuration
pub fn inject_highlights(html: &str, highlights: &[Highlight]) -> InjectionResult {
    HighlightInjector::default().inject(html, highlights)
}
