//! Per-story highlight list backed by a store
//!
//! The in-memory list only ever reflects confirmed store results: a highlight
//! appears after `create` succeeds and disappears after `delete` succeeds.

use std::collections::HashMap;
use std::sync::Arc;

use super::store::HighlightStore;
use super::types::{Highlight, HighlightColor};
use crate::error::{Error, Result};
use crate::html::{HighlightInjector, InjectionResult};
use crate::selection::TextSelection;

pub struct HighlightSession<S> {
    store: Arc<S>,
    story_id: String,
    highlights: HashMap<String, Highlight>,
}

impl<S: HighlightStore> HighlightSession<S> {
    pub fn new(store: Arc<S>, story_id: &str) -> Self {
        Self {
            store,
            story_id: story_id.to_string(),
            highlights: HashMap::new(),
        }
    }

    pub fn story_id(&self) -> &str {
        &self.story_id
    }

    /// Replace the list with the store's current records
    pub async fn load(&mut self) -> Result<usize> {
        let listed = self.store.list(&self.story_id).await?;
        self.highlights = listed.into_iter().map(|h| (h.id.clone(), h)).collect();

        tracing::info!(
            story_id = %self.story_id,
            count = self.highlights.len(),
            "Loaded highlights"
        );
        Ok(self.highlights.len())
    }

    /// Persist a highlight for `selection`; it joins the list only once the
    /// store has confirmed it.
    pub async fn create_from_selection(
        &mut self,
        selection: &TextSelection,
        color: HighlightColor,
    ) -> Result<Highlight> {
        let request = selection.to_new_highlight(color);
        let created = match self.store.create(&self.story_id, &request).await {
            Ok(created) => created,
            Err(e) if e.is_user_error() => {
                tracing::debug!(story_id = %self.story_id, error = %e, "Rejected highlight");
                return Err(e);
            }
            Err(e) => {
                tracing::warn!(
                    story_id = %self.story_id,
                    error = %e,
                    "Failed to create highlight"
                );
                return Err(e);
            }
        };

        let overlapping = self.overlapping(&created).len();
        if overlapping > 0 {
            tracing::info!(
                highlight_id = %created.id,
                overlapping = overlapping,
                "Highlight overlaps existing ones; only one will render"
            );
        }

        self.highlights.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    /// Listed highlights, other than `highlight` itself, sharing any char
    /// position with it
    pub fn overlapping(&self, highlight: &Highlight) -> Vec<&Highlight> {
        self.highlights()
            .into_iter()
            .filter(|h| h.id != highlight.id && h.overlaps(highlight))
            .collect()
    }

    pub async fn recolor(
        &mut self,
        highlight_id: &str,
        color: HighlightColor,
    ) -> Result<Highlight> {
        let updated = self.store.update_color(highlight_id, color).await?;
        self.highlights.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    /// Delete a highlight. A `NotFound` from the store also drops any local
    /// copy, since the record is not persisted.
    pub async fn delete(&mut self, highlight_id: &str) -> Result<()> {
        match self.store.delete(highlight_id).await {
            Ok(()) => {
                self.highlights.remove(highlight_id);
                Ok(())
            }
            Err(Error::NotFound(message)) => {
                self.highlights.remove(highlight_id);
                Err(Error::NotFound(message))
            }
            Err(e) => Err(e),
        }
    }

    pub fn get(&self, highlight_id: &str) -> Option<&Highlight> {
        self.highlights.get(highlight_id)
    }

    /// Highlights ordered by `start_offset`, then id
    pub fn highlights(&self) -> Vec<&Highlight> {
        let mut list: Vec<&Highlight> = self.highlights.values().collect();
        list.sort_by(|a, b| {
            a.start_offset
                .cmp(&b.start_offset)
                .then_with(|| a.id.cmp(&b.id))
        });
        list
    }

    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }

    /// Render the current list onto the story's normalized content
    pub fn render(&self, normalized_html: &str, injector: &HighlightInjector) -> InjectionResult {
        let list: Vec<Highlight> = self.highlights().into_iter().cloned().collect();
        let result = injector.inject(normalized_html, &list);
        if !result.stale.is_empty() {
            tracing::info!(
                story_id = %self.story_id,
                stale = result.stale.len(),
                injected = result.injected_count,
                "Rendered highlights with stale entries"
            );
        }
        result
    }
}
