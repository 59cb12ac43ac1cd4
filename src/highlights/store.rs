//! Highlight persistence contract

use async_trait::async_trait;

use super::types::{Highlight, HighlightColor, NewHighlight};
use crate::error::Result;

/// CRUD contract for persisted highlights.
///
/// Implementations are scoped to a single user; the `(user, story)` pair keys
/// every record. Persistence failures surface as `Error::Persistence` and are
/// never retried by callers in this crate.
#[async_trait]
pub trait HighlightStore: Send + Sync {
    /// Persist a new highlight.
    ///
    /// Fails with `Error::Validation` when the text is empty or the range is
    /// malformed.
    async fn create(&self, story_id: &str, request: &NewHighlight) -> Result<Highlight>;

    /// Highlights of a story ordered by `start_offset` ascending
    async fn list(&self, story_id: &str) -> Result<Vec<Highlight>>;

    async fn get(&self, highlight_id: &str) -> Result<Option<Highlight>>;

    /// Change the color, the only mutable field
    async fn update_color(&self, highlight_id: &str, color: HighlightColor) -> Result<Highlight>;

    /// Fails with `Error::NotFound` when no such highlight exists
    async fn delete(&self, highlight_id: &str) -> Result<()>;

    /// Cascade hook for story deletion; returns the number removed
    async fn delete_for_story(&self, story_id: &str) -> Result<u64>;

    async fn count_for_story(&self, story_id: &str) -> Result<u64>;
}
