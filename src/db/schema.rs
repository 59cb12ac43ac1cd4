//! Database schema initialization

use sqlx::SqlitePool;

use crate::error::Result;

/// Initialize the database schema
pub async fn initialize_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA_SQL).execute(pool).await?;

    Ok(())
}

const SCHEMA_SQL: &str = r#"
-- Highlights over normalized story content
CREATE TABLE IF NOT EXISTS highlights (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    story_id TEXT NOT NULL,
    highlighted_text TEXT NOT NULL,
    -- Char offsets into the flattened normalized text
    start_offset INTEGER NOT NULL,
    end_offset INTEGER NOT NULL,
    -- Display/debug context, never used to recompute offsets
    context_before TEXT,
    context_after TEXT,
    color TEXT NOT NULL DEFAULT 'yellow',
    normalizer_version INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,

    CHECK (end_offset > start_offset)
);

CREATE INDEX IF NOT EXISTS idx_highlights_user_story ON highlights(user_id, story_id);
CREATE INDEX IF NOT EXISTS idx_highlights_start ON highlights(story_id, start_offset);
"#;
