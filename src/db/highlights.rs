//! Highlights database operations

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::highlights::{Highlight, HighlightColor, HighlightStore, NewHighlight};
use crate::html::NORMALIZER_VERSION;

const SELECT_COLUMNS: &str = r#"
    SELECT id, user_id, story_id, highlighted_text, start_offset, end_offset,
           context_before, context_after, color, normalizer_version,
           created_at, updated_at
    FROM highlights
"#;

/// SQLite-backed highlight store scoped to one user
#[derive(Clone)]
pub struct SqliteHighlightStore {
    pool: SqlitePool,
    user_id: String,
}

impl SqliteHighlightStore {
    pub fn new(pool: SqlitePool, user_id: &str) -> Self {
        Self {
            pool,
            user_id: user_id.to_string(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

#[async_trait]
impl HighlightStore for SqliteHighlightStore {
    async fn create(&self, story_id: &str, request: &NewHighlight) -> Result<Highlight> {
        request.validate()?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        let color = request.color_or_default();

        sqlx::query(
            r#"
            INSERT INTO highlights (
                id, user_id, story_id, highlighted_text, start_offset, end_offset,
                context_before, context_after, color, normalizer_version,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&self.user_id)
        .bind(story_id)
        .bind(&request.text)
        .bind(to_db_offset(request.start_offset)?)
        .bind(to_db_offset(request.end_offset)?)
        .bind(&request.context_before)
        .bind(&request.context_after)
        .bind(color.as_str())
        .bind(i64::from(NORMALIZER_VERSION))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            highlight_id = %id,
            story_id = story_id,
            start = request.start_offset,
            end = request.end_offset,
            "Created highlight"
        );

        self.get(&id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Created highlight vanished: {}", id)))
    }

    async fn list(&self, story_id: &str) -> Result<Vec<Highlight>> {
        let rows = sqlx::query_as::<_, HighlightRow>(&format!(
            "{} WHERE user_id = ? AND story_id = ? \
             ORDER BY start_offset ASC, created_at ASC, id ASC",
            SELECT_COLUMNS
        ))
        .bind(&self.user_id)
        .bind(story_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HighlightRow::into_highlight).collect()
    }

    async fn get(&self, highlight_id: &str) -> Result<Option<Highlight>> {
        let row = sqlx::query_as::<_, HighlightRow>(&format!(
            "{} WHERE id = ? AND user_id = ?",
            SELECT_COLUMNS
        ))
        .bind(highlight_id)
        .bind(&self.user_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(HighlightRow::into_highlight).transpose()
    }

    async fn update_color(&self, highlight_id: &str, color: HighlightColor) -> Result<Highlight> {
        let result = sqlx::query(
            "UPDATE highlights SET color = ?, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(color.as_str())
        .bind(Utc::now().to_rfc3339())
        .bind(highlight_id)
        .bind(&self.user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Highlight not found: {}", highlight_id)));
        }

        self.get(highlight_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Highlight not found: {}", highlight_id)))
    }

    async fn delete(&self, highlight_id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM highlights WHERE id = ? AND user_id = ?")
            .bind(highlight_id)
            .bind(&self.user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Error::NotFound(format!("Highlight not found: {}", highlight_id)));
        }
        Ok(())
    }

    async fn delete_for_story(&self, story_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM highlights WHERE user_id = ? AND story_id = ?")
            .bind(&self.user_id)
            .bind(story_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn count_for_story(&self, story_id: &str) -> Result<u64> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM highlights WHERE user_id = ? AND story_id = ?")
                .bind(&self.user_id)
                .bind(story_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(u64::try_from(row.0).unwrap_or_default())
    }
}

fn to_db_offset(offset: usize) -> Result<i64> {
    i64::try_from(offset).map_err(|_| Error::Validation(format!("Offset out of range: {}", offset)))
}

/// Internal row type for SQLite queries
#[derive(sqlx::FromRow)]
struct HighlightRow {
    id: String,
    user_id: String,
    story_id: String,
    highlighted_text: String,
    start_offset: i64,
    end_offset: i64,
    context_before: Option<String>,
    context_after: Option<String>,
    color: String,
    normalizer_version: i64,
    created_at: String,
    updated_at: String,
}

impl HighlightRow {
    fn into_highlight(self) -> Result<Highlight> {
        let offset = |value: i64| {
            usize::try_from(value).map_err(|_| {
                Error::InvalidRecord(format!("Negative offset {} on highlight {}", value, self.id))
            })
        };
        let start_offset = offset(self.start_offset)?;
        let end_offset = offset(self.end_offset)?;

        let color = self.color.parse().unwrap_or_else(|_| {
            tracing::warn!(highlight_id = %self.id, color = %self.color, "Unknown stored color");
            HighlightColor::default()
        });
        let normalizer_version = u32::try_from(self.normalizer_version).map_err(|_| {
            Error::InvalidRecord(format!(
                "Invalid normalizer version {} on highlight {}",
                self.normalizer_version, self.id
            ))
        })?;

        let created_at = DateTime::parse_from_rfc3339(&self.created_at)?.with_timezone(&Utc);
        let updated_at = DateTime::parse_from_rfc3339(&self.updated_at)?.with_timezone(&Utc);

        Ok(Highlight {
            id: self.id,
            story_id: self.story_id,
            user_id: self.user_id,
            highlighted_text: self.highlighted_text,
            start_offset,
            end_offset,
            context_before: self.context_before,
            context_after: self.context_after,
            color,
            normalizer_version,
            created_at,
            updated_at,
        })
    }
}
