//! Cached Study Set Operations
//!
//! Insert-or-replace, lookup, listing and deletion of downloaded study sets.
//! The question list is stored as a single JSON column, so writing a
//! snapshot touches exactly one row.

use super::{schema, LocalStore, Result};
use crate::shared::error::StorageError;
use crate::shared::study_set::{CachedSet, QuestionSnapshot, SetId, SetKind};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

impl LocalStore {
    /// Insert or fully replace the snapshot for `set.set_id`
    ///
    /// Every column is overwritten; nothing from a previous snapshot survives.
    pub async fn put_cached_set(&self, set: &CachedSet) -> Result<()> {
        let questions = serde_json::to_string(&set.questions)?;

        sqlx::query(
            "INSERT OR REPLACE INTO cached_sets
                (set_id, title, subject, level, description, kind, questions, downloaded_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(set.set_id)
        .bind(&set.title)
        .bind(&set.subject)
        .bind(&set.level)
        .bind(&set.description)
        .bind(set.kind.as_str())
        .bind(&questions)
        .bind(set.downloaded_at)
        .execute(&self.pool)
        .await?;

        tracing::debug!(
            set_id = set.set_id,
            questions = set.questions.len(),
            "Stored cached study set"
        );
        Ok(())
    }

    /// Get a cached snapshot by set id
    pub async fn get_cached_set(&self, set_id: SetId) -> Result<Option<CachedSet>> {
        let row = sqlx::query(
            "SELECT set_id, title, subject, level, description, kind, questions, downloaded_at
             FROM cached_sets
             WHERE set_id = ?",
        )
        .bind(set_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| cached_set_from_row(&row)).transpose()
    }

    /// Whether a snapshot exists for `set_id`
    pub async fn has_cached_set(&self, set_id: SetId) -> Result<bool> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM cached_sets WHERE set_id = ?")
            .bind(set_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// All cached snapshots, most recently downloaded first
    pub async fn list_cached_sets(&self) -> Result<Vec<CachedSet>> {
        let rows = sqlx::query(
            "SELECT set_id, title, subject, level, description, kind, questions, downloaded_at
             FROM cached_sets
             ORDER BY downloaded_at DESC, set_id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(cached_set_from_row).collect()
    }

    /// Remove a snapshot; removing an absent set is not an error
    ///
    /// Returns whether a row was deleted.
    pub async fn delete_cached_set(&self, set_id: SetId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cached_sets WHERE set_id = ?")
            .bind(set_id)
            .execute(&self.pool)
            .await?;

        let removed = result.rows_affected() > 0;
        tracing::debug!(set_id, removed, "Deleted cached study set");
        Ok(removed)
    }
}

fn cached_set_from_row(row: &SqliteRow) -> Result<CachedSet> {
    let kind: String = row.try_get("kind")?;
    let kind: SetKind = kind
        .parse()
        .map_err(|e| StorageError::corrupt(schema::CACHED_SETS_TABLE, e))?;
    let questions: String = row.try_get("questions")?;
    let questions: Vec<QuestionSnapshot> = serde_json::from_str(&questions)?;
    let downloaded_at: DateTime<Utc> = row.try_get("downloaded_at")?;

    Ok(CachedSet {
        set_id: row.try_get("set_id")?,
        title: row.try_get("title")?,
        subject: row.try_get("subject")?,
        level: row.try_get("level")?,
        description: row.try_get("description")?,
        kind,
        questions,
        downloaded_at,
    })
}
