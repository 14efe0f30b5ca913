//! # Attempt Queue Operations
//!
//! Append-only queue of practice attempts waiting for the backend.
//!
//! ## Lifecycle
//!
//! - `append_pending_attempt` assigns a `local_id` (never reused, even after
//!   purge) and stores the row as `pending`
//! - `mark_synced` flips rows to `synced` once the backend accepted them
//! - `purge_synced` deletes every `synced` row
//!
//! `mark_synced` and `purge_synced` each run in one transaction, so a
//! crash leaves either all or none of their rows changed.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studycache::client::local_db::{AttemptFilter, LocalStore};
//! use studycache::shared::{AnswerValue, NewAttempt};
//!
//! # async fn example(store: LocalStore) -> Result<(), studycache::shared::StorageError> {
//! let local_id = store
//!     .append_pending_attempt(&NewAttempt {
//!         user_id: 1,
//!         set_id: 7,
//!         question_id: 101,
//!         answer: AnswerValue::from("4"),
//!         is_correct: true,
//!         recorded_at: chrono::Utc::now(),
//!     })
//!     .await?;
//!
//! let pending = store.list_pending_attempts(&AttemptFilter::default()).await?;
//! store.mark_synced(&[local_id]).await?;
//! store.purge_synced().await?;
//! # Ok(())
//! # }
//! ```

use super::{schema, LocalStore, Result};
use crate::shared::attempt::{AnswerValue, LocalId, NewAttempt, PendingAttempt, SyncState, UserId};
use crate::shared::error::{SharedError, StorageError};
use crate::shared::study_set::SetId;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

/// Narrows `list_pending_attempts`; empty filter matches every pending row
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttemptFilter {
    pub user_id: Option<UserId>,
    pub set_id: Option<SetId>,
}

impl AttemptFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            set_id: None,
        }
    }

    pub fn for_set(set_id: SetId) -> Self {
        Self {
            user_id: None,
            set_id: Some(set_id),
        }
    }
}

const ATTEMPT_COLUMNS: &str = "local_id, idempotency_key, user_id, set_id, question_id, \
                               answer, is_correct, recorded_at, sync_state";

impl LocalStore {
    /// Append an attempt as `pending` and return its assigned `local_id`
    ///
    /// Non-finite numeric answers are refused; they could never be read back.
    pub async fn append_pending_attempt(&self, attempt: &NewAttempt) -> Result<LocalId> {
        attempt.answer.validate().map_err(StorageError::Invalid)?;
        let answer = serde_json::to_string(&attempt.answer)?;
        let idempotency_key = Uuid::new_v4();

        let result = sqlx::query(
            "INSERT INTO pending_attempts
                (idempotency_key, user_id, set_id, question_id, answer, is_correct, recorded_at, sync_state)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(idempotency_key.to_string())
        .bind(attempt.user_id)
        .bind(attempt.set_id)
        .bind(attempt.question_id)
        .bind(&answer)
        .bind(attempt.is_correct)
        .bind(attempt.recorded_at)
        .bind(SyncState::Pending.as_str())
        .execute(&self.pool)
        .await?;

        let local_id = result.last_insert_rowid();
        tracing::debug!(
            local_id,
            set_id = attempt.set_id,
            question_id = attempt.question_id,
            "Queued practice attempt"
        );
        Ok(local_id)
    }

    /// Pending attempts matching `filter`, in recording order
    ///
    /// A row that cannot be decoded is logged and left out so the rest of the
    /// queue still reaches the backend. It stays in the table and keeps
    /// counting as pending.
    pub async fn list_pending_attempts(&self, filter: &AttemptFilter) -> Result<Vec<PendingAttempt>> {
        let mut query: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT ");
        query.push(ATTEMPT_COLUMNS);
        query.push(" FROM pending_attempts WHERE sync_state = ");
        query.push_bind(SyncState::Pending.as_str());
        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ").push_bind(user_id);
        }
        if let Some(set_id) = filter.set_id {
            query.push(" AND set_id = ").push_bind(set_id);
        }
        query.push(" ORDER BY local_id ASC");

        let rows = query.build().fetch_all(&self.pool).await?;
        let mut attempts = Vec::with_capacity(rows.len());
        for row in &rows {
            match attempt_from_row(row) {
                Ok(attempt) => attempts.push(attempt),
                Err(e) => {
                    let local_id: Option<LocalId> = row.try_get("local_id").ok();
                    tracing::error!(?local_id, error = %e, "Skipping undecodable pending attempt");
                }
            }
        }
        Ok(attempts)
    }

    /// Look up a single attempt regardless of its sync state
    pub async fn get_attempt(&self, local_id: LocalId) -> Result<Option<PendingAttempt>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM pending_attempts WHERE local_id = ?",
            ATTEMPT_COLUMNS
        ))
        .bind(local_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| attempt_from_row(&row)).transpose()
    }

    /// Number of attempts still waiting for transmission
    pub async fn count_pending(&self) -> Result<u64> {
        let count: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pending_attempts WHERE sync_state = ?")
                .bind(SyncState::Pending.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count.0 as u64)
    }

    /// Mark the given attempts as accepted by the backend
    ///
    /// Ids that no longer exist are ignored. Returns the number of rows that
    /// moved from `pending` to `synced`.
    pub async fn mark_synced(&self, local_ids: &[LocalId]) -> Result<u64> {
        if local_ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut updated = 0;
        for &local_id in local_ids {
            let result = sqlx::query(
                "UPDATE pending_attempts SET sync_state = ? WHERE local_id = ? AND sync_state = ?",
            )
            .bind(SyncState::Synced.as_str())
            .bind(local_id)
            .bind(SyncState::Pending.as_str())
            .execute(&mut *tx)
            .await?;
            updated += result.rows_affected();
        }
        tx.commit().await?;

        tracing::debug!(requested = local_ids.len(), updated, "Marked attempts synced");
        Ok(updated)
    }

    /// Delete every attempt already accepted by the backend
    pub async fn purge_synced(&self) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM pending_attempts WHERE sync_state = ?")
            .bind(SyncState::Synced.as_str())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        let purged = result.rows_affected();
        if purged > 0 {
            tracing::debug!(purged, "Purged synced attempts");
        }
        Ok(purged)
    }

    /// Delete an attempt that has not been transmitted yet
    ///
    /// Synced rows are left alone: the backend already has them.
    pub async fn delete_pending_attempt(&self, local_id: LocalId) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM pending_attempts WHERE local_id = ? AND sync_state = ?")
                .bind(local_id)
                .bind(SyncState::Pending.as_str())
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn attempt_from_row(row: &SqliteRow) -> Result<PendingAttempt> {
    let key: String = row.try_get("idempotency_key")?;
    let idempotency_key = Uuid::parse_str(&key).map_err(|e| {
        StorageError::corrupt(
            schema::PENDING_ATTEMPTS_TABLE,
            SharedError::validation("idempotency_key", e.to_string()),
        )
    })?;
    let sync_state: String = row.try_get("sync_state")?;
    let sync_state: SyncState = sync_state
        .parse()
        .map_err(|e| StorageError::corrupt(schema::PENDING_ATTEMPTS_TABLE, e))?;
    let answer: String = row.try_get("answer")?;
    let answer: AnswerValue = serde_json::from_str(&answer)?;

    Ok(PendingAttempt {
        local_id: row.try_get("local_id")?,
        idempotency_key,
        user_id: row.try_get("user_id")?,
        set_id: row.try_get("set_id")?,
        question_id: row.try_get("question_id")?,
        answer,
        is_correct: row.try_get("is_correct")?,
        recorded_at: row.try_get("recorded_at")?,
        sync_state,
    })
}
