//! Practice write path.
//!
//! Every answer is appended to the local queue, online or not; the sync
//! engine takes it from there.

use crate::client::local_db::LocalStore;
use crate::shared::attempt::{AnswerValue, LocalId, NewAttempt, UserId};
use crate::shared::error::PracticeResult;
use crate::shared::study_set::{QuestionId, SetId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct AttemptRecorder {
    store: LocalStore,
}

impl AttemptRecorder {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// Queue one answered question, stamped with the client clock
    pub async fn record(
        &self,
        user_id: UserId,
        set_id: SetId,
        question_id: QuestionId,
        answer: impl Into<AnswerValue>,
        is_correct: bool,
    ) -> PracticeResult<LocalId> {
        self.record_at(user_id, set_id, question_id, answer, is_correct, Utc::now())
            .await
    }

    /// Queue one answered question with an explicit answer time
    ///
    /// Fails with [`PracticeError::Invalid`] for a non-finite numeric answer.
    ///
    /// [`PracticeError::Invalid`]: crate::shared::error::PracticeError::Invalid
    pub async fn record_at(
        &self,
        user_id: UserId,
        set_id: SetId,
        question_id: QuestionId,
        answer: impl Into<AnswerValue>,
        is_correct: bool,
        recorded_at: DateTime<Utc>,
    ) -> PracticeResult<LocalId> {
        let answer = answer.into();
        answer.validate()?;
        let attempt = NewAttempt {
            user_id,
            set_id,
            question_id,
            answer,
            is_correct,
            recorded_at,
        };
        let local_id = self.store.append_pending_attempt(&attempt).await?;
        tracing::debug!(local_id, set_id, question_id, is_correct, "Recorded attempt");
        Ok(local_id)
    }

    /// Withdraw an attempt that has not been synced yet
    ///
    /// Returns `false` when the attempt is unknown or already transmitted.
    pub async fn undo(&self, local_id: LocalId) -> PracticeResult<bool> {
        Ok(self.store.delete_pending_attempt(local_id).await?)
    }

    pub async fn pending_count(&self) -> PracticeResult<u64> {
        Ok(self.store.count_pending().await?)
    }
}
