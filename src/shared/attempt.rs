//! Practice Attempt Types
//!
//! Records written by the practice flow and the wire shape used when they
//! are sent to the backend in a batch.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::shared::error::SharedError;
use crate::shared::study_set::{QuestionId, SetId};

/// Auto-assigned, never reused local sequence number of an attempt
pub type LocalId = i64;

/// Identifier of the learner on the backend
pub type UserId = i64;

/// The learner's response.
///
/// Kept opaque: the practice view has already scored it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl AnswerValue {
    /// Reject values that cannot round-trip through JSON
    ///
    /// `NaN` and infinities serialize as `null`, which no variant decodes.
    pub fn validate(&self) -> Result<(), SharedError> {
        match self {
            AnswerValue::Number(n) if !n.is_finite() => Err(SharedError::validation(
                "answer",
                format!("numeric answer must be finite, got {}", n),
            )),
            _ => Ok(()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        AnswerValue::Text(value)
    }
}

impl From<bool> for AnswerValue {
    fn from(value: bool) -> Self {
        AnswerValue::Bool(value)
    }
}

impl From<f64> for AnswerValue {
    fn from(value: f64) -> Self {
        AnswerValue::Number(value)
    }
}

impl From<i64> for AnswerValue {
    fn from(value: i64) -> Self {
        AnswerValue::Number(value as f64)
    }
}

/// Synchronization state of a locally recorded attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    /// Waiting to be transmitted
    Pending,
    /// Accepted by the backend, eligible for purge
    Synced,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Pending => "pending",
            SyncState::Synced => "synced",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncState {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SyncState::Pending),
            "synced" => Ok(SyncState::Synced),
            other => Err(SharedError::validation(
                "sync_state",
                format!("unknown sync state '{}'", other),
            )),
        }
    }
}

/// An attempt about to be appended to the local queue
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub user_id: UserId,
    pub set_id: SetId,
    pub question_id: QuestionId,
    pub answer: AnswerValue,
    pub is_correct: bool,
    pub recorded_at: DateTime<Utc>,
}

/// One locally recorded practice result
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAttempt {
    pub local_id: LocalId,
    /// Client-generated key sent with the attempt so resends can be recognised
    pub idempotency_key: Uuid,
    pub user_id: UserId,
    pub set_id: SetId,
    pub question_id: QuestionId,
    pub answer: AnswerValue,
    pub is_correct: bool,
    pub recorded_at: DateTime<Utc>,
    pub sync_state: SyncState,
}

impl PendingAttempt {
    /// Wire representation used by the batch ingestion call
    pub fn to_submission(&self) -> AttemptSubmission {
        AttemptSubmission {
            set_id: self.set_id,
            question_id: self.question_id,
            is_correct: self.is_correct,
            answer: self.answer.clone(),
            recorded_at: self.recorded_at,
            idempotency_key: self.idempotency_key,
        }
    }
}

/// One entry of the batch sent to `POST /study-sets/attempts/batch`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptSubmission {
    pub set_id: SetId,
    pub question_id: QuestionId,
    pub is_correct: bool,
    pub answer: AnswerValue,
    #[serde(rename = "timestamp")]
    pub recorded_at: DateTime<Utc>,
    pub idempotency_key: Uuid,
}

/// Request body of the batch ingestion call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttemptBatch {
    pub attempts: Vec<AttemptSubmission>,
}
