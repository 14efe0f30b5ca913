//! Study Set Snapshots
//!
//! Types describing a study set as the backend returns it and as it is
//! frozen into the local store for offline practice.
//!
//! A [`CachedSet`] is a copy, not a reference: edits made on the server after
//! the download do not show up locally until the set is downloaded again.
//!
//! # Example
//! ```rust
//! use studycache::shared::study_set::SetKind;
//!
//! let kind: SetKind = "Problem set".parse().unwrap();
//! assert_eq!(kind, SetKind::ProblemSet);
//! assert_eq!(kind.to_string(), "Problem set");
//! ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::shared::error::SharedError;

/// Identifier of a study set on the backend.
pub type SetId = i64;

/// Identifier of a question on the backend.
pub type QuestionId = i64;

/// The kind of study set.
///
/// Serialized with the backend's wording so metadata decodes directly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SetKind {
    /// Term/definition cards
    Flashcards,
    /// Multiple choice, true/false and short answer questions
    Quiz,
    /// Worked problems with solutions
    #[serde(rename = "Problem set")]
    ProblemSet,
}

impl SetKind {
    /// Backend wording for this kind
    pub fn as_str(&self) -> &'static str {
        match self {
            SetKind::Flashcards => "Flashcards",
            SetKind::Quiz => "Quiz",
            SetKind::ProblemSet => "Problem set",
        }
    }
}

impl fmt::Display for SetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SetKind {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Flashcards" => Ok(SetKind::Flashcards),
            "Quiz" => Ok(SetKind::Quiz),
            "Problem set" => Ok(SetKind::ProblemSet),
            other => Err(SharedError::validation(
                "kind",
                format!("unknown study set kind '{}'", other),
            )),
        }
    }
}

/// Study set metadata as returned by `GET /study-sets/{id}`.
///
/// The backend sends more fields (owner, tags, mastery, ...); they are not
/// part of the offline snapshot and are ignored while decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StudySetMeta {
    pub id: SetId,
    pub title: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub kind: SetKind,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A frozen copy of one question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionSnapshot {
    pub id: QuestionId,
    /// Question type as named by the backend (`multiple_choice`, `true_false`,
    /// `short_answer`, `flashcard`, ...)
    #[serde(rename = "type")]
    pub question_type: String,
    /// Prompt text
    pub content: String,
    /// Correct answer in the backend's string encoding
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
}

/// Local snapshot of a study set and its questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CachedSet {
    pub set_id: SetId,
    pub title: String,
    pub subject: Option<String>,
    pub level: Option<String>,
    pub description: Option<String>,
    pub kind: SetKind,
    /// Questions in backend order
    pub questions: Vec<QuestionSnapshot>,
    pub downloaded_at: DateTime<Utc>,
}

impl CachedSet {
    /// Build a snapshot from freshly fetched metadata and questions
    pub fn from_remote(
        meta: StudySetMeta,
        questions: Vec<QuestionSnapshot>,
        downloaded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            set_id: meta.id,
            title: meta.title,
            subject: meta.subject,
            level: meta.level,
            description: meta.description,
            kind: meta.kind,
            questions,
            downloaded_at,
        }
    }

    /// Number of questions in the snapshot
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// Look up a question by id
    pub fn question(&self, question_id: QuestionId) -> Option<&QuestionSnapshot> {
        self.questions.iter().find(|q| q.id == question_id)
    }
}
