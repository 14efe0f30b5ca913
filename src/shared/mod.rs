//! Shared Module
//!
//! Types and data structures shared by every part of the offline engine and
//! exchanged with the backend over HTTP.
//!
//! # Overview
//!
//! Nothing in here touches the database or the network. The types are plain
//! data with serde derives, so they can be stored as JSON columns and sent as
//! request bodies without conversion layers.

/// Study set metadata and offline snapshots
pub mod study_set;

/// Practice attempts and their wire format
pub mod attempt;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use attempt::{
    AnswerValue, AttemptBatch, AttemptSubmission, LocalId, NewAttempt, PendingAttempt, SyncState,
    UserId,
};
pub use config::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};
pub use error::{PracticeError, PracticeResult, SharedError, StorageError, TransportError};
pub use study_set::{CachedSet, QuestionId, QuestionSnapshot, SetId, SetKind, StudySetMeta};
