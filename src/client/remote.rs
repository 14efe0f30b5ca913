//! Remote Collaborators
//!
//! The two backend contracts the offline engine consumes. [`HttpBackend`]
//! implements both over HTTP; tests substitute in-memory stubs.
//!
//! [`HttpBackend`]: crate::client::api_client::HttpBackend

use crate::shared::attempt::AttemptBatch;
use crate::shared::error::TransportError;
use crate::shared::study_set::{QuestionSnapshot, SetId, StudySetMeta};
use async_trait::async_trait;

/// Study set retrieval
#[async_trait]
pub trait StudySetSource: Send + Sync {
    /// Metadata of one study set
    async fn fetch_study_set(&self, set_id: SetId) -> Result<StudySetMeta, TransportError>;

    /// Full ordered question list of one study set
    async fn fetch_questions(&self, set_id: SetId) -> Result<Vec<QuestionSnapshot>, TransportError>;

    /// Tell the backend whether the learner keeps this set offline
    async fn set_offline_flag(&self, set_id: SetId, offline: bool) -> Result<(), TransportError>;
}

/// Batch attempt ingestion
///
/// A call either accepts the whole batch or fails; partial acceptance is not
/// modelled.
#[async_trait]
pub trait AttemptSink: Send + Sync {
    async fn submit_attempts(&self, batch: &AttemptBatch) -> Result<(), TransportError>;
}
