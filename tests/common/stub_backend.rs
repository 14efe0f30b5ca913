//! In-memory backend for integration tests
//!
//! Implements both backend contracts. Sets are published into it, failures
//! are switched on with flags, and every accepted batch is recorded.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use studycache::client::remote::{AttemptSink, StudySetSource};
use studycache::shared::{
    AttemptBatch, AttemptSubmission, QuestionSnapshot, SetId, StudySetMeta, TransportError,
};

#[derive(Default)]
pub struct StubBackend {
    sets: Mutex<HashMap<SetId, (StudySetMeta, Vec<QuestionSnapshot>)>>,
    batches: Mutex<Vec<AttemptBatch>>,
    offline_flags: Mutex<Vec<(SetId, bool)>>,
    pub fail_questions: AtomicBool,
    pub fail_batches: AtomicBool,
    pub batch_calls: AtomicUsize,
}

impl StubBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a set available, replacing any earlier content
    pub fn publish(&self, meta: StudySetMeta, questions: Vec<QuestionSnapshot>) {
        self.sets.lock().unwrap().insert(meta.id, (meta, questions));
    }

    pub fn set_batches_failing(&self, failing: bool) {
        self.fail_batches.store(failing, Ordering::SeqCst);
    }

    pub fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    /// Every accepted batch, in arrival order
    pub fn batches(&self) -> Vec<AttemptBatch> {
        self.batches.lock().unwrap().clone()
    }

    /// All accepted submissions flattened across batches
    pub fn received(&self) -> Vec<AttemptSubmission> {
        self.batches()
            .into_iter()
            .flat_map(|batch| batch.attempts)
            .collect()
    }

    pub fn offline_flags(&self) -> Vec<(SetId, bool)> {
        self.offline_flags.lock().unwrap().clone()
    }
}

fn not_found() -> TransportError {
    TransportError::status(404, "Study set not found")
}

#[async_trait]
impl StudySetSource for StubBackend {
    async fn fetch_study_set(&self, set_id: SetId) -> Result<StudySetMeta, TransportError> {
        self.sets
            .lock()
            .unwrap()
            .get(&set_id)
            .map(|(meta, _)| meta.clone())
            .ok_or_else(not_found)
    }

    async fn fetch_questions(&self, set_id: SetId) -> Result<Vec<QuestionSnapshot>, TransportError> {
        if self.fail_questions.load(Ordering::SeqCst) {
            return Err(TransportError::status(502, "Bad Gateway"));
        }
        self.sets
            .lock()
            .unwrap()
            .get(&set_id)
            .map(|(_, questions)| questions.clone())
            .ok_or_else(not_found)
    }

    async fn set_offline_flag(&self, set_id: SetId, offline: bool) -> Result<(), TransportError> {
        self.offline_flags.lock().unwrap().push((set_id, offline));
        Ok(())
    }
}

#[async_trait]
impl AttemptSink for StubBackend {
    async fn submit_attempts(&self, batch: &AttemptBatch) -> Result<(), TransportError> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_batches.load(Ordering::SeqCst) {
            return Err(TransportError::status(503, "Service Unavailable"));
        }
        self.batches.lock().unwrap().push(batch.clone());
        Ok(())
    }
}
