//! # Offline Practice Facade
//!
//! The surface the UI talks to. One [`OfflinePractice`] owns the shared
//! store handle and wires it into the cache manager, the attempt recorder
//! and the sync engine.
//!
//! Every operation returns an explicit result; being offline while
//! downloading comes back as [`PracticeError::Offline`], an empty queue as a
//! zero [`SyncReport`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studycache::client::config::Config;
//! use studycache::client::practice::OfflinePractice;
//!
//! # async fn example() -> Result<(), studycache::shared::PracticeError> {
//! let practice = OfflinePractice::connect(&Config::load().unwrap_or_default()).await?;
//!
//! if practice.is_online() && !practice.is_downloaded(7).await? {
//!     practice.download(7).await?;
//! }
//! practice.record(1, 7, 101, "b", true).await?;
//!
//! let report = practice.sync().await;
//! println!("{} synced, {} pending", report.synced, practice.pending_count().await?);
//! # Ok(())
//! # }
//! ```
//!
//! [`PracticeError::Offline`]: crate::shared::error::PracticeError::Offline

use crate::client::api_client::HttpBackend;
use crate::client::config::Config;
use crate::client::local_db::{LocalStore, StoreCell, StoreLocation};
use crate::client::offline::{AttemptRecorder, CacheManager};
use crate::client::remote::{AttemptSink, StudySetSource};
use crate::client::sync::{ReachabilityMonitor, SyncConfig, SyncEngine, SyncReport, SyncService};
use crate::shared::attempt::{AnswerValue, LocalId, UserId};
use crate::shared::error::PracticeResult;
use crate::shared::study_set::{CachedSet, QuestionId, SetId};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct OfflinePractice {
    store: LocalStore,
    monitor: ReachabilityMonitor,
    cache: CacheManager,
    recorder: AttemptRecorder,
    engine: Arc<SyncEngine>,
}

impl OfflinePractice {
    /// Wire the components around one backend implementing both contracts
    pub fn new<B>(store: LocalStore, backend: Arc<B>, monitor: ReachabilityMonitor) -> Self
    where
        B: StudySetSource + AttemptSink + 'static,
    {
        let source: Arc<dyn StudySetSource> = backend.clone();
        let sink: Arc<dyn AttemptSink> = backend;
        Self::with_parts(store, source, sink, monitor)
    }

    pub fn with_parts(
        store: LocalStore,
        source: Arc<dyn StudySetSource>,
        sink: Arc<dyn AttemptSink>,
        monitor: ReachabilityMonitor,
    ) -> Self {
        Self {
            cache: CacheManager::new(store.clone(), source, monitor.clone()),
            recorder: AttemptRecorder::new(store.clone()),
            engine: Arc::new(SyncEngine::new(store.clone(), sink)),
            store,
            monitor,
        }
    }

    /// Open the configured store and talk to the configured backend over HTTP
    ///
    /// Opens a new pool on every call. Callers building more than one facade
    /// per process should go through [`OfflinePractice::connect_shared`].
    pub async fn connect(config: &Config) -> PracticeResult<Self> {
        let location = StoreLocation::from(config.database_path().map(Path::to_path_buf));
        let store = location.open().await?;
        Self::over_http(config, store)
    }

    /// Like [`OfflinePractice::connect`], but takes the store from `cell`
    ///
    /// The cell's location wins over the database path in `config`.
    pub async fn connect_shared(config: &Config, cell: &StoreCell) -> PracticeResult<Self> {
        let store = cell.get().await?.clone();
        Self::over_http(config, store)
    }

    fn over_http(config: &Config, store: LocalStore) -> PracticeResult<Self> {
        let backend = Arc::new(HttpBackend::new(config.app().clone())?);
        tracing::info!(server = config.server_url(), "Offline practice ready");
        Ok(Self::new(store, backend, ReachabilityMonitor::default()))
    }

    pub async fn is_downloaded(&self, set_id: SetId) -> PracticeResult<bool> {
        self.cache.is_downloaded(set_id).await
    }

    pub async fn download(&self, set_id: SetId) -> PracticeResult<CachedSet> {
        self.cache.download(set_id).await
    }

    pub async fn remove(&self, set_id: SetId) -> PracticeResult<()> {
        self.cache.remove(set_id).await
    }

    pub async fn list_downloaded(&self) -> PracticeResult<Vec<CachedSet>> {
        self.cache.list_downloaded().await
    }

    /// Snapshot of a downloaded set, for practising without a connection
    pub async fn get_downloaded(&self, set_id: SetId) -> PracticeResult<Option<CachedSet>> {
        self.cache.get(set_id).await
    }

    pub async fn record(
        &self,
        user_id: UserId,
        set_id: SetId,
        question_id: QuestionId,
        answer: impl Into<AnswerValue>,
        is_correct: bool,
    ) -> PracticeResult<LocalId> {
        self.recorder
            .record(user_id, set_id, question_id, answer, is_correct)
            .await
    }

    pub async fn undo(&self, local_id: LocalId) -> PracticeResult<bool> {
        self.recorder.undo(local_id).await
    }

    /// Drain the attempt queue now
    pub async fn sync(&self) -> SyncReport {
        self.engine.sync().await
    }

    pub fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    pub async fn pending_count(&self) -> PracticeResult<u64> {
        self.recorder.pending_count().await
    }

    /// Handle for feeding platform connectivity signals
    pub fn monitor(&self) -> &ReachabilityMonitor {
        &self.monitor
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Background service that syncs on reconnect and on the configured interval
    pub fn sync_service(&self, config: SyncConfig) -> SyncService {
        SyncService::new(Arc::clone(&self.engine), self.monitor.clone(), config)
    }
}
