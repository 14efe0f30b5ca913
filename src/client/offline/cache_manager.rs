//! # Offline Set Cache
//!
//! Downloads study sets into the local store and evicts them again.
//!
//! ## Guarantees
//!
//! - **All or nothing**: metadata and questions are both fetched before the
//!   single-row write, so a failed fetch never leaves a partial snapshot
//! - **Refresh on re-download**: a second download replaces the whole snapshot
//! - **Offline reads**: `is_downloaded`, `get` and `list_downloaded` never
//!   touch the network
//! - **Eviction independence**: `remove` leaves queued attempts for the set alone
//!
//! Download and remove of the same set are not serialised against each other;
//! whichever store write lands last wins.

use crate::client::local_db::LocalStore;
use crate::client::remote::StudySetSource;
use crate::client::sync::network_monitor::ReachabilityMonitor;
use crate::shared::error::{PracticeError, PracticeResult, TransportError};
use crate::shared::study_set::{CachedSet, SetId};
use futures_util::future::try_join;
use std::sync::Arc;

/// Moves study sets between the backend and the local store
#[derive(Clone)]
pub struct CacheManager {
    store: LocalStore,
    source: Arc<dyn StudySetSource>,
    monitor: ReachabilityMonitor,
}

impl std::fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheManager")
            .field("store", &self.store)
            .field("monitor", &self.monitor)
            .finish_non_exhaustive()
    }
}

impl CacheManager {
    pub fn new(store: LocalStore, source: Arc<dyn StudySetSource>, monitor: ReachabilityMonitor) -> Self {
        Self {
            store,
            source,
            monitor,
        }
    }

    /// Download a set and its questions for offline use
    ///
    /// Fails with [`PracticeError::Offline`] without calling the backend when
    /// the monitor reports offline.
    pub async fn download(&self, set_id: SetId) -> PracticeResult<CachedSet> {
        if !self.monitor.is_online() {
            return Err(PracticeError::offline("download"));
        }

        tracing::debug!(set_id, "Downloading study set");
        let (meta, questions) = try_join(
            self.source.fetch_study_set(set_id),
            self.source.fetch_questions(set_id),
        )
        .await?;

        if meta.id != set_id {
            return Err(TransportError::decode(format!(
                "requested study set {} but backend returned {}",
                set_id, meta.id
            ))
            .into());
        }

        let set = CachedSet::from_remote(meta, questions, chrono::Utc::now());
        self.store.put_cached_set(&set).await?;
        tracing::info!(set_id, questions = set.question_count(), "Study set available offline");

        if let Err(e) = self.source.set_offline_flag(set_id, true).await {
            tracing::warn!(set_id, error = %e, "Could not mark study set offline on the backend");
        }

        Ok(set)
    }

    /// Evict a downloaded set; removing an absent set is not an error
    pub async fn remove(&self, set_id: SetId) -> PracticeResult<()> {
        let removed = self.store.delete_cached_set(set_id).await?;
        if removed {
            tracing::info!(set_id, "Removed offline study set");
        }

        if self.monitor.is_online() {
            if let Err(e) = self.source.set_offline_flag(set_id, false).await {
                tracing::warn!(set_id, error = %e, "Could not clear offline flag on the backend");
            }
        }
        Ok(())
    }

    pub async fn is_downloaded(&self, set_id: SetId) -> PracticeResult<bool> {
        Ok(self.store.has_cached_set(set_id).await?)
    }

    /// Cached snapshot for offline practice
    pub async fn get(&self, set_id: SetId) -> PracticeResult<Option<CachedSet>> {
        Ok(self.store.get_cached_set(set_id).await?)
    }

    /// Every downloaded set, newest download first
    pub async fn list_downloaded(&self) -> PracticeResult<Vec<CachedSet>> {
        Ok(self.store.list_cached_sets().await?)
    }
}
