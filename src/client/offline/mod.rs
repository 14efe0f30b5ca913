//! # Offline Practice
//!
//! The two user-facing halves of offline support.
//!
//! ## Key Components
//!
//! - `cache_manager.rs`: download, evict and browse study set snapshots
//! - `recorder.rs`: write path for practice attempts, never blocked by connectivity
//!
//! Both share the [`LocalStore`](crate::client::local_db::LocalStore) handle
//! they are constructed with. Queued attempts leave through the
//! [sync engine](crate::client::sync::SyncEngine).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use studycache::client::local_db::LocalStore;
//! use studycache::client::offline::AttemptRecorder;
//!
//! # async fn example() -> Result<(), studycache::shared::PracticeError> {
//! let store = LocalStore::open_default().await?;
//! let recorder = AttemptRecorder::new(store);
//!
//! // Works the same with or without a connection
//! let local_id = recorder.record(1, 7, 101, "b", true).await?;
//! println!("queued attempt {}", local_id);
//! # Ok(())
//! # }
//! ```

pub mod cache_manager;
pub mod recorder;

pub use cache_manager::CacheManager;
pub use recorder::AttemptRecorder;
