//! StudyCache - Offline Practice Library
//!
//! StudyCache keeps selected study sets available without a network
//! connection, records practice attempts while disconnected, and hands those
//! attempts to the backend once connectivity returns.
//!
//! # Module Structure
//!
//! - **`shared`** - Types exchanged with the backend and stored locally
//!   - Study set snapshots, practice attempts, wire batches
//!   - Error types
//!   - Application configuration
//!
//! - **`client`** - Code that runs on the learner's device
//!   - SQLite-backed local store (`sqlx`)
//!   - Cache manager and attempt recorder
//!   - Reachability monitor, sync engine and background sync service
//!   - reqwest HTTP backend client
//!
//! # Usage
//!
//! ```rust,no_run
//! use studycache::client::config::Config;
//! use studycache::client::OfflinePractice;
//! use studycache::client::sync::{NetworkStatus, SyncConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load()?;
//! let practice = OfflinePractice::connect(&config).await?;
//!
//! let mut service = practice.sync_service(SyncConfig::from(config.app()));
//! service.start()?;
//!
//! // Feed connectivity changes from the host platform
//! practice.monitor().report(NetworkStatus::Offline);
//! practice.record(1, 7, 101, "b", true).await?;
//! practice.monitor().report(NetworkStatus::Online); // queued attempt is synced
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery
//!
//! Attempts are delivered at least once. Each carries an idempotency key so a
//! batch resent after an interrupted cycle can be recognised by the backend.
//!
//! # Error Handling
//!
//! - User-initiated operations return `PracticeResult<T>`
//! - Sync cycles never fail; they return a `SyncReport` with failure counts
//! - Error types live in `shared::error`

/// Shared types and data structures
pub mod shared;

/// Client-side offline engine
pub mod client;
