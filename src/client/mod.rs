//! Client Module
//!
//! Everything that runs on the learner's device: the local SQLite store,
//! offline caching and recording, attempt synchronization and the HTTP
//! backend client.

/// HTTP implementation of the backend contracts
pub mod api_client;

/// Client configuration layering (env, TOML file, defaults)
pub mod config;

/// Local SQLite store
pub mod local_db;

/// Set cache and attempt recorder
pub mod offline;

/// UI-facing facade
pub mod practice;

/// Backend contracts consumed by the offline engine
pub mod remote;

/// Reachability, sync engine and background triggers
pub mod sync;

pub use practice::OfflinePractice;
