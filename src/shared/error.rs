//! Shared Error Types
//!
//! Error types for the offline cache and attempt synchronization engine.
//!
//! # Error Categories
//!
//! - [`StorageError`] - the local store is unavailable or rejected a write
//! - [`TransportError`] - a backend call failed (network, status, decoding)
//! - [`PracticeError`] - what user-initiated actions return: storage,
//!   offline-while-connectivity-required, or transport failures
//! - [`SharedError`] - validation and serialization of shared types
//!
//! Sync cycles never return these to their caller; they are logged and
//! folded into the failure count of the cycle report.
//!
//! # Usage
//!
//! ```rust
//! use studycache::shared::error::PracticeError;
//!
//! let error = PracticeError::offline("download");
//! assert!(error.is_offline());
//! ```
use thiserror::Error;

/// Validation and serialization errors on shared types
#[derive(Debug, Error, Clone)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}

/// The local store could not complete an operation.
///
/// A failed operation leaves no partial rows behind.
#[derive(Debug, Error)]
pub enum StorageError {
    /// SQLite rejected the statement or the connection is gone
    #[error("local database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored JSON column could not be encoded or decoded
    #[error("could not encode stored value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The data directory could not be prepared
    #[error("local store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The value was refused before it reached the database
    #[error("refused to store invalid value: {0}")]
    Invalid(#[source] SharedError),

    /// A row holds a value this version does not understand
    #[error("corrupt row in {table}: {source}")]
    Corrupt {
        table: &'static str,
        #[source]
        source: SharedError,
    },
}

impl StorageError {
    pub(crate) fn corrupt(table: &'static str, source: SharedError) -> Self {
        Self::Corrupt { table, source }
    }
}

/// A call to the remote backend failed
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS or timeout failure
    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status
    #[error("request failed with status {status}: {detail}")]
    Status { status: u16, detail: String },

    /// The backend answered with something we could not use
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(status: u16, detail: impl Into<String>) -> Self {
        Self::Status {
            status,
            detail: detail.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }
}

/// Errors returned by user-initiated operations (download, remove, record)
#[derive(Debug, Error)]
pub enum PracticeError {
    /// Could not save or read local data; the user may retry
    #[error("could not access offline storage: {0}")]
    Storage(#[from] StorageError),

    /// The caller passed a value that cannot be recorded
    #[error("invalid input: {0}")]
    Invalid(#[from] SharedError),

    /// The action needs connectivity and the device is offline
    #[error("{action} requires a network connection")]
    Offline { action: &'static str },

    /// The backend could not be reached or refused the request
    #[error("backend request failed: {0}")]
    Transport(#[from] TransportError),
}

impl PracticeError {
    pub fn offline(action: &'static str) -> Self {
        Self::Offline { action }
    }

    /// Whether the failure only means "try again when online"
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }
}

/// Result type for user-initiated operations
pub type PracticeResult<T> = Result<T, PracticeError>;
