//! Error types for the record store.
//!
//! [`StoreError`] is returned by every fallible store operation. Validation
//! failures (read-only, missing identifier) carry the store identity so log
//! lines from several stores stay distinguishable.

use recstore_core::CipherError;
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors that can occur during record store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// `SQLite` database error.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error (open failure or checkout timeout).
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    /// JSON serialization/deserialization error.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Filesystem error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Storage path could not be turned into a file pattern.
    #[error("invalid storage path pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// A file matched during reset could not be inspected.
    #[error("storage file error: {0}")]
    Glob(#[from] glob::GlobError),

    /// Stored ciphertext is not valid hex.
    #[error("hex decode error: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The injected cipher failed.
    #[error("cipher error: {0}")]
    Cipher(#[from] CipherError),

    /// Mutating operation on a read-only store.
    #[error("'{store}' failed to {operation} - instance is readonly")]
    ReadOnly {
        /// Store identity.
        store: String,
        /// Rejected operation.
        operation: &'static str,
    },

    /// Record failed validation before any write.
    #[error("'{store}' invalid record: {reason}")]
    InvalidRecord {
        /// Store identity.
        store: String,
        /// What was wrong.
        reason: String,
    },

    /// A store option could not be applied.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A per-call argument was rejected (unknown column, unsupported filter).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Encryption or decryption requested without a configured cipher.
    #[error("cipher is not configured")]
    MissingCipher,

    /// Encryption requested for an empty payload.
    #[error("payload is empty")]
    EmptyPayload,

    /// Schema creation failed.
    #[error("migration error: {message}")]
    Migration {
        /// What failed.
        message: String,
    },

    /// Operation on a store that is not initialized, or was closed or reset.
    #[error("store is not initialized")]
    NotInitialized,
}

impl StoreError {
    /// Whether this is a lock contention failure the caller may retry.
    pub fn is_busy(&self) -> bool {
        match self {
            Self::Sqlite(err) => matches!(
                err.sqlite_error_code(),
                Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
            ),
            Self::Pool(_) => true,
            _ => false,
        }
    }
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
