//! Single-connection `SQLite` pool.
//!
//! `SQLite` tolerates neither concurrent writers nor, in practice, one writer
//! alongside readers on separate connections, so the pool is pinned to one
//! physical connection. Concurrent callers queue in [`Pool::get`] until the
//! connection is returned or the checkout timeout expires.
//!
//! The [`PragmaCustomizer`] applies durability pragmas when the connection is
//! opened; a failure there fails the pool build.

use std::path::Path;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use tracing::info;

use crate::config::ConnectionConfig;
use crate::errors::{Result, StoreError};

/// Alias for the connection pool type.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Alias for a pooled connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// `SQLite` pragma customizer that runs when the connection is opened.
#[derive(Debug)]
struct PragmaCustomizer {
    busy_timeout_ms: u32,
}

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for PragmaCustomizer {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = DELETE;\
             PRAGMA synchronous = FULL;\
             PRAGMA foreign_keys = ON;\
             PRAGMA busy_timeout = {};",
            self.busy_timeout_ms
        ))?;
        Ok(())
    }
}

/// Open (or create) the database at `path` behind a one-connection pool.
pub fn connect(path: &Path, config: &ConnectionConfig) -> Result<ConnectionPool> {
    if config.checkout_timeout_ms == 0 {
        return Err(StoreError::InvalidOption(
            "checkout timeout must be positive".into(),
        ));
    }
    let manager = SqliteConnectionManager::file(path);
    let pool = Pool::builder()
        .max_size(1)
        .min_idle(Some(1))
        .connection_timeout(Duration::from_millis(config.checkout_timeout_ms))
        .connection_customizer(Box::new(PragmaCustomizer {
            busy_timeout_ms: config.busy_timeout_ms,
        }))
        .build(manager)?;
    info!(
        path = %path.display(),
        busy_timeout_ms = config.busy_timeout_ms,
        "sqlite connection opened"
    );
    Ok(pool)
}

/// Read back the pragmas applied to a connection.
pub fn verify_pragmas(conn: &Connection) -> Result<PragmaState> {
    let journal_mode: String = conn.query_row("PRAGMA journal_mode", [], |row| row.get(0))?;
    let synchronous: i64 = conn.query_row("PRAGMA synchronous", [], |row| row.get(0))?;
    let foreign_keys: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
    let busy_timeout_ms: i64 = conn.query_row("PRAGMA busy_timeout", [], |row| row.get(0))?;
    Ok(PragmaState {
        journal_mode,
        synchronous_full: synchronous == 2,
        foreign_keys_enabled: foreign_keys == 1,
        busy_timeout_ms,
    })
}

/// Pragma state for verification.
#[derive(Debug)]
pub struct PragmaState {
    /// Journal mode (should be "delete").
    pub journal_mode: String,
    /// Whether `synchronous = FULL`.
    pub synchronous_full: bool,
    /// Whether foreign keys are enabled.
    pub foreign_keys_enabled: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
