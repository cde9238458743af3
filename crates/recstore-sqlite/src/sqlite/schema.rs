//! Schema creation for the `events` and `commands` tables.
//!
//! There is no versioned migration history: every statement is
//! `IF NOT EXISTS`, so running [`migrate`] on an existing database is a no-op.
//! Read-only stores never call it.

use rusqlite::Connection;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};

const EVENTS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    instance_id    INTEGER,
    uuid           TEXT,
    tenant_uuid    TEXT,
    command_uuid   TEXT,
    domain         TEXT,
    aggregate_uuid TEXT,
    version        INTEGER,
    created_at     INTEGER,
    data_type      TEXT,
    data_bytes     TEXT
);
CREATE INDEX IF NOT EXISTS events_tenant_index ON events (tenant_uuid ASC);
CREATE INDEX IF NOT EXISTS events_aggregate_uuid_index ON events (aggregate_uuid ASC);
";

const COMMANDS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS commands (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    instance_id INTEGER,
    uuid        TEXT,
    tenant_uuid TEXT,
    domain      TEXT,
    created_at  INTEGER,
    data_type   TEXT,
    data_bytes  TEXT,
    req_ctx     TEXT
);
CREATE INDEX IF NOT EXISTS commands_tenant_index ON commands (tenant_uuid ASC);
";

/// Create both tables and their indexes if missing, in one transaction.
pub fn migrate(conn: &Connection) -> Result<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| StoreError::Migration {
            message: format!("failed to begin schema transaction: {e}"),
        })?;

    for (table, sql) in [("events", EVENTS_SCHEMA), ("commands", COMMANDS_SCHEMA)] {
        debug!(table, "ensuring table");
        tx.execute_batch(sql).map_err(|e| StoreError::Migration {
            message: format!("failed to create {table}: {e}"),
        })?;
    }

    tx.commit().map_err(|e| StoreError::Migration {
        message: format!("failed to commit schema: {e}"),
    })?;
    info!("schema ready");
    Ok(())
}

/// Whether `table` exists in the connected database.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
