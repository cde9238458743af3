//! `SQLite` backend.
//!
//! # Architecture
//!
//! - **[`connection`]**: `r2d2` pool pinned to a single connection, with
//!   durability pragmas applied when it opens.
//! - **[`schema`]**: idempotent creation of the `events` and `commands` tables.
//! - **[`row_types`]**: raw row structs for `rusqlite` row mapping.
//! - **[`tables`]**: per-kind table descriptors (name, columns, row mapping).
//! - **[`query`]**: parameterized `WHERE` / `ORDER BY` / `LIMIT` fragments.
//! - **[`engine`]**: stateless CRUD and query operations generic over a table.

pub mod connection;
pub mod engine;
pub mod query;
pub mod row_types;
pub mod schema;
pub mod tables;

pub use connection::{connect, verify_pragmas, ConnectionPool, PooledConnection, PragmaState};
pub use engine::Engine;
pub use row_types::{CommandRow, EventRow};
pub use schema::migrate;
pub use tables::{CommandsTable, EventsTable, Table};
