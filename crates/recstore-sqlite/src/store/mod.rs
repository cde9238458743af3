//! Public record stores.
//!
//! [`SqliteStore`] is written once and instantiated per record kind:
//! [`EventStore`] over the `events` table and [`CommandStore`] over
//! `commands`. Both are `Send + Sync`; share them with `Arc`.

mod kind;
mod sqlite_store;

pub use kind::{CommandKind, EventKind, RecordKind};
pub use sqlite_store::{CommandStore, EventStore, SqliteStore};
