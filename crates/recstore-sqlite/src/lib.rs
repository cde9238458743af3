//! # recstore-sqlite
//!
//! `SQLite`-backed persistence for events and commands.
//!
//! Each record kind gets its own store over one embedded database file:
//! [`EventStore`] and [`CommandStore`] share a single generic engine and
//! differ only in their table descriptor. All access goes through exactly
//! one pooled connection opened with `journal_mode = DELETE` and
//! `synchronous = FULL`.
//!
//! ```text
//! EventStore / CommandStore   (store)
//!     ├── serializer           record <-> row
//!     ├── payload_cipher       optional hex-encoded payload encryption
//!     └── sqlite::Engine<T>    parameterized CRUD, list, unique values
//!             └── sqlite::connection  one-connection r2d2 pool + pragmas
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod options;
pub mod payload_cipher;
pub mod serializer;
pub mod sqlite;
pub mod store;

pub use config::ConnectionConfig;
pub use errors::{Result, StoreError};
pub use options::{ListOptions, StoreInfo, StoreOption, StoreOptions, UniqueValuesOptions};
pub use store::{CommandKind, CommandStore, EventKind, EventStore, RecordKind, SqliteStore};

pub use recstore_core::{
    Attributes, ChaChaCipher, Cipher, CipherError, Command, DomainPayload, Event, RequestContext,
    new_uuid,
};
