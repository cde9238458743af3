//! Store facade over one record table.
//!
//! Holds the storage path, the effective [`StoreOptions`], and the
//! connection pool once initialized. Every operation checks out the single
//! pooled connection, so concurrent callers are serialized by the pool.

use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use tracing::{info, warn};

use crate::config::ConnectionConfig;
use crate::errors::{Result, StoreError};
use crate::options::{ListOptions, StoreInfo, StoreOption, StoreOptions, UniqueValuesOptions};
use crate::payload_cipher::{decrypt_payload, encrypt_payload};
use crate::sqlite::connection::{connect, ConnectionPool, PooledConnection};
use crate::sqlite::engine::Engine;
use crate::sqlite::schema::migrate;
use crate::sqlite::tables::Table;
use crate::store::kind::{CommandKind, EventKind, RecordKind};

/// Backend label reported by [`SqliteStore::info`].
const STORE_TYPE: &str = "sqlite";

/// Store for events.
pub type EventStore = SqliteStore<EventKind>;

/// Store for commands.
pub type CommandStore = SqliteStore<CommandKind>;

type Row<K> = <<K as RecordKind>::Table as Table>::Row;

/// `SQLite`-backed store for one record kind.
pub struct SqliteStore<K> {
    path: PathBuf,
    options: StoreOptions,
    pool: RwLock<Option<ConnectionPool>>,
    _kind: PhantomData<fn() -> K>,
}

impl<K: RecordKind> SqliteStore<K> {
    /// Uninitialized store at `path`. Nothing touches the filesystem until
    /// [`init`](Self::init).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            options: StoreOptions {
                connection: ConnectionConfig::from_env(),
                ..StoreOptions::default()
            },
            pool: RwLock::new(None),
            _kind: PhantomData,
        }
    }

    /// [`new`](Self::new) followed by [`init`](Self::init).
    pub fn open(
        path: impl Into<PathBuf>,
        options: impl IntoIterator<Item = StoreOption>,
    ) -> Result<Self> {
        let mut store = Self::new(path);
        store.init(options)?;
        Ok(store)
    }

    /// Apply `options`, open the connection, and create the schema unless
    /// read-only. Calling it again re-applies options and reopens.
    pub fn init(&mut self, options: impl IntoIterator<Item = StoreOption>) -> Result<()> {
        self.options.apply(options)?;
        let pool = connect(&self.path, &self.options.connection)?;
        if !self.options.read_only {
            let conn = pool.get()?;
            migrate(&conn)?;
        }
        *self.pool.get_mut() = Some(pool);
        info!(
            store = %self,
            kind = <K::Table as Table>::NAME,
            read_only = self.options.read_only,
            encrypted = self.options.cipher.is_some(),
            "store initialized"
        );
        Ok(())
    }

    /// Effective options.
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the connection. Later operations fail with
    /// [`StoreError::NotInitialized`] until [`init`](Self::init) runs again.
    pub fn close(&self) {
        if self.pool.write().take().is_some() {
            info!(store = %self, "store closed");
        }
    }

    /// Insert `record`.
    pub fn create(&self, record: &K::Record) -> Result<()> {
        let row = self.prepare_write("create", record)?;
        let mut conn = self.conn()?;
        Engine::<K::Table>::insert(&mut conn, &row)
    }

    /// Record with the given identifier, or `None`. Without an identifier
    /// (or with an empty one) an arbitrary row is returned.
    pub fn get(&self, uuid: Option<&str>) -> Result<Option<K::Record>> {
        let conn = self.conn()?;
        let Some(mut row) = Engine::<K::Table>::get(&conn, uuid)? else {
            return Ok(None);
        };
        drop(conn);
        self.unseal(&mut row)?;
        K::from_row(row).map(Some)
    }

    /// One page of matching records plus the total match count.
    pub fn list(&self, opts: &ListOptions) -> Result<(Vec<K::Record>, i64)> {
        let conn = self.conn()?;
        let (rows, total) = Engine::<K::Table>::list(&conn, opts)?;
        drop(conn);
        let records = rows
            .into_iter()
            .map(|mut row| {
                self.unseal(&mut row)?;
                K::from_row(row)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((records, total))
    }

    /// Overwrite the stored record with `record`'s identifier. Returns the
    /// number of rows changed, 0 when no such record exists.
    pub fn update(&self, record: &K::Record) -> Result<usize> {
        let row = self.prepare_write("update", record)?;
        let mut conn = self.conn()?;
        Engine::<K::Table>::update(&mut conn, &row)
    }

    /// Remove the record with `uuid`. Returns whether a record was removed.
    pub fn delete(&self, uuid: &str) -> Result<bool> {
        self.ensure_writable("delete")?;
        self.ensure_uuid(uuid)?;
        let conn = self.conn()?;
        Engine::<K::Table>::delete(&conn, uuid)
    }

    /// Number of stored records; 0 when the count cannot be read.
    pub fn total(&self) -> i64 {
        match self.conn().and_then(|conn| Engine::<K::Table>::count(&conn)) {
            Ok(count) => count,
            Err(err) => {
                warn!(store = %self, error = %err, "total failed, reporting 0");
                0
            }
        }
    }

    /// Distinct values of a column plus their count.
    pub fn unique_values(&self, opts: &UniqueValuesOptions) -> Result<(Vec<String>, i64)> {
        let conn = self.conn()?;
        Engine::<K::Table>::unique_values(&conn, opts)
    }

    /// Diagnostic snapshot. Unreadable figures are reported as 0.
    pub fn info(&self) -> StoreInfo {
        let (num_items, last_item_created_at) = match self.conn().and_then(|conn| {
            Ok((
                Engine::<K::Table>::count(&conn)?,
                Engine::<K::Table>::last_created_at(&conn)?,
            ))
        }) {
            Ok(figures) => figures,
            Err(err) => {
                warn!(store = %self, error = %err, "info failed, reporting zeros");
                (0, 0)
            }
        };
        StoreInfo {
            store_type: STORE_TYPE.to_string(),
            kind: <K::Table as Table>::NAME.to_string(),
            num_items,
            last_item_created_at,
            connection_info: self.path.display().to_string(),
        }
    }

    /// Close the store and delete every file whose name starts with the
    /// storage path (database plus journal sidecars). Irreversible.
    pub fn reset(&self) -> Result<()> {
        self.ensure_writable("reset")?;
        self.close();

        let pattern = format!("{}*", glob::Pattern::escape(&self.path.to_string_lossy()));
        let mut removed = 0usize;
        for entry in glob::glob(&pattern)? {
            fs::remove_file(entry?)?;
            removed += 1;
        }
        info!(store = %self, removed, "store reset");
        Ok(())
    }

    fn conn(&self) -> Result<PooledConnection> {
        let pool = self.pool.read().clone().ok_or(StoreError::NotInitialized)?;
        Ok(pool.get()?)
    }

    fn ensure_writable(&self, operation: &'static str) -> Result<()> {
        if self.options.read_only {
            return Err(StoreError::ReadOnly {
                store: self.to_string(),
                operation,
            });
        }
        Ok(())
    }

    fn ensure_uuid(&self, uuid: &str) -> Result<()> {
        if uuid.is_empty() {
            return Err(StoreError::InvalidRecord {
                store: self.to_string(),
                reason: "uuid is empty".into(),
            });
        }
        Ok(())
    }

    fn prepare_write(&self, operation: &'static str, record: &K::Record) -> Result<Row<K>> {
        self.ensure_writable(operation)?;
        self.ensure_uuid(K::uuid(record))?;
        let mut row = K::to_row(record)?;
        if let Some(cipher) = &self.options.cipher {
            encrypt_payload(Some(cipher.as_ref()), <K::Table as Table>::payload_mut(&mut row))?;
        }
        Ok(row)
    }

    fn unseal(&self, row: &mut Row<K>) -> Result<()> {
        if let Some(cipher) = &self.options.cipher {
            decrypt_payload(Some(cipher.as_ref()), <K::Table as Table>::payload_mut(row))?;
        }
        Ok(())
    }
}

impl<K> fmt::Display for SqliteStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{STORE_TYPE} - {}", self.path.display())
    }
}

impl<K> fmt::Debug for SqliteStore<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("open", &self.pool.read().is_some())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
