//! Database row types for mapping between `SQLite` rows and Rust structs.
//!
//! These are the persisted shape, not the public record types. Conversion to
//! [`recstore_core::Event`] / [`recstore_core::Command`] happens in
//! [`crate::serializer`].

use rusqlite::types::{Value, ValueRef};

/// Raw row from the `events` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventRow {
    /// Surrogate key, 0 until inserted.
    pub id: i64,
    /// Instance identifier.
    pub instance_id: i64,
    /// Event unique identifier.
    pub uuid: String,
    /// Tenant identifier.
    pub tenant_uuid: String,
    /// Originating command identifier.
    pub command_uuid: String,
    /// Domain name.
    pub domain: String,
    /// Aggregate identifier.
    pub aggregate_uuid: String,
    /// Version within the aggregate.
    pub version: i64,
    /// Creation timestamp.
    pub created_at: i64,
    /// Payload type name.
    pub data_type: String,
    /// Payload (plaintext or hex ciphertext).
    pub data_bytes: Vec<u8>,
}

/// Raw row from the `commands` table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CommandRow {
    /// Surrogate key, 0 until inserted.
    pub id: i64,
    /// Instance identifier.
    pub instance_id: i64,
    /// Command unique identifier.
    pub uuid: String,
    /// Tenant identifier.
    pub tenant_uuid: String,
    /// Domain name.
    pub domain: String,
    /// Creation timestamp.
    pub created_at: i64,
    /// Payload type name.
    pub data_type: String,
    /// Payload (plaintext or hex ciphertext).
    pub data_bytes: Vec<u8>,
    /// Serialized request context, empty when absent.
    pub req_ctx: String,
}

/// Bind payload bytes as TEXT when they are UTF-8, BLOB otherwise.
pub fn payload_value(bytes: &[u8]) -> Value {
    match std::str::from_utf8(bytes) {
        Ok(text) => Value::Text(text.to_owned()),
        Err(_) => Value::Blob(bytes.to_vec()),
    }
}

/// Read payload bytes stored as TEXT, BLOB or NULL.
pub fn payload_bytes(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<Vec<u8>> {
    match row.get_ref(idx)? {
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => Ok(bytes.to_vec()),
        ValueRef::Null => Ok(Vec::new()),
        other => Err(rusqlite::Error::InvalidColumnType(
            idx,
            "data_bytes".into(),
            other.data_type(),
        )),
    }
}

/// Read a nullable TEXT column as a string, NULL becoming empty.
pub fn text_or_empty(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

/// Read a nullable INTEGER column, NULL becoming 0.
pub fn int_or_zero(row: &rusqlite::Row<'_>, idx: usize) -> rusqlite::Result<i64> {
    Ok(row.get::<_, Option<i64>>(idx)?.unwrap_or_default())
}
