//! Per-kind table descriptors.
//!
//! The engine is written once against [`Table`]; the two implementations only
//! describe column lists and row mapping.

use rusqlite::types::Value;

use crate::sqlite::row_types::{
    int_or_zero, payload_bytes, payload_value, text_or_empty, CommandRow, EventRow,
};

/// Describes one record table to the generic engine.
pub trait Table {
    /// Table name.
    const NAME: &'static str;
    /// Data columns in schema order, excluding the surrogate `id`.
    /// Must contain `uuid`, `tenant_uuid`, `domain`, `created_at`,
    /// `data_type` and `data_bytes`.
    const COLUMNS: &'static [&'static str];

    /// Row struct.
    type Row;

    /// Bind values for [`Table::COLUMNS`], in the same order.
    fn values(row: &Self::Row) -> Vec<Value>;

    /// Map a row selected as `id, COLUMNS...`.
    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self::Row>;

    /// Unique identifier of a row.
    fn uuid(row: &Self::Row) -> &str;

    /// Payload bytes of a row.
    fn payload_mut(row: &mut Self::Row) -> &mut Vec<u8>;

    /// Whether `column` is `id` or one of [`Table::COLUMNS`].
    fn has_column(column: &str) -> bool {
        column == "id" || Self::COLUMNS.contains(&column)
    }

    /// `id, col1, col2, ...` for SELECT statements.
    fn select_list() -> String {
        let mut list = String::from("id");
        for column in Self::COLUMNS {
            list.push_str(", ");
            list.push_str(column);
        }
        list
    }
}

/// The `events` table.
#[derive(Debug, Clone, Copy)]
pub struct EventsTable;

impl Table for EventsTable {
    const NAME: &'static str = "events";
    const COLUMNS: &'static [&'static str] = &[
        "instance_id",
        "uuid",
        "tenant_uuid",
        "command_uuid",
        "domain",
        "aggregate_uuid",
        "version",
        "created_at",
        "data_type",
        "data_bytes",
    ];

    type Row = EventRow;

    fn values(row: &EventRow) -> Vec<Value> {
        vec![
            Value::Integer(row.instance_id),
            Value::Text(row.uuid.clone()),
            Value::Text(row.tenant_uuid.clone()),
            Value::Text(row.command_uuid.clone()),
            Value::Text(row.domain.clone()),
            Value::Text(row.aggregate_uuid.clone()),
            Value::Integer(row.version),
            Value::Integer(row.created_at),
            Value::Text(row.data_type.clone()),
            payload_value(&row.data_bytes),
        ]
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EventRow> {
        Ok(EventRow {
            id: row.get(0)?,
            instance_id: int_or_zero(row, 1)?,
            uuid: text_or_empty(row, 2)?,
            tenant_uuid: text_or_empty(row, 3)?,
            command_uuid: text_or_empty(row, 4)?,
            domain: text_or_empty(row, 5)?,
            aggregate_uuid: text_or_empty(row, 6)?,
            version: int_or_zero(row, 7)?,
            created_at: int_or_zero(row, 8)?,
            data_type: text_or_empty(row, 9)?,
            data_bytes: payload_bytes(row, 10)?,
        })
    }

    fn uuid(row: &EventRow) -> &str {
        &row.uuid
    }

    fn payload_mut(row: &mut EventRow) -> &mut Vec<u8> {
        &mut row.data_bytes
    }
}

/// The `commands` table.
#[derive(Debug, Clone, Copy)]
pub struct CommandsTable;

impl Table for CommandsTable {
    const NAME: &'static str = "commands";
    const COLUMNS: &'static [&'static str] = &[
        "instance_id",
        "uuid",
        "tenant_uuid",
        "domain",
        "created_at",
        "data_type",
        "data_bytes",
        "req_ctx",
    ];

    type Row = CommandRow;

    fn values(row: &CommandRow) -> Vec<Value> {
        vec![
            Value::Integer(row.instance_id),
            Value::Text(row.uuid.clone()),
            Value::Text(row.tenant_uuid.clone()),
            Value::Text(row.domain.clone()),
            Value::Integer(row.created_at),
            Value::Text(row.data_type.clone()),
            payload_value(&row.data_bytes),
            Value::Text(row.req_ctx.clone()),
        ]
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommandRow> {
        Ok(CommandRow {
            id: row.get(0)?,
            instance_id: int_or_zero(row, 1)?,
            uuid: text_or_empty(row, 2)?,
            tenant_uuid: text_or_empty(row, 3)?,
            domain: text_or_empty(row, 4)?,
            created_at: int_or_zero(row, 5)?,
            data_type: text_or_empty(row, 6)?,
            data_bytes: payload_bytes(row, 7)?,
            req_ctx: text_or_empty(row, 8)?,
        })
    }

    fn uuid(row: &CommandRow) -> &str {
        &row.uuid
    }

    fn payload_mut(row: &mut CommandRow) -> &mut Vec<u8> {
        &mut row.data_bytes
    }
}
