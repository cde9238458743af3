//! Record kinds bridging domain records to their tables.

use recstore_core::{Command, Event};

use crate::errors::Result;
use crate::serializer::{command_to_row, event_to_row, row_to_command, row_to_event};
use crate::sqlite::tables::{CommandsTable, EventsTable, Table};

/// Binds a domain record type to the table that stores it.
pub trait RecordKind: 'static {
    /// Backing table.
    type Table: Table;
    /// Domain record.
    type Record;

    /// Caller-supplied unique identifier.
    fn uuid(record: &Self::Record) -> &str;

    /// Persisted form of `record`.
    fn to_row(record: &Self::Record) -> Result<<Self::Table as Table>::Row>;

    /// Record rebuilt from a stored row.
    fn from_row(row: <Self::Table as Table>::Row) -> Result<Self::Record>;
}

/// Events in the `events` table.
#[derive(Debug, Clone, Copy)]
pub struct EventKind;

impl RecordKind for EventKind {
    type Table = EventsTable;
    type Record = Event;

    fn uuid(record: &Event) -> &str {
        &record.event_uuid
    }

    fn to_row(record: &Event) -> Result<<EventsTable as Table>::Row> {
        event_to_row(record)
    }

    fn from_row(row: <EventsTable as Table>::Row) -> Result<Event> {
        Ok(row_to_event(row))
    }
}

/// Commands in the `commands` table.
#[derive(Debug, Clone, Copy)]
pub struct CommandKind;

impl RecordKind for CommandKind {
    type Table = CommandsTable;
    type Record = Command;

    fn uuid(record: &Command) -> &str {
        &record.command_uuid
    }

    fn to_row(record: &Command) -> Result<<CommandsTable as Table>::Row> {
        command_to_row(record)
    }

    fn from_row(row: <CommandsTable as Table>::Row) -> Result<Command> {
        row_to_command(row)
    }
}
