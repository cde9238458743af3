//! Conversion between records and persisted rows.
//!
//! Writing: a live structured payload wins over raw bytes and is
//! re-serialized; when the record has no explicit type name, the structured
//! payload's derived name is used. Reading: records come back with bytes and
//! type name only, the structured payload left unset. A command's request
//! context is decoded eagerly since its shape is known.

use recstore_core::{Command, DomainPayload, Event, RequestContext};

use crate::errors::Result;
use crate::sqlite::row_types::{CommandRow, EventRow};

/// Persisted form of an event.
pub fn event_to_row(evt: &Event) -> Result<EventRow> {
    Ok(EventRow {
        id: 0,
        instance_id: evt.instance_id,
        uuid: evt.event_uuid.clone(),
        tenant_uuid: evt.tenant_uuid.clone(),
        command_uuid: evt.command_uuid.clone(),
        domain: evt.domain.clone(),
        aggregate_uuid: evt.aggregate_uuid.clone(),
        version: evt.version,
        created_at: evt.created_at,
        data_type: payload_type(&evt.domain_evt_name, evt.domain_evt.as_ref()),
        data_bytes: payload_bytes(&evt.domain_evt_bytes, evt.domain_evt.as_ref())?,
    })
}

/// Event rebuilt from its row.
pub fn row_to_event(row: EventRow) -> Event {
    Event {
        instance_id: row.instance_id,
        event_uuid: row.uuid,
        tenant_uuid: row.tenant_uuid,
        command_uuid: row.command_uuid,
        domain: row.domain,
        aggregate_uuid: row.aggregate_uuid,
        version: row.version,
        created_at: row.created_at,
        domain_evt_name: row.data_type,
        domain_evt_bytes: row.data_bytes,
        domain_evt: None,
    }
}

/// Persisted form of a command.
pub fn command_to_row(cmd: &Command) -> Result<CommandRow> {
    let req_ctx = match &cmd.req_ctx {
        Some(ctx) => serde_json::to_string(ctx)?,
        None => String::new(),
    };
    Ok(CommandRow {
        id: 0,
        instance_id: cmd.instance_id,
        uuid: cmd.command_uuid.clone(),
        tenant_uuid: cmd.tenant_uuid.clone(),
        domain: cmd.domain.clone(),
        created_at: cmd.created_at,
        data_type: payload_type(&cmd.domain_cmd_name, cmd.domain_cmd.as_ref()),
        data_bytes: payload_bytes(&cmd.domain_cmd_bytes, cmd.domain_cmd.as_ref())?,
        req_ctx,
    })
}

/// Command rebuilt from its row.
pub fn row_to_command(row: CommandRow) -> Result<Command> {
    let req_ctx = if row.req_ctx.is_empty() {
        None
    } else {
        Some(serde_json::from_str::<RequestContext>(&row.req_ctx)?)
    };
    Ok(Command {
        instance_id: row.instance_id,
        command_uuid: row.uuid,
        tenant_uuid: row.tenant_uuid,
        domain: row.domain,
        created_at: row.created_at,
        domain_cmd_name: row.data_type,
        domain_cmd_bytes: row.data_bytes,
        domain_cmd: None,
        req_ctx,
    })
}

fn payload_bytes(raw: &[u8], structured: Option<&DomainPayload>) -> Result<Vec<u8>> {
    match structured {
        Some(payload) => Ok(payload.to_bytes()?),
        None => Ok(raw.to_vec()),
    }
}

fn payload_type(explicit: &str, structured: Option<&DomainPayload>) -> String {
    match structured {
        Some(payload) if explicit.is_empty() => payload.type_name().to_string(),
        _ => explicit.to_string(),
    }
}
