//! Event records.

use crate::payload::DomainPayload;

/// An immutable fact belonging to an aggregate stream.
///
/// `domain_evt_bytes` is the serialized payload; `domain_evt` optionally holds
/// the live structured value. Records read back from a store only carry the
/// bytes and the type name; decoding into a concrete type is the caller's job.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Event {
    /// Instance (tenant/process grouping) the event was produced by.
    pub instance_id: i64,
    /// Globally unique event identifier. Required for every write.
    pub event_uuid: String,
    /// Owning tenant.
    pub tenant_uuid: String,
    /// Command that produced this event.
    pub command_uuid: String,
    /// Bounded context the event belongs to.
    pub domain: String,
    /// Aggregate stream the event belongs to.
    pub aggregate_uuid: String,
    /// Position within the aggregate stream.
    pub version: i64,
    /// Caller-supplied creation timestamp.
    pub created_at: i64,
    /// Payload type label.
    pub domain_evt_name: String,
    /// Serialized payload.
    pub domain_evt_bytes: Vec<u8>,
    /// Live structured payload, if the caller still holds one.
    pub domain_evt: Option<DomainPayload>,
}

impl Event {
    /// New event for `aggregate_uuid` in `domain` with the given identifier.
    pub fn new(
        event_uuid: impl Into<String>,
        domain: impl Into<String>,
        aggregate_uuid: impl Into<String>,
        version: i64,
    ) -> Self {
        Self {
            event_uuid: event_uuid.into(),
            domain: domain.into(),
            aggregate_uuid: aggregate_uuid.into(),
            version,
            ..Self::default()
        }
    }

    /// Attach a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: DomainPayload) -> Self {
        self.domain_evt = Some(payload);
        self
    }

    /// Attach raw payload bytes and their type label.
    #[must_use]
    pub fn with_bytes(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.domain_evt_name = name.into();
        self.domain_evt_bytes = bytes.into();
        self
    }
}
