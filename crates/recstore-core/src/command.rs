//! Command records.

use crate::payload::DomainPayload;
use crate::request_context::RequestContext;

/// A request that produced events.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Command {
    /// Instance (tenant/process grouping) that handled the command.
    pub instance_id: i64,
    /// Globally unique command identifier. Required for every write.
    pub command_uuid: String,
    /// Owning tenant.
    pub tenant_uuid: String,
    /// Bounded context the command targets.
    pub domain: String,
    /// Caller-supplied creation timestamp.
    pub created_at: i64,
    /// Payload type label.
    pub domain_cmd_name: String,
    /// Serialized payload.
    pub domain_cmd_bytes: Vec<u8>,
    /// Live structured payload, if the caller still holds one.
    pub domain_cmd: Option<DomainPayload>,
    /// Sender/target metadata of the originating request.
    pub req_ctx: Option<RequestContext>,
}

impl Command {
    /// New command for `domain` with the given identifier.
    pub fn new(command_uuid: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            command_uuid: command_uuid.into(),
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Attach a structured payload.
    #[must_use]
    pub fn with_payload(mut self, payload: DomainPayload) -> Self {
        self.domain_cmd = Some(payload);
        self
    }

    /// Attach raw payload bytes and their type label.
    #[must_use]
    pub fn with_bytes(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.domain_cmd_name = name.into();
        self.domain_cmd_bytes = bytes.into();
        self
    }

    /// Attach a request context.
    #[must_use]
    pub fn with_req_ctx(mut self, req_ctx: RequestContext) -> Self {
        self.req_ctx = Some(req_ctx);
        self
    }
}
