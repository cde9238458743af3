//! Request metadata attached to commands.

use serde::{Deserialize, Serialize};

use crate::attributes::Attributes;

/// Sender and target identifiers of the request that issued a command.
///
/// Unlike domain payloads this has a fixed shape, so stores decode it eagerly.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestContext {
    /// Tenant the request was issued from.
    pub sender_tenant_uuid: String,
    /// Identity that issued the request.
    pub sender_identity_uuid: String,
    /// Tenant the command targets.
    pub target_tenant_uuid: String,
    /// Aggregate the command targets, if any.
    pub target_aggregate_uuid: String,
    /// Expected aggregate version for optimistic checks (0 = unchecked).
    pub target_aggregate_version: i64,
    /// Free-form request attributes.
    pub attributes: Attributes,
}

impl RequestContext {
    /// Context for a request sent by `identity` within `tenant`.
    pub fn new(sender_tenant_uuid: impl Into<String>, sender_identity_uuid: impl Into<String>) -> Self {
        Self {
            sender_tenant_uuid: sender_tenant_uuid.into(),
            sender_identity_uuid: sender_identity_uuid.into(),
            ..Self::default()
        }
    }
}
