//! Store configuration and per-call query parameters.

use std::sync::Arc;

use recstore_core::{Attributes, Cipher};
use serde_json::Value;

use crate::config::ConnectionConfig;
use crate::errors::{Result, StoreError};

/// A single configuration change, applied in order by [`StoreOptions::apply`].
pub enum StoreOption {
    /// Reject mutations and skip schema creation.
    ReadOnly(bool),
    /// Encrypt payloads at rest with this cipher.
    Cipher(Arc<dyn Cipher>),
    /// Attach an opaque caller attribute. The key must be non-empty.
    Attribute(String, Value),
    /// Replace the connection settings.
    Connection(ConnectionConfig),
}

impl StoreOption {
    /// Shorthand for [`StoreOption::Attribute`].
    pub fn attribute(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Attribute(key.into(), value.into())
    }

    /// Shorthand for [`StoreOption::Cipher`].
    pub fn cipher(cipher: impl Cipher + 'static) -> Self {
        Self::Cipher(Arc::new(cipher))
    }
}

/// Effective configuration of a store.
#[derive(Clone, Default)]
pub struct StoreOptions {
    /// Reject mutations and skip schema creation.
    pub read_only: bool,
    /// Payload cipher, if encryption at rest is enabled.
    pub cipher: Option<Arc<dyn Cipher>>,
    /// Opaque caller attributes.
    pub attributes: Attributes,
    /// Connection settings.
    pub connection: ConnectionConfig,
}

impl std::fmt::Debug for StoreOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreOptions")
            .field("read_only", &self.read_only)
            .field("cipher", &self.cipher.is_some())
            .field("attributes", &self.attributes)
            .field("connection", &self.connection)
            .finish()
    }
}

impl StoreOptions {
    /// Apply options left to right. The first invalid option stops
    /// application; options before it stay applied.
    pub fn apply(&mut self, options: impl IntoIterator<Item = StoreOption>) -> Result<()> {
        for option in options {
            match option {
                StoreOption::ReadOnly(read_only) => self.read_only = read_only,
                StoreOption::Cipher(cipher) => self.cipher = Some(cipher),
                StoreOption::Attribute(key, value) => {
                    if key.is_empty() {
                        return Err(StoreError::InvalidOption(
                            "attribute key must not be empty".into(),
                        ));
                    }
                    let _ = self.attributes.set(key, value);
                }
                StoreOption::Connection(connection) => {
                    if connection.checkout_timeout_ms == 0 {
                        return Err(StoreError::InvalidOption(
                            "checkout timeout must be positive".into(),
                        ));
                    }
                    self.connection = connection;
                }
            }
        }
        Ok(())
    }
}

/// Filters, ordering and pagination for `list`.
///
/// Filters combine with AND; unset or empty filters are omitted. Negative `limit` or
/// `offset` suppress that clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListOptions {
    /// Tenant equality filter.
    pub tenant_uuid: Option<String>,
    /// Aggregate equality filter (events only).
    pub aggregate_uuid: Option<String>,
    /// Payload type name equality filter.
    pub data_type: Option<String>,
    /// Domain membership filter; empty means no filter.
    pub domains: Vec<String>,
    /// Only rows with `created_at` strictly below this.
    pub before: Option<i64>,
    /// Only rows with `created_at` strictly above this.
    pub after: Option<i64>,
    /// Column to order by; `None` disables ordering.
    pub order_by: Option<String>,
    /// Ascending when true.
    pub ascending: bool,
    /// Page size.
    pub limit: i64,
    /// Rows to skip.
    pub offset: i64,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            tenant_uuid: None,
            aggregate_uuid: None,
            data_type: None,
            domains: Vec::new(),
            before: None,
            after: None,
            order_by: Some("created_at".into()),
            ascending: true,
            limit: 100,
            offset: 0,
        }
    }
}

impl ListOptions {
    /// Filter by tenant.
    #[must_use]
    pub fn tenant(mut self, tenant_uuid: impl Into<String>) -> Self {
        self.tenant_uuid = Some(tenant_uuid.into());
        self
    }

    /// Filter by aggregate.
    #[must_use]
    pub fn aggregate(mut self, aggregate_uuid: impl Into<String>) -> Self {
        self.aggregate_uuid = Some(aggregate_uuid.into());
        self
    }

    /// Filter by payload type name.
    #[must_use]
    pub fn data_type(mut self, data_type: impl Into<String>) -> Self {
        self.data_type = Some(data_type.into());
        self
    }

    /// Restrict to the given domains.
    #[must_use]
    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = domains.into_iter().map(Into::into).collect();
        self
    }

    /// Only rows created strictly before `created_at`.
    #[must_use]
    pub fn before(mut self, created_at: i64) -> Self {
        self.before = Some(created_at);
        self
    }

    /// Only rows created strictly after `created_at`.
    #[must_use]
    pub fn after(mut self, created_at: i64) -> Self {
        self.after = Some(created_at);
        self
    }

    /// Order by `column`.
    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order_by = Some(column.into());
        self.ascending = ascending;
        self
    }

    /// Set pagination.
    #[must_use]
    pub fn page(mut self, limit: i64, offset: i64) -> Self {
        self.limit = limit;
        self.offset = offset;
        self
    }
}

/// Parameters for `unique_values`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniqueValuesOptions {
    /// Column whose distinct values are returned.
    pub field: String,
    /// Tenant equality filter.
    pub tenant_uuid: Option<String>,
    /// Domain equality filter.
    pub domain: Option<String>,
    /// Ascending when true.
    pub ascending: bool,
    /// Page size; negative disables.
    pub limit: i64,
    /// Values to skip; negative disables.
    pub offset: i64,
}

impl Default for UniqueValuesOptions {
    fn default() -> Self {
        Self {
            field: "tenant_uuid".into(),
            tenant_uuid: None,
            domain: None,
            ascending: true,
            limit: 100,
            offset: 0,
        }
    }
}

impl UniqueValuesOptions {
    /// Distinct values of `field`.
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            ..Self::default()
        }
    }

    /// Filter by tenant.
    #[must_use]
    pub fn tenant(mut self, tenant_uuid: impl Into<String>) -> Self {
        self.tenant_uuid = Some(tenant_uuid.into());
        self
    }

    /// Filter by domain.
    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }
}

/// Diagnostic snapshot returned by `info`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreInfo {
    /// Backend label (`sqlite`).
    pub store_type: String,
    /// Record kind label (`events` or `commands`).
    pub kind: String,
    /// Number of stored rows.
    pub num_items: i64,
    /// Largest `created_at` seen, 0 when empty.
    pub last_item_created_at: i64,
    /// Connection-identifying string (the storage path).
    pub connection_info: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn apply_in_order() {
        let mut opts = StoreOptions::default();
        opts.apply([
            StoreOption::ReadOnly(true),
            StoreOption::attribute("key1", "value"),
            StoreOption::ReadOnly(false),
        ])
        .unwrap();
        assert!(!opts.read_only);
        assert_eq!(opts.attributes.get("key1"), Some(&json!("value")));
    }

    #[test]
    fn first_error_short_circuits() {
        let mut opts = StoreOptions::default();
        let err = opts
            .apply([
                StoreOption::attribute("a", 1),
                StoreOption::attribute("", 2),
                StoreOption::ReadOnly(true),
            ])
            .unwrap_err();
        assert_matches!(err, StoreError::InvalidOption(_));
        assert_eq!(opts.attributes.len(), 1);
        assert!(!opts.read_only);
    }

    #[test]
    fn zero_checkout_timeout_rejected() {
        let mut opts = StoreOptions::default();
        let err = opts
            .apply([StoreOption::Connection(ConnectionConfig {
                busy_timeout_ms: 10,
                checkout_timeout_ms: 0,
            })])
            .unwrap_err();
        assert_matches!(err, StoreError::InvalidOption(_));
    }

    #[test]
    fn debug_does_not_expose_cipher() {
        let mut opts = StoreOptions::default();
        opts.apply([StoreOption::cipher(recstore_core::ChaChaCipher::new([9; 32]))])
            .unwrap();
        let text = format!("{opts:?}");
        assert!(text.contains("cipher: true"));
    }

    #[test]
    fn list_defaults() {
        let opts = ListOptions::default();
        assert_eq!(opts.limit, 100);
        assert_eq!(opts.offset, 0);
        assert_eq!(opts.order_by.as_deref(), Some("created_at"));
        assert!(opts.ascending);
        assert!(opts.domains.is_empty());
    }

    #[test]
    fn unique_defaults() {
        let opts = UniqueValuesOptions::default();
        assert_eq!(opts.field, "tenant_uuid");
        assert_eq!(opts.limit, 100);
    }
}
