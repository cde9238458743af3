//! Live structured payloads.
//!
//! A [`DomainPayload`] is what a caller hands to a record when it still holds
//! the typed domain value. The store re-serializes it on write so the stored
//! bytes always reflect the current value, and uses its type name when the
//! record carries no explicit one.

use serde::Serialize;
use serde_json::Value;

/// A structured payload captured from a typed value.
#[derive(Clone, Debug, PartialEq)]
pub struct DomainPayload {
    type_name: String,
    value: Value,
}

impl DomainPayload {
    /// Capture `data`, deriving the type name from `T`.
    pub fn new<T: Serialize>(data: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            type_name: short_type_name::<T>(),
            value: serde_json::to_value(data)?,
        })
    }

    /// Build from an already-structured value with an explicit type name.
    pub fn from_value(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value,
        }
    }

    /// Type name derived at capture time.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Structured value.
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Mutable access to the structured value.
    pub fn value_mut(&mut self) -> &mut Value {
        &mut self.value
    }

    /// Serialize the structured value to JSON bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.value)
    }
}

/// Last path segment of `T`'s name, without generic arguments.
///
/// `my_app::orders::OrderPlaced` becomes `OrderPlaced`,
/// `Vec<my_app::Line>` becomes `Vec`.
fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
