//! # recstore-core
//!
//! Record types and collaborator contracts shared by the record store backends.
//!
//! - **[`Event`]**: immutable fact tied to an aggregate, ordered by version
//! - **[`Command`]**: request that produced events, with a [`RequestContext`]
//! - **[`DomainPayload`]**: live structured payload plus its derived type name
//! - **[`Attributes`]**: opaque key/value bag carried by store options
//! - **[`Cipher`]**: encrypt/decrypt capability injected into a store

#![deny(unsafe_code)]

pub mod attributes;
pub mod cipher;
pub mod command;
pub mod event;
pub mod payload;
pub mod request_context;

pub use attributes::Attributes;
pub use cipher::{ChaChaCipher, Cipher, CipherError};
pub use command::Command;
pub use event::Event;
pub use payload::DomainPayload;
pub use request_context::RequestContext;

/// Generate a new time-ordered unique identifier.
pub fn new_uuid() -> String {
    uuid::Uuid::now_v7().to_string()
}
