//! Encryption of the payload column.
//!
//! Only `data_bytes` is touched. Ciphertext is stored as lowercase hex text
//! so the column stays TEXT. Once a cipher is configured encryption is never
//! skipped: an empty payload is an error, not a pass-through.

use recstore_core::Cipher;

use crate::errors::{Result, StoreError};

/// Encrypt `payload` in place, replacing it with hex-encoded ciphertext.
pub fn encrypt_payload(cipher: Option<&dyn Cipher>, payload: &mut Vec<u8>) -> Result<()> {
    let cipher = cipher.ok_or(StoreError::MissingCipher)?;
    if payload.is_empty() {
        return Err(StoreError::EmptyPayload);
    }
    let ciphertext = cipher.encrypt(payload)?;
    *payload = hex::encode(ciphertext).into_bytes();
    Ok(())
}

/// Reverse [`encrypt_payload`]: hex-decode, then decrypt, in place.
pub fn decrypt_payload(cipher: Option<&dyn Cipher>, payload: &mut Vec<u8>) -> Result<()> {
    let cipher = cipher.ok_or(StoreError::MissingCipher)?;
    let ciphertext = hex::decode(&*payload)?;
    if ciphertext.is_empty() {
        return Err(StoreError::EmptyPayload);
    }
    *payload = cipher.decrypt(&ciphertext)?;
    Ok(())
}
