//! Envelope cipher: AES-GCM authenticated encryption to a base64 string.
//!
//! Each call to `seal` generates a fresh random 12-byte nonce.  The
//! envelope is a single base64 (standard alphabet, padded) string:
//!   base64( 12-byte nonce | ciphertext | 16-byte auth tag )
//!
//! This layout is the storage wire format for vault contents and account
//! envelopes alike.  A short key selects AES-128-GCM, a long key
//! AES-256-GCM.

use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{AeadCore, Aes128Gcm, Aes256Gcm};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use thiserror::Error;

use super::keys::CipherKey;
use crate::errors::{PassVaultError, Result};

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// The only way `open` fails.
///
/// Bad base64, truncated input, a wrong key and tampered bytes all look
/// the same to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("envelope authentication failed")]
pub struct AuthFailure;

/// Seal `plaintext` under `key` and return the base64 envelope.
pub fn seal(plaintext: &str, key: &CipherKey) -> Result<String> {
    let sealed = match key {
        CipherKey::Short(bytes) => {
            let cipher = Aes128Gcm::new_from_slice(bytes)
                .map_err(|e| PassVaultError::process("envelope seal", e))?;
            seal_with(&cipher, plaintext.as_bytes())?
        }
        CipherKey::Long(bytes) => {
            let cipher = Aes256Gcm::new_from_slice(bytes)
                .map_err(|e| PassVaultError::process("envelope seal", e))?;
            seal_with(&cipher, plaintext.as_bytes())?
        }
    };
    Ok(BASE64.encode(sealed))
}

/// Open an envelope produced by `seal` with the same key.
pub fn open(envelope: &str, key: &CipherKey) -> std::result::Result<String, AuthFailure> {
    let raw = BASE64.decode(envelope.trim()).map_err(|_| AuthFailure)?;

    // Nonce plus tag is the smallest valid envelope (empty plaintext).
    if raw.len() < NONCE_LEN + TAG_LEN {
        return Err(AuthFailure);
    }

    let plaintext = match key {
        CipherKey::Short(bytes) => {
            let cipher = Aes128Gcm::new_from_slice(bytes).map_err(|_| AuthFailure)?;
            open_with(&cipher, &raw)?
        }
        CipherKey::Long(bytes) => {
            let cipher = Aes256Gcm::new_from_slice(bytes).map_err(|_| AuthFailure)?;
            open_with(&cipher, &raw)?
        }
    };

    String::from_utf8(plaintext).map_err(|_| AuthFailure)
}

fn seal_with<C: Aead + AeadCore>(cipher: &C, plaintext: &[u8]) -> Result<Vec<u8>> {
    let nonce = C::generate_nonce(&mut OsRng);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext)
        .map_err(|e| PassVaultError::process("envelope seal", e))?;

    let mut output = Vec::with_capacity(nonce.len() + ciphertext.len());
    output.extend_from_slice(&nonce);
    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn open_with<C: Aead + AeadCore>(
    cipher: &C,
    raw: &[u8],
) -> std::result::Result<Vec<u8>, AuthFailure> {
    let (nonce_bytes, ciphertext) = raw.split_at(NONCE_LEN);
    let nonce = GenericArray::from_slice(nonce_bytes);
    cipher.decrypt(nonce, ciphertext).map_err(|_| AuthFailure)
}
