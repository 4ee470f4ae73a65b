//! Decrypt → merge → re-encrypt over a vault's credential map.
//!
//! The map is never persisted in plaintext: it is opened from the vault
//! ciphertext, changed in memory, and sealed again as a whole.

use zeroize::Zeroizing;

use super::credential::{Credential, CredentialMap};
use crate::crypto::{self, VaultSecret};
use crate::errors::{PassVaultError, Result};

/// Apply one entry change to `map`.
///
/// `Some(value)` inserts or overwrites `entry_id`; `None` removes it.
/// Removing an id that is not present leaves the map unchanged.
pub fn merge(mut map: CredentialMap, entry_id: &str, value: Option<Credential>) -> CredentialMap {
    match value {
        Some(credential) => {
            map.insert(entry_id.to_string(), credential);
        }
        None => {
            map.remove(entry_id);
        }
    }
    map
}

/// Serialize a map to its plaintext JSON object form.
pub fn encode_map(map: &CredentialMap) -> Result<Zeroizing<String>> {
    serde_json::to_string(map)
        .map(Zeroizing::new)
        .map_err(|e| PassVaultError::process("credential map encode", e))
}

/// Parse plaintext JSON into a map.  The empty object is the empty map.
pub fn decode_map(plaintext: &str) -> Result<CredentialMap> {
    serde_json::from_str(plaintext).map_err(|e| PassVaultError::process("credential map decode", e))
}

/// Seal a map under the session's vault secret.
pub fn seal_map(map: &CredentialMap, secret: &VaultSecret) -> Result<String> {
    let plaintext = encode_map(map)?;
    crypto::seal(&plaintext, &secret.cipher_key())
}

/// Open a vault ciphertext with the session's vault secret.
///
/// A failed tag check means the key does not belong to this vault, which
/// is an access failure rather than a processing fault.
pub fn open_map(ciphertext: &str, secret: &VaultSecret) -> Result<CredentialMap> {
    let plaintext = Zeroizing::new(
        crypto::open(ciphertext, &secret.cipher_key()).map_err(|_| PassVaultError::AccessDenied)?,
    );
    decode_map(&plaintext)
}
