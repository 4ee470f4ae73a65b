//! Fixed-length cipher keys and the per-account vault secret.
//!
//! Two key sizes exist: a 16-byte "short" key (AES-128-GCM) for password
//! and session material, and a 32-byte "long" key (AES-256-GCM) for
//! private-key material. The size is part of the type, so a wrong-length
//! key cannot reach the cipher.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::padding::normalize;

/// Length of a short key in bytes (AES-128).
pub const SHORT_KEY_LEN: usize = 16;

/// Length of a long key in bytes (AES-256).
pub const LONG_KEY_LEN: usize = 32;

/// Random bytes behind a fresh vault secret.  Twelve bytes encode to
/// exactly `SHORT_KEY_LEN` base64url characters (96 bits).
const SECRET_RANDOM_LEN: usize = 12;

/// A symmetric key for the envelope cipher.  Zeroed on drop.
pub enum CipherKey {
    Short([u8; SHORT_KEY_LEN]),
    Long([u8; LONG_KEY_LEN]),
}

impl CipherKey {
    /// Normalize `secret` into a short (16-byte) key.
    pub fn short(secret: &str) -> Self {
        let mut bytes = [0u8; SHORT_KEY_LEN];
        let mut material = normalize(secret, SHORT_KEY_LEN);
        bytes.copy_from_slice(&material);
        material.zeroize();
        Self::Short(bytes)
    }

    /// Normalize `secret` into a long (32-byte) key.
    pub fn long(secret: &str) -> Self {
        let mut bytes = [0u8; LONG_KEY_LEN];
        let mut material = normalize(secret, LONG_KEY_LEN);
        bytes.copy_from_slice(&material);
        material.zeroize();
        Self::Long(bytes)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Short(bytes) => bytes,
            Self::Long(bytes) => bytes,
        }
    }
}

impl Drop for CipherKey {
    fn drop(&mut self) {
        match self {
            Self::Short(bytes) => bytes.zeroize(),
            Self::Long(bytes) => bytes.zeroize(),
        }
    }
}

impl fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(_) => f.write_str("CipherKey::Short(..)"),
            Self::Long(_) => f.write_str("CipherKey::Long(..)"),
        }
    }
}

/// The per-account symmetric secret that seals every vault of the account.
///
/// Held in plaintext only inside a session record; at rest it exists only
/// wrapped inside the account's access and recovery envelopes.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct VaultSecret(String);

impl VaultSecret {
    /// Generate a fresh vault secret for a new account.
    ///
    /// Sixteen base64url characters drawn from 12 random bytes.  The
    /// password plays no part: the secret only ever reaches the user
    /// wrapped inside the account envelopes.
    pub fn generate() -> Self {
        let mut random = [0u8; SECRET_RANDOM_LEN];
        rand::rng().fill_bytes(&mut random);
        let secret = URL_SAFE_NO_PAD.encode(random);
        random.zeroize();
        Self(secret)
    }

    /// Rebuild a vault secret read back from a session store.
    pub fn from_stored(secret: String) -> Self {
        Self(secret)
    }

    /// The secret as stored in session records.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// The short cipher key that seals vault contents.
    pub fn cipher_key(&self) -> CipherKey {
        CipherKey::short(&self.0)
    }
}

impl fmt::Debug for VaultSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VaultSecret(..)")
    }
}
