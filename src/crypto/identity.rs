//! Ed25519 account identity.
//!
//! The public half is stored with the account (hex, 64 chars).  The
//! private half is the account's offline recovery factor: it is shown to
//! the user once at registration and never persisted.  Its hex form is the
//! 64-byte keypair (seed followed by public key), 128 chars.

use ed25519_dalek::{SigningKey, KEYPAIR_LENGTH, SECRET_KEY_LENGTH};
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{PassVaultError, Result};

/// An Ed25519 keypair identifying one account.
pub struct Identity {
    signing_key: SigningKey,
}

impl Identity {
    /// Generate a new random identity.
    pub fn generate() -> Self {
        let mut seed = [0u8; SECRET_KEY_LENGTH];
        rand::rng().fill_bytes(&mut seed);
        let signing_key = SigningKey::from_bytes(&seed);
        seed.zeroize();
        Self { signing_key }
    }

    /// Rebuild an identity from the hex private key handed out at
    /// registration.
    ///
    /// Fails with a request error if the input is not 128 hex chars or its
    /// embedded public half does not belong to its seed.
    pub fn from_private_hex(private_hex: &str) -> Result<Self> {
        let mut bytes = Zeroizing::new([0u8; KEYPAIR_LENGTH]);
        hex::decode_to_slice(private_hex.trim(), &mut bytes[..])
            .map_err(|_| PassVaultError::Request("malformed private key".into()))?;

        let signing_key = SigningKey::from_keypair_bytes(&bytes)
            .map_err(|_| PassVaultError::Request("malformed private key".into()))?;

        Ok(Self { signing_key })
    }

    /// Lowercase hex of the public key.
    pub fn public_hex(&self) -> String {
        hex::encode(self.signing_key.verifying_key().to_bytes())
    }

    /// Lowercase hex of the full keypair, the form given to the user.
    pub fn private_hex(&self) -> Zeroizing<String> {
        let bytes = Zeroizing::new(self.signing_key.to_keypair_bytes());
        Zeroizing::new(hex::encode(&bytes[..]))
    }

    /// Whether this identity's public key equals `public_hex`.
    ///
    /// Compared in constant time.
    pub fn matches_public_hex(&self, public_hex: &str) -> bool {
        let ours = self.public_hex();
        ours.as_bytes()
            .ct_eq(public_hex.trim().to_ascii_lowercase().as_bytes())
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_lengths() {
        let identity = Identity::generate();
        assert_eq!(identity.public_hex().len(), 64);
        assert_eq!(identity.private_hex().len(), 128);
    }

    #[test]
    fn private_hex_roundtrip_keeps_public_key() {
        let identity = Identity::generate();
        let restored = Identity::from_private_hex(&identity.private_hex()).unwrap();
        assert_eq!(restored.public_hex(), identity.public_hex());
        assert!(restored.matches_public_hex(&identity.public_hex()));
    }

    #[test]
    fn uppercase_private_hex_is_accepted() {
        let identity = Identity::generate();
        let upper = identity.private_hex().to_ascii_uppercase();
        let restored = Identity::from_private_hex(&upper).unwrap();
        assert_eq!(*restored.private_hex(), *identity.private_hex());
    }

    #[test]
    fn other_identity_does_not_match() {
        let a = Identity::generate();
        let b = Identity::generate();
        assert!(!a.matches_public_hex(&b.public_hex()));
    }

    #[test]
    fn malformed_private_key_is_request_error() {
        assert!(matches!(
            Identity::from_private_hex("zz"),
            Err(PassVaultError::Request(_))
        ));
        assert!(matches!(
            Identity::from_private_hex(&"ab".repeat(32)),
            Err(PassVaultError::Request(_))
        ));
    }

    #[test]
    fn mismatched_public_half_is_rejected() {
        let a = Identity::generate();
        let b = Identity::generate();
        let spliced = format!("{}{}", &a.private_hex()[..64], b.public_hex());
        assert!(Identity::from_private_hex(&spliced).is_err());
    }
}
