//! Key custody: escrow of the vault secret under two independent keys.
//!
//! At registration the account's session seed `(account id, vault secret)`
//! is sealed twice with the same primitive:
//!
//! - the access envelope, under the password normalized to a short key;
//! - the recovery envelope, under the private key hex normalized to a long key.
//!
//! Either envelope alone recovers the identical seed, so losing the
//! password never strands vault contents.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::crypto::{self, CipherKey, Identity, VaultSecret};
use crate::errors::{PassVaultError, Result};
use crate::store::AccountId;

/// The pair wrapped inside both account envelopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSeed {
    #[serde(rename = "userId")]
    pub account_id: AccountId,
    #[serde(rename = "secretKey")]
    pub vault_secret: VaultSecret,
}

impl SessionSeed {
    /// A fresh seed with a newly generated vault secret.
    pub fn generate(account_id: AccountId) -> Self {
        Self {
            account_id,
            vault_secret: VaultSecret::generate(),
        }
    }
}

/// Both envelopes of a newly provisioned account.
#[derive(Debug, Clone)]
pub struct Escrow {
    pub access_envelope: String,
    pub recovery_envelope: String,
}

/// Key for the access envelope.
pub fn password_key(password: &str) -> CipherKey {
    CipherKey::short(password)
}

/// Key for the recovery envelope.
///
/// Derived from the canonical (lowercase) hex form of the identity, so the
/// user may type the key back in either case.
pub fn recovery_key(identity: &Identity) -> CipherKey {
    CipherKey::long(&identity.private_hex())
}

/// Seal a seed under `key`.  Shared by both escrow paths.
pub fn wrap(seed: &SessionSeed, key: &CipherKey) -> Result<String> {
    let json = Zeroizing::new(
        serde_json::to_string(seed).map_err(|e| PassVaultError::process("seed encode", e))?,
    );
    crypto::seal(&json, key)
}

/// Recover a seed from an envelope.  Shared by both escrow paths.
///
/// Callers only reach this after authenticating the user, so a failure
/// here is an internal-consistency fault, not a user error.
pub fn unwrap(envelope: &str, key: &CipherKey) -> Result<SessionSeed> {
    let json = Zeroizing::new(
        crypto::open(envelope, key).map_err(|e| PassVaultError::process("seed envelope", e))?,
    );
    serde_json::from_str(&json).map_err(|e| PassVaultError::process("seed decode", e))
}

/// Produce both envelopes for a new account.
pub fn escrow(seed: &SessionSeed, password: &str, identity: &Identity) -> Result<Escrow> {
    Ok(Escrow {
        access_envelope: wrap(seed, &password_key(password))?,
        recovery_envelope: wrap(seed, &recovery_key(identity))?,
    })
}

/// Login path: open the access envelope with the password.
pub fn unwrap_with_password(access_envelope: &str, password: &str) -> Result<SessionSeed> {
    unwrap(access_envelope, &password_key(password))
}

/// Recovery path: open the recovery envelope with the private key.
pub fn unwrap_with_private_key(recovery_envelope: &str, identity: &Identity) -> Result<SessionSeed> {
    unwrap(recovery_envelope, &recovery_key(identity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn both_paths_recover_identical_seed() {
        let identity = Identity::generate();
        let seed = SessionSeed::generate(Uuid::new_v4());
        let escrow = escrow(&seed, "correcthorsebattery", &identity).unwrap();

        let via_password =
            unwrap_with_password(&escrow.access_envelope, "correcthorsebattery").unwrap();
        let via_key = unwrap_with_private_key(&escrow.recovery_envelope, &identity).unwrap();

        assert_eq!(via_password, seed);
        assert_eq!(via_key, seed);
    }

    #[test]
    fn wrong_password_is_process_error() {
        let identity = Identity::generate();
        let seed = SessionSeed::generate(Uuid::new_v4());
        let escrow = escrow(&seed, "correcthorsebattery", &identity).unwrap();

        assert!(matches!(
            unwrap_with_password(&escrow.access_envelope, "not-the-password"),
            Err(PassVaultError::Process(_))
        ));
    }

    #[test]
    fn other_identity_cannot_open_recovery() {
        let seed = SessionSeed::generate(Uuid::new_v4());
        let escrow = escrow(&seed, "pw-12345678", &Identity::generate()).unwrap();
        assert!(unwrap_with_private_key(&escrow.recovery_envelope, &Identity::generate()).is_err());
    }

    #[test]
    fn seed_json_uses_wire_names() {
        let seed = SessionSeed {
            account_id: Uuid::nil(),
            vault_secret: VaultSecret::from_stored("0123456789abcdef".into()),
        };
        let json = serde_json::to_string(&seed).unwrap();
        assert_eq!(
            json,
            r#"{"userId":"00000000-0000-0000-0000-000000000000","secretKey":"0123456789abcdef"}"#
        );
    }
}
