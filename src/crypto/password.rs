//! Password hashing using Argon2id.
//!
//! Account passwords are stored only as salted Argon2id hashes in PHC
//! string form (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the
//! parameters travel with each hash and verification needs no config.
//! The hash is for verification only; it never feeds a cipher key.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;

use crate::errors::{PassVaultError, Result};

/// Length of the salt in bytes (the PHC recommended 128 bits).
const SALT_LEN: usize = 16;

/// Minimum safe memory cost in KiB (8 MB).
const MIN_MEMORY_KIB: u32 = 8_192;

/// Configurable Argon2id parameters.
///
/// These map 1:1 to the fields in `Settings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
    /// Memory cost in KiB (default: 65 536 = 64 MB).
    pub memory_kib: u32,
    /// Number of iterations (default: 3).
    pub iterations: u32,
    /// Parallelism lanes (default: 4).
    pub parallelism: u32,
}

impl Default for Argon2Params {
    fn default() -> Self {
        Self {
            memory_kib: 65_536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

impl Argon2Params {
    /// Enforce minimum parameters so a config typo cannot make hashes cheap.
    pub fn validate(&self) -> Result<()> {
        if self.memory_kib < MIN_MEMORY_KIB {
            return Err(PassVaultError::ConfigError(format!(
                "Argon2 memory_kib must be at least {MIN_MEMORY_KIB} (got {})",
                self.memory_kib
            )));
        }
        if self.iterations < 1 {
            return Err(PassVaultError::ConfigError(
                "Argon2 iterations must be at least 1".into(),
            ));
        }
        if self.parallelism < 1 {
            return Err(PassVaultError::ConfigError(
                "Argon2 parallelism must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str, params: &Argon2Params) -> Result<String> {
    params.validate()?;

    let argon2_params = Params::new(
        params.memory_kib,
        params.iterations,
        params.parallelism,
        None,
    )
    .map_err(|e| PassVaultError::process("password hash params", e))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, argon2_params);

    let salt = SaltString::encode_b64(&generate_salt())
        .map_err(|e| PassVaultError::process("password hash salt", e))?;

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PassVaultError::process("password hash", e))?;

    Ok(hash.to_string())
}

/// Check `password` against a stored PHC hash.
///
/// A mismatch is `Ok(false)`; an unparsable stored hash is a process error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| PassVaultError::process("stored password hash", e))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// Generate a cryptographically random salt.
fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_params() -> Argon2Params {
        Argon2Params {
            memory_kib: MIN_MEMORY_KIB,
            iterations: 1,
            parallelism: 1,
        }
    }

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("correcthorsebattery", &fast_params()).unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correcthorsebattery", &hash).unwrap());
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differ() {
        let a = hash_password("same", &fast_params()).unwrap();
        let b = hash_password("same", &fast_params()).unwrap();
        assert_ne!(a, b, "salts must differ");
    }

    #[test]
    fn garbage_hash_is_process_error() {
        assert!(matches!(
            verify_password("pw", "not-a-phc-string"),
            Err(PassVaultError::Process(_))
        ));
    }

    #[test]
    fn weak_params_rejected() {
        let weak = Argon2Params {
            memory_kib: 1024,
            ..fast_params()
        };
        assert!(hash_password("pw", &weak).is_err());

        let no_iterations = Argon2Params {
            iterations: 0,
            ..fast_params()
        };
        assert!(no_iterations.validate().is_err());
    }
}
