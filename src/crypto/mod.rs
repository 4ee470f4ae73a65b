//! Cryptographic primitives for PassVault.
//!
//! This module provides:
//! - The AES-GCM envelope cipher, `seal`/`open` (`encryption`)
//! - The key padding normalizer (`padding`)
//! - Fixed-length cipher keys and the vault secret (`keys`)
//! - Ed25519 account identities (`identity`)
//! - Argon2id password hashing (`password`)

pub mod encryption;
pub mod identity;
pub mod keys;
pub mod padding;
pub mod password;

pub use encryption::{open, seal, AuthFailure};
pub use identity::Identity;
pub use keys::{CipherKey, VaultSecret, LONG_KEY_LEN, SHORT_KEY_LEN};
pub use padding::normalize;
pub use password::{hash_password, verify_password, Argon2Params};
