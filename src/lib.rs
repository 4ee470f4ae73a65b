//! PassVault: encrypted credential vaults behind rotating sessions.
//!
//! Each account holds one vault secret, escrowed twice at registration:
//! once under the password and once under an Ed25519 private key handed
//! to the user.  Sessions carry the vault secret; every vault's credential
//! map is sealed under it with AES-GCM.

#[cfg(feature = "sqlite")]
pub mod cli;
pub mod config;
pub mod crypto;
pub mod custody;
pub mod errors;
pub mod service;
pub mod session;
pub mod store;
pub mod vault;

pub use errors::{PassVaultError, Result};
pub use service::{Authorized, CreatedVault, PassVault, PassVaultBuilder, Registration, ServiceConfig};
