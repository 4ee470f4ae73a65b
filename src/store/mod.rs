//! Persistence collaborators.
//!
//! The service talks to four narrow store contracts.  Any backend that
//! implements them can be plugged in through `PassVault::builder()`:
//!
//! - `AccountStore`: accounts and their escrow envelopes
//! - `VaultStore`: vault rows holding the sealed credential map
//! - `OwnershipStore`: account ↔ vault links
//! - `SessionStore`: expiring session records
//!
//! Two backends ship with the crate: `MemoryStore` and, with the `sqlite`
//! feature, `SqliteStore`.

pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::crypto::VaultSecret;
use crate::session::SessionToken;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

/// Identifier of an account.
pub type AccountId = Uuid;

/// Identifier of a vault.
pub type VaultId = Uuid;

/// Failure kinds reported by a store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    Conflict,

    #[error("store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// A registered account.  Never holds the vault secret in plaintext.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub email: String,
    /// Display name given at registration.
    pub full_name: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// Hex Ed25519 public key.
    pub public_key: String,
    /// Session seed sealed under the password-derived key.
    pub access_envelope: String,
    /// Session seed sealed under the private-key-derived key.
    pub recovery_envelope: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A vault row as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultRecord {
    pub id: VaultId,
    pub name: String,
    /// Envelope over the JSON credential map.
    pub ciphertext: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vault metadata, without ciphertext.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultSummary {
    pub id: VaultId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&VaultRecord> for VaultSummary {
    fn from(record: &VaultRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// A live session as returned by a session store.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub account_id: AccountId,
    pub vault_secret: VaultSecret,
    pub expires_at: DateTime<Utc>,
}

/// Expiry instant for a session written at `now` with `ttl`.
///
/// A TTL past the end of the representable clock is a backend error,
/// never a panic.
pub(crate) fn session_expiry(now: DateTime<Utc>, ttl: Duration) -> StoreResult<DateTime<Utc>> {
    now.checked_add_signed(ttl)
        .ok_or_else(|| StoreError::Backend(format!("session ttl of {ttl} overflows the clock")))
}

impl SessionRecord {
    /// Whether the record has outlived its TTL at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Accounts keyed by id, unique by email.
pub trait AccountStore: Send + Sync {
    /// Insert a new account.  `Conflict` if the email is taken.
    fn create_account(&self, account: &Account) -> StoreResult<AccountId>;

    /// Look an account up by email.  `NotFound` if absent.
    fn get_by_email(&self, email: &str) -> StoreResult<Account>;

    /// Replace the password hash and access envelope together.
    fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
        access_envelope: &str,
    ) -> StoreResult<()>;
}

/// Vault rows.
pub trait VaultStore: Send + Sync {
    fn create_vault(&self, name: &str, ciphertext: &str) -> StoreResult<VaultId>;

    /// `NotFound` if absent.
    fn get_vault(&self, id: VaultId) -> StoreResult<VaultRecord>;

    fn update_name(&self, id: VaultId, name: &str) -> StoreResult<()>;

    fn update_ciphertext(&self, id: VaultId, ciphertext: &str) -> StoreResult<()>;

    /// Hard delete.  Also drops the vault's ownership links.
    fn delete_vault(&self, id: VaultId) -> StoreResult<()>;
}

/// Which accounts may see which vaults.
pub trait OwnershipStore: Send + Sync {
    fn link(&self, account_id: AccountId, vault_id: VaultId) -> StoreResult<()>;

    /// Vaults linked to `account_id`, oldest first, `size` per page.
    fn list_vaults_for_account(
        &self,
        account_id: AccountId,
        page: usize,
        size: usize,
    ) -> StoreResult<Vec<VaultSummary>>;

    fn owns(&self, account_id: AccountId, vault_id: VaultId) -> StoreResult<bool>;
}

/// Expiring session records.
///
/// `get_session` reports a missing and an expired token the same way,
/// as `Ok(None)`.
pub trait SessionStore: Send + Sync {
    fn put_session(
        &self,
        token: &SessionToken,
        account_id: AccountId,
        vault_secret: &VaultSecret,
        ttl: Duration,
    ) -> StoreResult<()>;

    fn get_session(&self, token: &SessionToken) -> StoreResult<Option<SessionRecord>>;

    fn delete_session(&self, token: &SessionToken) -> StoreResult<()>;
}
