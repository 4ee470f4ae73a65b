//! The PassVault service: account custody and vault operations.
//!
//! `PassVault` wires the store collaborators, session custody and the
//! crypto layer together.  Account operations live in `account`, vault
//! operations in `vaults`.  Build one with `PassVault::builder()`.

mod account;
mod builder;
mod vaults;

use std::fmt;
use std::sync::Arc;

use zeroize::Zeroizing;

pub use account::MIN_PASSWORD_LEN;
pub use builder::{PassVaultBuilder, ServiceConfig, DEFAULT_LIST_PAGE_SIZE};
pub use vaults::CreatedVault;

use crate::errors::PassVaultError;
use crate::session::{SessionCustody, SessionToken};
use crate::store::{AccountId, AccountStore, OwnershipStore, StoreError, VaultStore};

/// The assembled service.  Cheap to share behind an `Arc`.
pub struct PassVault {
    accounts: Arc<dyn AccountStore>,
    vaults: Arc<dyn VaultStore>,
    ownership: Arc<dyn OwnershipStore>,
    sessions: SessionCustody,
    config: ServiceConfig,
}

impl PassVault {
    pub fn builder() -> PassVaultBuilder {
        PassVaultBuilder::new()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Result of a successful registration.
///
/// `private_key` is the account's only recovery factor.  It is not stored
/// anywhere; this is the one time it is shown.
pub struct Registration {
    pub account_id: AccountId,
    pub public_key: String,
    pub private_key: Zeroizing<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("account_id", &self.account_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// The value of an authorized vault operation plus the token to use next.
///
/// `token` is a freshly rotated sibling of the presented token, or the
/// presented token itself if rotation failed.  Both remain valid.
#[derive(Debug, Clone)]
pub struct Authorized<T> {
    pub token: SessionToken,
    pub value: T,
}

/// Map a store error raised while working on `context`.
///
/// `NotFound` keeps its kind; every other store failure is a process error.
fn store_error(context: &'static str) -> impl FnOnce(StoreError) -> PassVaultError {
    move |e| match e {
        StoreError::NotFound => PassVaultError::NotFound(context.to_string()),
        other => PassVaultError::process(context, other),
    }
}
