//! Service assembly.
//!
//! Each setter replaces whatever was set before for that collaborator, so
//! when the same collaborator is set twice the last call wins.  `store`
//! sets all four at once; a later `sessions(..)` can still move sessions
//! to a different backend.

use std::sync::Arc;

use chrono::Duration;

use super::PassVault;
use crate::crypto::Argon2Params;
use crate::errors::{PassVaultError, Result};
use crate::session::{SessionCustody, DEFAULT_TTL_MINUTES, MAX_TTL_MINUTES};
use crate::store::{AccountStore, OwnershipStore, SessionStore, VaultStore};

/// Page size used when listing an account's vaults.
pub const DEFAULT_LIST_PAGE_SIZE: usize = 1000;

/// Typed service configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Lifetime of every minted session token.
    pub session_ttl: Duration,
    /// Cost parameters for new password hashes.
    pub argon2: Argon2Params,
    /// How many vaults `list_vaults` returns.
    pub list_page_size: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            session_ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
            argon2: Argon2Params::default(),
            list_page_size: DEFAULT_LIST_PAGE_SIZE,
        }
    }
}

/// Builder for `PassVault`.
#[derive(Default)]
pub struct PassVaultBuilder {
    accounts: Option<Arc<dyn AccountStore>>,
    vaults: Option<Arc<dyn VaultStore>>,
    ownership: Option<Arc<dyn OwnershipStore>>,
    sessions: Option<Arc<dyn SessionStore>>,
    config: ServiceConfig,
}

impl PassVaultBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use one backend for all four collaborators.
    pub fn store<S>(self, store: Arc<S>) -> Self
    where
        S: AccountStore + VaultStore + OwnershipStore + SessionStore + 'static,
    {
        self.accounts(store.clone())
            .vaults(store.clone())
            .ownership(store.clone())
            .sessions(store)
    }

    pub fn accounts(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.accounts = Some(store);
        self
    }

    pub fn vaults(mut self, store: Arc<dyn VaultStore>) -> Self {
        self.vaults = Some(store);
        self
    }

    pub fn ownership(mut self, store: Arc<dyn OwnershipStore>) -> Self {
        self.ownership = Some(store);
        self
    }

    pub fn sessions(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish assembly.  Every collaborator must have been set.
    pub fn build(self) -> Result<PassVault> {
        self.config.argon2.validate()?;
        let ttl = self.config.session_ttl;
        if ttl < Duration::zero() || ttl > Duration::minutes(MAX_TTL_MINUTES) {
            return Err(PassVaultError::ConfigError(format!(
                "session ttl must be between 0 and {MAX_TTL_MINUTES} minutes"
            )));
        }
        if self.config.list_page_size == 0 {
            return Err(PassVaultError::ConfigError(
                "list page size must be at least 1".into(),
            ));
        }

        let missing = |what: &str| PassVaultError::ConfigError(format!("no {what} store configured"));

        let sessions = self.sessions.ok_or_else(|| missing("session"))?;
        Ok(PassVault {
            accounts: self.accounts.ok_or_else(|| missing("account"))?,
            vaults: self.vaults.ok_or_else(|| missing("vault"))?,
            ownership: self.ownership.ok_or_else(|| missing("ownership"))?,
            sessions: SessionCustody::new(sessions, self.config.session_ttl),
            config: self.config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn missing_collaborator_fails() {
        let result = PassVaultBuilder::new()
            .accounts(Arc::new(MemoryStore::new()))
            .build();
        assert!(matches!(result, Err(PassVaultError::ConfigError(_))));
    }

    #[test]
    fn single_store_sets_everything() {
        assert!(PassVaultBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .build()
            .is_ok());
    }

    #[test]
    fn zero_page_size_rejected() {
        let config = ServiceConfig {
            list_page_size: 0,
            ..ServiceConfig::default()
        };
        let result = PassVaultBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .config(config)
            .build();
        assert!(matches!(result, Err(PassVaultError::ConfigError(_))));
    }

    #[test]
    fn oversized_ttl_rejected() {
        let config = ServiceConfig {
            session_ttl: Duration::minutes(MAX_TTL_MINUTES + 1),
            ..ServiceConfig::default()
        };
        let result = PassVaultBuilder::new()
            .store(Arc::new(MemoryStore::new()))
            .config(config)
            .build();
        assert!(matches!(result, Err(PassVaultError::ConfigError(_))));
    }

    #[test]
    fn last_setter_wins() {
        let shared = Arc::new(MemoryStore::new());
        let sessions = Arc::new(MemoryStore::new());
        let service = PassVaultBuilder::new()
            .store(shared.clone())
            .sessions(sessions.clone())
            .config(ServiceConfig {
                argon2: Argon2Params {
                    memory_kib: 8_192,
                    iterations: 1,
                    parallelism: 1,
                },
                ..ServiceConfig::default()
            })
            .build()
            .unwrap();

        service.register("a@example.com", "A", "password-123").unwrap();
        service.login("a@example.com", "password-123").unwrap();

        assert_eq!(shared.session_count(), 0);
        assert_eq!(sessions.session_count(), 1);
    }
}
