//! In-process store backed by hash maps behind a mutex.
//!
//! Implements all four store contracts, so one `MemoryStore` can back a
//! whole service.  Nothing survives the process.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use chrono::{Duration, Utc};
use uuid::Uuid;

use super::{
    session_expiry, Account, AccountId, AccountStore, OwnershipStore, SessionRecord, SessionStore,
    StoreError, StoreResult, VaultId, VaultRecord, VaultStore, VaultSummary,
};
use crate::crypto::VaultSecret;
use crate::session::SessionToken;

#[derive(Default)]
struct Tables {
    accounts: HashMap<AccountId, Account>,
    vaults: HashMap<VaultId, VaultRecord>,
    links: HashSet<(AccountId, VaultId)>,
    sessions: HashMap<SessionToken, SessionRecord>,
}

/// Memory-only implementation of every store contract.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
    }

    /// Number of session records currently held, expired ones included.
    pub fn session_count(&self) -> usize {
        self.lock().map(|t| t.sessions.len()).unwrap_or(0)
    }
}

impl AccountStore for MemoryStore {
    fn create_account(&self, account: &Account) -> StoreResult<AccountId> {
        let mut tables = self.lock()?;
        if tables
            .accounts
            .values()
            .any(|existing| existing.email == account.email)
        {
            return Err(StoreError::Conflict);
        }
        tables.accounts.insert(account.id, account.clone());
        Ok(account.id)
    }

    fn get_by_email(&self, email: &str) -> StoreResult<Account> {
        self.lock()?
            .accounts
            .values()
            .find(|account| account.email == email)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
        access_envelope: &str,
    ) -> StoreResult<()> {
        let mut tables = self.lock()?;
        let account = tables.accounts.get_mut(&id).ok_or(StoreError::NotFound)?;
        account.password_hash = password_hash.to_string();
        account.access_envelope = access_envelope.to_string();
        account.updated_at = Utc::now();
        Ok(())
    }
}

impl VaultStore for MemoryStore {
    fn create_vault(&self, name: &str, ciphertext: &str) -> StoreResult<VaultId> {
        let now = Utc::now();
        let record = VaultRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            ciphertext: ciphertext.to_string(),
            created_at: now,
            updated_at: now,
        };
        let id = record.id;
        self.lock()?.vaults.insert(id, record);
        Ok(id)
    }

    fn get_vault(&self, id: VaultId) -> StoreResult<VaultRecord> {
        self.lock()?
            .vaults
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    fn update_name(&self, id: VaultId, name: &str) -> StoreResult<()> {
        let mut tables = self.lock()?;
        let vault = tables.vaults.get_mut(&id).ok_or(StoreError::NotFound)?;
        vault.name = name.to_string();
        vault.updated_at = Utc::now();
        Ok(())
    }

    fn update_ciphertext(&self, id: VaultId, ciphertext: &str) -> StoreResult<()> {
        let mut tables = self.lock()?;
        let vault = tables.vaults.get_mut(&id).ok_or(StoreError::NotFound)?;
        vault.ciphertext = ciphertext.to_string();
        vault.updated_at = Utc::now();
        Ok(())
    }

    fn delete_vault(&self, id: VaultId) -> StoreResult<()> {
        let mut tables = self.lock()?;
        if tables.vaults.remove(&id).is_none() {
            return Err(StoreError::NotFound);
        }
        tables.links.retain(|(_, vault_id)| *vault_id != id);
        Ok(())
    }
}

impl OwnershipStore for MemoryStore {
    fn link(&self, account_id: AccountId, vault_id: VaultId) -> StoreResult<()> {
        self.lock()?.links.insert((account_id, vault_id));
        Ok(())
    }

    fn list_vaults_for_account(
        &self,
        account_id: AccountId,
        page: usize,
        size: usize,
    ) -> StoreResult<Vec<VaultSummary>> {
        let tables = self.lock()?;
        let mut owned: Vec<VaultSummary> = tables
            .links
            .iter()
            .filter(|(owner, _)| *owner == account_id)
            .filter_map(|(_, vault_id)| tables.vaults.get(vault_id))
            .map(VaultSummary::from)
            .collect();

        owned.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(owned
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect())
    }

    fn owns(&self, account_id: AccountId, vault_id: VaultId) -> StoreResult<bool> {
        Ok(self.lock()?.links.contains(&(account_id, vault_id)))
    }
}

impl SessionStore for MemoryStore {
    fn put_session(
        &self,
        token: &SessionToken,
        account_id: AccountId,
        vault_secret: &VaultSecret,
        ttl: Duration,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let record = SessionRecord {
            account_id,
            vault_secret: vault_secret.clone(),
            expires_at: session_expiry(now, ttl)?,
        };

        // Rotated-away tokens are never presented again; drop them here.
        let mut tables = self.lock()?;
        tables.sessions.retain(|_, r| !r.is_expired_at(now));
        tables.sessions.insert(*token, record);
        Ok(())
    }

    fn get_session(&self, token: &SessionToken) -> StoreResult<Option<SessionRecord>> {
        let mut tables = self.lock()?;
        let expired = match tables.sessions.get(token) {
            Some(record) => record.is_expired_at(Utc::now()),
            None => return Ok(None),
        };
        if expired {
            tables.sessions.remove(token);
            return Ok(None);
        }
        Ok(tables.sessions.get(token).cloned())
    }

    fn delete_session(&self, token: &SessionToken) -> StoreResult<()> {
        self.lock()?.sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(email: &str) -> Account {
        let now = Utc::now();
        Account {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: "Test User".into(),
            password_hash: "$argon2id$stub".into(),
            public_key: "ab".repeat(32),
            access_envelope: "access".into(),
            recovery_envelope: "recovery".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_account(&account("a@example.com")).unwrap();
        assert_eq!(
            store.create_account(&account("a@example.com")),
            Err(StoreError::Conflict)
        );
    }

    #[test]
    fn missing_account_is_not_found() {
        let store = MemoryStore::new();
        assert_eq!(
            store.get_by_email("nobody@example.com"),
            Err(StoreError::NotFound)
        );
    }

    #[test]
    fn update_password_replaces_both_fields() {
        let store = MemoryStore::new();
        let acc = account("a@example.com");
        store.create_account(&acc).unwrap();
        store.update_password(acc.id, "new-hash", "new-env").unwrap();

        let fetched = store.get_by_email("a@example.com").unwrap();
        assert_eq!(fetched.password_hash, "new-hash");
        assert_eq!(fetched.access_envelope, "new-env");
        assert_eq!(fetched.recovery_envelope, "recovery");
    }

    #[test]
    fn delete_vault_drops_links() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let id = store.create_vault("mail", "ct").unwrap();
        store.link(owner, id).unwrap();
        assert!(store.owns(owner, id).unwrap());

        store.delete_vault(id).unwrap();
        assert!(!store.owns(owner, id).unwrap());
        assert_eq!(store.get_vault(id), Err(StoreError::NotFound));
        assert_eq!(store.delete_vault(id), Err(StoreError::NotFound));
    }

    #[test]
    fn list_is_paged_and_scoped_to_owner() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        for i in 0..5 {
            let id = store.create_vault(&format!("v{i}"), "ct").unwrap();
            store.link(owner, id).unwrap();
        }
        let foreign = store.create_vault("foreign", "ct").unwrap();
        store.link(other, foreign).unwrap();

        assert_eq!(store.list_vaults_for_account(owner, 0, 100).unwrap().len(), 5);
        assert_eq!(store.list_vaults_for_account(owner, 0, 2).unwrap().len(), 2);
        assert_eq!(store.list_vaults_for_account(owner, 2, 2).unwrap().len(), 1);
        assert_eq!(store.list_vaults_for_account(other, 0, 100).unwrap().len(), 1);
    }

    #[test]
    fn expired_session_reads_as_miss() {
        let store = MemoryStore::new();
        let token = SessionToken::generate();
        let secret = VaultSecret::from_stored("0123456789abcdef".into());

        store
            .put_session(&token, Uuid::new_v4(), &secret, Duration::zero())
            .unwrap();
        assert!(store.get_session(&token).unwrap().is_none());
        assert_eq!(store.session_count(), 0, "expired record is purged");
    }

    #[test]
    fn writes_purge_every_expired_session() {
        let store = MemoryStore::new();
        let secret = VaultSecret::from_stored("0123456789abcdef".into());
        let account_id = Uuid::new_v4();

        // A chain of rotations whose old tokens are never presented again.
        for _ in 0..10 {
            store
                .put_session(&SessionToken::generate(), account_id, &secret, Duration::zero())
                .unwrap();
        }
        let live = SessionToken::generate();
        store
            .put_session(&live, account_id, &secret, Duration::minutes(30))
            .unwrap();

        assert_eq!(store.session_count(), 1);
        assert!(store.get_session(&live).unwrap().is_some());
    }

    #[test]
    fn overflowing_ttl_is_backend_error() {
        let store = MemoryStore::new();
        let secret = VaultSecret::from_stored("0123456789abcdef".into());
        let result = store.put_session(
            &SessionToken::generate(),
            Uuid::new_v4(),
            &secret,
            Duration::MAX,
        );
        assert!(matches!(result, Err(StoreError::Backend(_))));
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn live_session_roundtrip_and_delete() {
        let store = MemoryStore::new();
        let token = SessionToken::generate();
        let account_id = Uuid::new_v4();
        let secret = VaultSecret::from_stored("0123456789abcdef".into());

        store
            .put_session(&token, account_id, &secret, Duration::minutes(30))
            .unwrap();
        let record = store.get_session(&token).unwrap().unwrap();
        assert_eq!(record.account_id, account_id);
        assert_eq!(record.vault_secret, secret);

        store.delete_session(&token).unwrap();
        assert!(store.get_session(&token).unwrap().is_none());
    }
}
