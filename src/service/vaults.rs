//! Vault operations.
//!
//! Every operation resolves the presented session first, checks that the
//! target vault is linked to the session's account, does its work, then
//! rotates the session.  Credential changes go through one path:
//! open the ciphertext, merge one entry, seal the whole map again.

use tracing::{debug, info};
use uuid::Uuid;

use super::{store_error, Authorized, PassVault};
use crate::errors::{PassVaultError, Result};
use crate::session::Session;
use crate::store::{VaultId, VaultSummary};
use crate::vault::{merge, new_entry_id, open_map, seal_map, Credential, CredentialMap};

/// A newly created vault and its (plaintext) initial contents.
#[derive(Debug, Clone)]
pub struct CreatedVault {
    pub id: VaultId,
    pub credentials: CredentialMap,
}

fn parse_vault_id(raw: &str) -> Result<VaultId> {
    Uuid::parse_str(raw.trim()).map_err(|_| PassVaultError::Request("malformed vault id".into()))
}

fn validate_vault_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PassVaultError::Request("vault name is required".into()));
    }
    Ok(())
}

impl PassVault {
    /// Create a vault holding a single entry and link it to the caller.
    pub fn create_vault(
        &self,
        token: &str,
        name: &str,
        initial: Credential,
    ) -> Result<Authorized<CreatedVault>> {
        let session = self.sessions.resolve(token)?;
        validate_vault_name(name)?;
        initial.validate()?;

        let credentials = merge(CredentialMap::new(), &new_entry_id(), Some(initial));
        let ciphertext = seal_map(&credentials, &session.vault_secret)?;

        let id = self
            .vaults
            .create_vault(name, &ciphertext)
            .map_err(|e| PassVaultError::process("vault create", e))?;
        self.ownership
            .link(session.account_id, id)
            .map_err(|e| PassVaultError::process("vault link", e))?;

        info!(account_id = %session.account_id, vault_id = %id, "vault created");
        Ok(self.authorized(&session, CreatedVault { id, credentials }))
    }

    /// Metadata for every vault the caller owns.  Nothing is decrypted.
    pub fn list_vaults(&self, token: &str) -> Result<Authorized<Vec<VaultSummary>>> {
        let session = self.sessions.resolve(token)?;
        let vaults = self
            .ownership
            .list_vaults_for_account(session.account_id, 0, self.config.list_page_size)
            .map_err(|e| PassVaultError::process("vault list", e))?;

        debug!(account_id = %session.account_id, count = vaults.len(), "vaults listed");
        Ok(self.authorized(&session, vaults))
    }

    /// Decrypt and return a vault's credential map.
    ///
    /// A ciphertext the session's secret cannot open is `AccessDenied`.
    pub fn get_vault(&self, token: &str, vault_id: &str) -> Result<Authorized<CredentialMap>> {
        let session = self.sessions.resolve(token)?;
        let id = self.owned_vault(&session, vault_id)?;

        let record = self.vaults.get_vault(id).map_err(store_error("vault"))?;
        let credentials = open_map(&record.ciphertext, &session.vault_secret)?;

        debug!(vault_id = %id, entries = credentials.len(), "vault opened");
        Ok(self.authorized(&session, credentials))
    }

    /// Add an entry under a freshly generated id.  Returns the merged map.
    pub fn add_credential(
        &self,
        token: &str,
        vault_id: &str,
        entry: Credential,
    ) -> Result<Authorized<CredentialMap>> {
        let session = self.sessions.resolve(token)?;
        entry.validate()?;
        let id = self.owned_vault(&session, vault_id)?;

        let credentials = self.rewrite_entry(&session, id, &new_entry_id(), Some(entry))?;
        Ok(self.authorized(&session, credentials))
    }

    /// Overwrite (or insert) the entry stored under `entry_id`.
    pub fn update_credential(
        &self,
        token: &str,
        vault_id: &str,
        entry_id: &str,
        entry: Credential,
    ) -> Result<Authorized<CredentialMap>> {
        let session = self.sessions.resolve(token)?;
        if entry_id.trim().is_empty() {
            return Err(PassVaultError::Request("entry id is required".into()));
        }
        entry.validate()?;
        let id = self.owned_vault(&session, vault_id)?;

        let credentials = self.rewrite_entry(&session, id, entry_id, Some(entry))?;
        Ok(self.authorized(&session, credentials))
    }

    /// Remove an entry.  Removing an id that is not there is a no-op.
    pub fn delete_credential(
        &self,
        token: &str,
        vault_id: &str,
        entry_id: &str,
    ) -> Result<Authorized<CredentialMap>> {
        let session = self.sessions.resolve(token)?;
        let id = self.owned_vault(&session, vault_id)?;

        let credentials = self.rewrite_entry(&session, id, entry_id, None)?;
        Ok(self.authorized(&session, credentials))
    }

    pub fn rename_vault(&self, token: &str, vault_id: &str, name: &str) -> Result<Authorized<()>> {
        let session = self.sessions.resolve(token)?;
        validate_vault_name(name)?;
        let id = self.owned_vault(&session, vault_id)?;

        self.vaults.update_name(id, name).map_err(store_error("vault"))?;

        debug!(vault_id = %id, "vault renamed");
        Ok(self.authorized(&session, ()))
    }

    /// Hard-delete a vault.  The store drops its ownership links with it.
    pub fn delete_vault(&self, token: &str, vault_id: &str) -> Result<Authorized<()>> {
        let session = self.sessions.resolve(token)?;
        let id = self.owned_vault(&session, vault_id)?;

        self.vaults.delete_vault(id).map_err(store_error("vault"))?;

        info!(account_id = %session.account_id, vault_id = %id, "vault deleted");
        Ok(self.authorized(&session, ()))
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    /// Parse `raw` and require the session's account to own it.
    fn owned_vault(&self, session: &Session, raw: &str) -> Result<VaultId> {
        let id = parse_vault_id(raw)?;
        let owned = self
            .ownership
            .owns(session.account_id, id)
            .map_err(|e| PassVaultError::process("vault ownership", e))?;
        if !owned {
            return Err(PassVaultError::AccessDenied);
        }
        Ok(id)
    }

    /// Open, merge one entry, seal, persist.
    ///
    /// Not atomic: two concurrent rewrites of one vault race and the later
    /// write wins.
    fn rewrite_entry(
        &self,
        session: &Session,
        id: VaultId,
        entry_id: &str,
        value: Option<Credential>,
    ) -> Result<CredentialMap> {
        let record = self.vaults.get_vault(id).map_err(store_error("vault"))?;
        let current = open_map(&record.ciphertext, &session.vault_secret)?;

        let merged = merge(current, entry_id, value);
        let ciphertext = seal_map(&merged, &session.vault_secret)?;
        self.vaults
            .update_ciphertext(id, &ciphertext)
            .map_err(store_error("vault"))?;

        debug!(vault_id = %id, entries = merged.len(), "vault rewritten");
        Ok(merged)
    }

    fn authorized<T>(&self, session: &Session, value: T) -> Authorized<T> {
        Authorized {
            token: self.sessions.rotate(session),
            value,
        }
    }
}
