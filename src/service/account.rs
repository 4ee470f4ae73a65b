//! Account custody operations: register, login, recover, password changes.

use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;
use tracing::info;
use uuid::Uuid;

use super::{store_error, PassVault, Registration};
use crate::crypto::{hash_password, verify_password, Identity};
use crate::custody::{self, SessionSeed};
use crate::errors::{PassVaultError, Result};
use crate::session::SessionToken;
use crate::store::{Account, StoreError};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 8;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap_or_else(|_| unreachable!("static pattern"))
    })
}

fn validate_email(email: &str) -> Result<()> {
    if email_pattern().is_match(email) {
        Ok(())
    } else {
        Err(PassVaultError::Request(format!("'{email}' is not a valid email")))
    }
}

/// Trimmed full name; blank is a request error.
fn validate_full_name(full_name: &str) -> Result<&str> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(PassVaultError::Request("full name is required".into()));
    }
    Ok(trimmed)
}

fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PassVaultError::Request(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl PassVault {
    /// Create an account and escrow a fresh vault secret for it.
    ///
    /// Returns the private key exactly once.  A taken email is `DataExists`.
    pub fn register(&self, email: &str, full_name: &str, password: &str) -> Result<Registration> {
        validate_email(email)?;
        let full_name = validate_full_name(full_name)?;
        validate_new_password(password)?;

        match self.accounts.get_by_email(email) {
            Ok(_) => return Err(PassVaultError::DataExists("email already registered".into())),
            Err(StoreError::NotFound) => {}
            Err(e) => return Err(PassVaultError::process("account lookup", e)),
        }

        let password_hash = hash_password(password, &self.config.argon2)?;
        let identity = Identity::generate();
        let account_id = Uuid::new_v4();

        let seed = SessionSeed::generate(account_id);
        let escrow = custody::escrow(&seed, password, &identity)?;

        let now = Utc::now();
        let account = Account {
            id: account_id,
            email: email.to_string(),
            full_name: full_name.to_string(),
            password_hash,
            public_key: identity.public_hex(),
            access_envelope: escrow.access_envelope,
            recovery_envelope: escrow.recovery_envelope,
            created_at: now,
            updated_at: now,
        };

        self.accounts
            .create_account(&account)
            .map_err(|e| match e {
                StoreError::Conflict => PassVaultError::DataExists("email already registered".into()),
                other => PassVaultError::process("account create", other),
            })?;

        info!(%account_id, "account registered");
        Ok(Registration {
            account_id,
            public_key: account.public_key,
            private_key: identity.private_hex(),
        })
    }

    /// Check email and password and open a session.
    pub fn login(&self, email: &str, password: &str) -> Result<SessionToken> {
        let account = self.authenticate(email, password)?;
        let seed = custody::unwrap_with_password(&account.access_envelope, password)?;
        let token = self.open_session(&account, &seed)?;

        info!(account_id = %account.id, "login");
        Ok(token)
    }

    /// Open a session with the private key instead of the password.
    pub fn recover(&self, email: &str, private_key: &str) -> Result<SessionToken> {
        let (account, identity) = self.authenticate_with_key(email, private_key)?;
        let seed = custody::unwrap_with_private_key(&account.recovery_envelope, &identity)?;
        let token = self.open_session(&account, &seed)?;

        info!(account_id = %account.id, "session recovered with private key");
        Ok(token)
    }

    /// Revoke a session token.
    pub fn logout(&self, token: &str) -> Result<()> {
        self.sessions.revoke(token)?;
        info!("logout");
        Ok(())
    }

    /// Replace the password, re-wrapping the same vault secret under it.
    ///
    /// The recovery envelope and all vault ciphertexts are untouched.
    pub fn change_password(&self, email: &str, old_password: &str, new_password: &str) -> Result<()> {
        validate_new_password(new_password)?;
        let account = self.authenticate(email, old_password)?;
        let seed = custody::unwrap_with_password(&account.access_envelope, old_password)?;
        self.store_new_password(&account, &seed, new_password)?;

        info!(account_id = %account.id, "password changed");
        Ok(())
    }

    /// Set a new password using the private key, for a forgotten password.
    pub fn reset_password(&self, email: &str, private_key: &str, new_password: &str) -> Result<()> {
        validate_new_password(new_password)?;
        let (account, identity) = self.authenticate_with_key(email, private_key)?;
        let seed = custody::unwrap_with_private_key(&account.recovery_envelope, &identity)?;
        self.store_new_password(&account, &seed, new_password)?;

        info!(account_id = %account.id, "password reset with private key");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    fn account_by_email(&self, email: &str) -> Result<Account> {
        self.accounts.get_by_email(email).map_err(|e| match e {
            StoreError::NotFound => PassVaultError::Unauthorized,
            other => PassVaultError::process("account lookup", other),
        })
    }

    fn authenticate(&self, email: &str, password: &str) -> Result<Account> {
        let account = self.account_by_email(email)?;
        if !verify_password(password, &account.password_hash)? {
            return Err(PassVaultError::Unauthorized);
        }
        Ok(account)
    }

    fn authenticate_with_key(&self, email: &str, private_key: &str) -> Result<(Account, Identity)> {
        let identity = Identity::from_private_hex(private_key)?;
        let account = self.account_by_email(email)?;
        if !identity.matches_public_hex(&account.public_key) {
            return Err(PassVaultError::Unauthorized);
        }
        Ok((account, identity))
    }

    fn open_session(&self, account: &Account, seed: &SessionSeed) -> Result<SessionToken> {
        if seed.account_id != account.id {
            return Err(PassVaultError::process(
                "session seed",
                format!("seed bound to {} not {}", seed.account_id, account.id),
            ));
        }
        self.sessions.create(seed.account_id, &seed.vault_secret)
    }

    fn store_new_password(&self, account: &Account, seed: &SessionSeed, new_password: &str) -> Result<()> {
        let password_hash = hash_password(new_password, &self.config.argon2)?;
        let access_envelope = custody::wrap(seed, &custody::password_key(new_password))?;
        self.accounts
            .update_password(account.id, &password_hash, &access_envelope)
            .map_err(store_error("account update"))
    }
}
