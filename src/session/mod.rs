//! Session custody: issue, resolve, revoke and rotate bearer tokens.
//!
//! A session binds an opaque token to `(account id, vault secret)` for a
//! fixed TTL.  Rotation mints a sibling token for the same pair and leaves
//! the presented token alone, so every token of a login lineage stays
//! valid until its own TTL lapses.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::crypto::VaultSecret;
use crate::errors::{PassVaultError, Result};
use crate::store::{AccountId, SessionStore};

/// Default session lifetime in minutes.
pub const DEFAULT_TTL_MINUTES: i64 = 30;

/// Longest accepted session lifetime in minutes (one year).
pub const MAX_TTL_MINUTES: i64 = 365 * 24 * 60;

/// An unguessable session token (a random UUIDv4).
///
/// Displayed as 32 lowercase hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionToken(Uuid);

impl SessionToken {
    /// Allocate a fresh random token.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a token presented by a caller.
    ///
    /// Accepts the 32-char hex form and the 36-char hyphenated form.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.len() != 32 && raw.len() != 36 {
            return Err(PassVaultError::Request("malformed session token".into()));
        }
        Uuid::parse_str(raw)
            .map(Self)
            .map_err(|_| PassVaultError::Request("malformed session token".into()))
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// A resolved, live session.
#[derive(Debug, Clone)]
pub struct Session {
    /// The token the caller presented.
    pub token: SessionToken,
    pub account_id: AccountId,
    pub vault_secret: VaultSecret,
}

/// Issues and checks sessions against a pluggable expiring store.
#[derive(Clone)]
pub struct SessionCustody {
    store: Arc<dyn SessionStore>,
    ttl: Duration,
}

impl SessionCustody {
    pub fn new(store: Arc<dyn SessionStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Session lifetime applied to every new token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `(account_id, vault_secret)`.
    pub fn create(&self, account_id: AccountId, vault_secret: &VaultSecret) -> Result<SessionToken> {
        let token = SessionToken::generate();
        self.store
            .put_session(&token, account_id, vault_secret, self.ttl)
            .map_err(|e| PassVaultError::process("session store put", e))?;
        Ok(token)
    }

    /// Resolve a presented token.
    ///
    /// Malformed input is a request error.  A token that never existed and
    /// one that expired both come back as `AccessDenied`.
    pub fn resolve(&self, raw_token: &str) -> Result<Session> {
        let token = SessionToken::parse(raw_token)?;
        let record = self
            .store
            .get_session(&token)
            .map_err(|e| PassVaultError::process("session store get", e))?
            .ok_or(PassVaultError::AccessDenied)?;

        Ok(Session {
            token,
            account_id: record.account_id,
            vault_secret: record.vault_secret,
        })
    }

    /// Delete a session outright.
    pub fn revoke(&self, raw_token: &str) -> Result<()> {
        let token = SessionToken::parse(raw_token)?;
        self.store
            .delete_session(&token)
            .map_err(|e| PassVaultError::process("session store delete", e))
    }

    /// Mint a sibling token for a resolved session.
    ///
    /// The presented token is not revoked.  If the store write fails the
    /// failure is logged and the presented token is handed back, since it
    /// is still valid.
    pub fn rotate(&self, session: &Session) -> SessionToken {
        match self.create(session.account_id, &session.vault_secret) {
            Ok(token) => {
                debug!(account_id = %session.account_id, "session rotated");
                token
            }
            Err(e) => {
                warn!(account_id = %session.account_id, error = ?e, "session rotation failed");
                session.token
            }
        }
    }
}
