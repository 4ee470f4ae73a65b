//! SQLite-backed store.
//!
//! One database file holds accounts, vaults, ownership links and session
//! records, so a CLI session outlives the process that created it.
//! Timestamps are stored as fixed-width RFC 3339 text (microseconds, `Z`),
//! which keeps lexical and chronological order identical.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Datelike, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OptionalExtension};
use uuid::Uuid;

use super::{
    session_expiry, Account, AccountId, AccountStore, OwnershipStore, SessionRecord, SessionStore,
    StoreError, StoreResult, VaultId, VaultRecord, VaultStore, VaultSummary,
};
use crate::crypto::VaultSecret;
use crate::session::SessionToken;

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts (
        id                TEXT PRIMARY KEY,
        email             TEXT NOT NULL UNIQUE,
        full_name         TEXT NOT NULL,
        password_hash     TEXT NOT NULL,
        public_key        TEXT NOT NULL,
        access_envelope   TEXT NOT NULL,
        recovery_envelope TEXT NOT NULL,
        created_at        TEXT NOT NULL,
        updated_at        TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS vaults (
        id          TEXT PRIMARY KEY,
        name        TEXT NOT NULL,
        ciphertext  TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS account_vaults (
        account_id  TEXT NOT NULL,
        vault_id    TEXT NOT NULL REFERENCES vaults(id) ON DELETE CASCADE,
        PRIMARY KEY (account_id, vault_id)
    );

    CREATE TABLE IF NOT EXISTS sessions (
        token         TEXT PRIMARY KEY,
        account_id    TEXT NOT NULL,
        vault_secret  TEXT NOT NULL,
        expires_at    TEXT NOT NULL
    );
";

/// SQLite implementation of every store contract.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`.
    ///
    /// Missing parent directories are created and the file is restricted
    /// to its owner on Unix.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Backend(format!("cannot create database directory: {e}"))
                })?;
            }
        }

        let conn = Connection::open(path).map_err(backend)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            let _ = std::fs::set_permissions(path, perms);
        }

        Self::with_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory().map_err(backend)?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA).map_err(backend)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".into()))
    }
}

// ── Conversions ──────────────────────────────────────────────────────

fn backend(e: rusqlite::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Map a write error, turning uniqueness violations into `Conflict`.
fn write_error(e: rusqlite::Error) -> StoreError {
    match e {
        rusqlite::Error::SqliteFailure(ref failure, _)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict
        }
        other => backend(other),
    }
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Backend(format!("bad timestamp '{raw}': {e}")))
}

fn parse_id(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Backend(format!("bad id '{raw}': {e}")))
}

/// Fail with `NotFound` when an UPDATE/DELETE touched no row.
fn expect_row(changed: usize) -> StoreResult<()> {
    if changed == 0 {
        Err(StoreError::NotFound)
    } else {
        Ok(())
    }
}

type AccountRow = (
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
    String,
);
type VaultRow = (String, String, String, String, String);

fn account_from_row(row: AccountRow) -> StoreResult<Account> {
    let (id, email, full_name, password_hash, public_key, access, recovery, created, updated) = row;
    Ok(Account {
        id: parse_id(&id)?,
        email,
        full_name,
        password_hash,
        public_key,
        access_envelope: access,
        recovery_envelope: recovery,
        created_at: parse_timestamp(&created)?,
        updated_at: parse_timestamp(&updated)?,
    })
}

fn vault_from_row(row: VaultRow) -> StoreResult<VaultRecord> {
    let (id, name, ciphertext, created, updated) = row;
    Ok(VaultRecord {
        id: parse_id(&id)?,
        name,
        ciphertext,
        created_at: parse_timestamp(&created)?,
        updated_at: parse_timestamp(&updated)?,
    })
}

// ── Accounts ─────────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
    fn create_account(&self, account: &Account) -> StoreResult<AccountId> {
        self.lock()?
            .execute(
                "INSERT INTO accounts (id, email, full_name, password_hash, public_key,
                    access_envelope, recovery_envelope, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    account.id.to_string(),
                    account.email,
                    account.full_name,
                    account.password_hash,
                    account.public_key,
                    account.access_envelope,
                    account.recovery_envelope,
                    timestamp(account.created_at),
                    timestamp(account.updated_at),
                ],
            )
            .map_err(write_error)?;
        Ok(account.id)
    }

    fn get_by_email(&self, email: &str) -> StoreResult<Account> {
        let row: Option<AccountRow> = self
            .lock()?
            .query_row(
                "SELECT id, email, full_name, password_hash, public_key, access_envelope,
                        recovery_envelope, created_at, updated_at
                 FROM accounts WHERE email = ?1",
                params![email],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                        row.get(5)?,
                        row.get(6)?,
                        row.get(7)?,
                        row.get(8)?,
                    ))
                },
            )
            .optional()
            .map_err(backend)?;

        account_from_row(row.ok_or(StoreError::NotFound)?)
    }

    fn update_password(
        &self,
        id: AccountId,
        password_hash: &str,
        access_envelope: &str,
    ) -> StoreResult<()> {
        let changed = self
            .lock()?
            .execute(
                "UPDATE accounts
                 SET password_hash = ?2, access_envelope = ?3, updated_at = ?4
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    password_hash,
                    access_envelope,
                    timestamp(Utc::now())
                ],
            )
            .map_err(backend)?;
        expect_row(changed)
    }
}

// ── Vaults ───────────────────────────────────────────────────────────

impl VaultStore for SqliteStore {
    fn create_vault(&self, name: &str, ciphertext: &str) -> StoreResult<VaultId> {
        let id = Uuid::new_v4();
        let now = timestamp(Utc::now());
        self.lock()?
            .execute(
                "INSERT INTO vaults (id, name, ciphertext, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                params![id.to_string(), name, ciphertext, now],
            )
            .map_err(write_error)?;
        Ok(id)
    }

    fn get_vault(&self, id: VaultId) -> StoreResult<VaultRecord> {
        let row: Option<VaultRow> = self
            .lock()?
            .query_row(
                "SELECT id, name, ciphertext, created_at, updated_at
                 FROM vaults WHERE id = ?1",
                params![id.to_string()],
                |row| {
                    Ok((
                        row.get(0)?,
                        row.get(1)?,
                        row.get(2)?,
                        row.get(3)?,
                        row.get(4)?,
                    ))
                },
            )
            .optional()
            .map_err(backend)?;

        vault_from_row(row.ok_or(StoreError::NotFound)?)
    }

    fn update_name(&self, id: VaultId, name: &str) -> StoreResult<()> {
        let changed = self
            .lock()?
            .execute(
                "UPDATE vaults SET name = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), name, timestamp(Utc::now())],
            )
            .map_err(backend)?;
        expect_row(changed)
    }

    fn update_ciphertext(&self, id: VaultId, ciphertext: &str) -> StoreResult<()> {
        let changed = self
            .lock()?
            .execute(
                "UPDATE vaults SET ciphertext = ?2, updated_at = ?3 WHERE id = ?1",
                params![id.to_string(), ciphertext, timestamp(Utc::now())],
            )
            .map_err(backend)?;
        expect_row(changed)
    }

    fn delete_vault(&self, id: VaultId) -> StoreResult<()> {
        // Links go with the row through ON DELETE CASCADE.
        let changed = self
            .lock()?
            .execute("DELETE FROM vaults WHERE id = ?1", params![id.to_string()])
            .map_err(backend)?;
        expect_row(changed)
    }
}

// ── Ownership ────────────────────────────────────────────────────────

impl OwnershipStore for SqliteStore {
    fn link(&self, account_id: AccountId, vault_id: VaultId) -> StoreResult<()> {
        self.lock()?
            .execute(
                "INSERT OR IGNORE INTO account_vaults (account_id, vault_id) VALUES (?1, ?2)",
                params![account_id.to_string(), vault_id.to_string()],
            )
            .map_err(write_error)?;
        Ok(())
    }

    fn list_vaults_for_account(
        &self,
        account_id: AccountId,
        page: usize,
        size: usize,
    ) -> StoreResult<Vec<VaultSummary>> {
        let limit = i64::try_from(size).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.saturating_mul(size)).unwrap_or(i64::MAX);

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT v.id, v.name, v.created_at, v.updated_at
                 FROM vaults v
                 JOIN account_vaults av ON av.vault_id = v.id
                 WHERE av.account_id = ?1
                 ORDER BY v.created_at ASC, v.id ASC
                 LIMIT ?2 OFFSET ?3",
            )
            .map_err(backend)?;

        let rows = stmt
            .query_map(params![account_id.to_string(), limit, offset], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })
            .map_err(backend)?;

        let mut summaries = Vec::new();
        for row in rows {
            let (id, name, created, updated) = row.map_err(backend)?;
            summaries.push(VaultSummary {
                id: parse_id(&id)?,
                name,
                created_at: parse_timestamp(&created)?,
                updated_at: parse_timestamp(&updated)?,
            });
        }
        Ok(summaries)
    }

    fn owns(&self, account_id: AccountId, vault_id: VaultId) -> StoreResult<bool> {
        let found: Option<i64> = self
            .lock()?
            .query_row(
                "SELECT 1 FROM account_vaults WHERE account_id = ?1 AND vault_id = ?2",
                params![account_id.to_string(), vault_id.to_string()],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        Ok(found.is_some())
    }
}

// ── Sessions ─────────────────────────────────────────────────────────

impl SessionStore for SqliteStore {
    fn put_session(
        &self,
        token: &SessionToken,
        account_id: AccountId,
        vault_secret: &VaultSecret,
        ttl: Duration,
    ) -> StoreResult<()> {
        let now = Utc::now();
        let expires_at = session_expiry(now, ttl)?;
        // Past year 9999 the text form loses its fixed width and sorts wrong.
        if expires_at.year() > 9999 {
            return Err(StoreError::Backend(format!(
                "session expiry {expires_at} is out of range"
            )));
        }

        let conn = self.lock()?;
        // Rotated-away tokens are never presented again; drop them here.
        conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![timestamp(now)],
        )
        .map_err(backend)?;
        conn.execute(
            "INSERT OR REPLACE INTO sessions (token, account_id, vault_secret, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                token.to_string(),
                account_id.to_string(),
                vault_secret.expose(),
                timestamp(expires_at),
            ],
        )
        .map_err(write_error)?;
        Ok(())
    }

    fn get_session(&self, token: &SessionToken) -> StoreResult<Option<SessionRecord>> {
        let conn = self.lock()?;
        let row: Option<(String, String, String)> = conn
            .query_row(
                "SELECT account_id, vault_secret, expires_at FROM sessions WHERE token = ?1",
                params![token.to_string()],
                |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
            )
            .optional()
            .map_err(backend)?;

        let Some((account_id, vault_secret, expires_at)) = row else {
            return Ok(None);
        };

        let record = SessionRecord {
            account_id: parse_id(&account_id)?,
            vault_secret: VaultSecret::from_stored(vault_secret),
            expires_at: parse_timestamp(&expires_at)?,
        };

        if record.is_expired_at(Utc::now()) {
            conn.execute(
                "DELETE FROM sessions WHERE token = ?1",
                params![token.to_string()],
            )
            .map_err(backend)?;
            return Ok(None);
        }

        Ok(Some(record))
    }

    fn delete_session(&self, token: &SessionToken) -> StoreResult<()> {
        self.lock()?
            .execute(
                "DELETE FROM sessions WHERE token = ?1",
                params![token.to_string()],
            )
            .map_err(backend)?;
        Ok(())
    }
}
