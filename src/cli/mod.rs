//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{PassVaultError, Result};
use crate::service::{PassVault, MIN_PASSWORD_LEN};
use crate::store::SqliteStore;
use crate::vault::Credential;

/// Environment variable holding the account password (CI/CD friendly).
pub const PASSWORD_ENV: &str = "PASSVAULT_PASSWORD";

/// Environment variable holding the replacement password for `passwd`.
pub const NEW_PASSWORD_ENV: &str = "PASSVAULT_NEW_PASSWORD";

/// PassVault CLI: sealed credential vaults behind rotating sessions.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "Encrypted credential vaults with password and private-key recovery",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database file (default: from .passvault.toml, else .passvault/passvault.db)
    #[arg(long, global = true)]
    pub database: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Session token from `login` or the previous command
    #[arg(long, env = "PASSVAULT_TOKEN", hide_env_values = true, global = true)]
    pub token: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create an account (prints the private key once)
    Register {
        /// Account email
        email: String,
        /// Name shown on the account profile
        #[arg(long)]
        full_name: String,
    },

    /// Log in and print a session token
    Login {
        /// Account email
        email: String,
    },

    /// Revoke the current session token
    Logout,

    /// Open a session with the private key instead of the password
    Recover {
        /// Account email
        email: String,
        /// Private key hex (omit for interactive prompt)
        #[arg(long, env = "PASSVAULT_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },

    /// Change the account password
    Passwd {
        /// Account email
        email: String,
    },

    /// Set a new password using the private key
    ResetPassword {
        /// Account email
        email: String,
        /// Private key hex (omit for interactive prompt)
        #[arg(long, env = "PASSVAULT_PRIVATE_KEY", hide_env_values = true)]
        private_key: Option<String>,
    },

    /// Manage vaults (create, list, show, rename, delete)
    Vault {
        #[command(subcommand)]
        action: VaultAction,
    },

    /// Manage credentials inside a vault (add, update, delete)
    Credential {
        #[command(subcommand)]
        action: CredentialAction,
    },
}

/// Vault subcommands.
#[derive(Clone, clap::Subcommand)]
pub enum VaultAction {
    /// Create a vault holding one credential
    Create {
        /// Vault name
        name: String,
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// List your vaults
    List,

    /// Decrypt and show a vault's credentials
    Show {
        /// Vault id
        vault_id: String,
        /// Print passwords and secondary credentials in clear
        #[arg(long)]
        reveal: bool,
    },

    /// Rename a vault
    Rename {
        /// Vault id
        vault_id: String,
        /// New name
        name: String,
    },

    /// Delete a vault and everything in it
    Delete {
        /// Vault id
        vault_id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Credential subcommands.
#[derive(Clone, clap::Subcommand)]
pub enum CredentialAction {
    /// Add a credential under a new entry id
    Add {
        /// Vault id
        vault_id: String,
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Replace the credential stored under an entry id
    Update {
        /// Vault id
        vault_id: String,
        /// Entry id
        entry_id: String,
        #[command(flatten)]
        entry: EntryArgs,
    },

    /// Remove a credential
    Delete {
        /// Vault id
        vault_id: String,
        /// Entry id
        entry_id: String,
    },
}

/// Fields of a credential entry.
#[derive(Clone, clap::Args)]
pub struct EntryArgs {
    /// Entry name (e.g. "email")
    #[arg(id = "entry_name", long = "entry-name")]
    pub name: String,

    /// Entry password (omit for interactive prompt)
    #[arg(long = "entry-password")]
    pub password: Option<String>,

    /// Secondary credential such as a username or PIN
    #[arg(long, default_value = "")]
    pub credential: String,

    #[arg(long, default_value = "")]
    pub url: String,

    #[arg(long, default_value = "")]
    pub note: String,
}

impl EntryArgs {
    /// Build the credential, prompting for the password if it was omitted.
    pub fn into_credential(self) -> Result<Credential> {
        let password = match self.password {
            Some(pw) => pw,
            None => dialoguer::Password::new()
                .with_prompt(format!("Password for '{}'", self.name))
                .interact()
                .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?,
        };
        Ok(Credential {
            name: self.name,
            password,
            secondary: self.credential,
            url: self.url,
            note: self.note,
        })
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the database path: `--database` wins over the settings file.
pub fn database_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match &cli.database {
        Some(path) => cwd.join(path),
        None => settings.database_path(&cwd),
    })
}

/// Assemble the service over the SQLite database.
pub fn open_service(cli: &Cli) -> Result<PassVault> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let path = database_path(cli, &settings)?;

    let store = SqliteStore::open(&path).map_err(|e| {
        PassVaultError::ConfigError(format!("cannot open {}: {e}", path.display()))
    })?;

    PassVault::builder()
        .store(Arc::new(store))
        .config(settings.service_config()?)
        .build()
}

/// The session token from `--token` / `PASSVAULT_TOKEN`.
pub fn require_token(cli: &Cli) -> Result<&str> {
    cli.token
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| {
            PassVaultError::CommandFailed(
                "no session token: pass --token or set PASSVAULT_TOKEN (run `passvault login`)"
                    .into(),
            )
        })
}

/// Get the account password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter account password")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// Respects `env_var` for scripted usage and enforces a minimum length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(PassVaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose account password")
            .with_confirmation(
                "Confirm account password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PassVaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Take the private key from the flag or prompt for it.
pub fn read_private_key(flag: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(key) = flag.filter(|k| !k.trim().is_empty()) {
        return Ok(Zeroizing::new(key.trim().to_string()));
    }

    let key = dialoguer::Password::new()
        .with_prompt("Enter private key")
        .interact()
        .map_err(|e| PassVaultError::CommandFailed(format!("private key prompt: {e}")))?;
    Ok(Zeroizing::new(key.trim().to_string()))
}
