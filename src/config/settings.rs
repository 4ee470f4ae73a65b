use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::crypto::Argon2Params;
use crate::errors::{PassVaultError, Result};
use crate::service::{ServiceConfig, DEFAULT_LIST_PAGE_SIZE};
use crate::session::{DEFAULT_TTL_MINUTES, MAX_TTL_MINUTES};

/// Project-level configuration, loaded from `.passvault.toml`.
///
/// Every field has a sensible default so PassVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// SQLite database path (relative paths resolve against the project dir).
    #[serde(default = "default_database")]
    pub database: String,

    /// Lifetime of a session token in minutes (default: 30).
    #[serde(default = "default_session_ttl_minutes")]
    pub session_ttl_minutes: i64,

    /// Argon2 memory cost in KiB (default: 64 MB).
    #[serde(default = "default_argon2_memory_kib")]
    pub argon2_memory_kib: u32,

    /// Argon2 iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2 parallelism degree (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,

    /// How many vaults `vault list` shows.
    #[serde(default = "default_list_page_size")]
    pub list_page_size: usize,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_database() -> String {
    ".passvault/passvault.db".to_string()
}

fn default_session_ttl_minutes() -> i64 {
    DEFAULT_TTL_MINUTES
}

fn default_argon2_memory_kib() -> u32 {
    65_536 // 64 MB
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

fn default_list_page_size() -> usize {
    DEFAULT_LIST_PAGE_SIZE
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: default_database(),
            session_ttl_minutes: default_session_ttl_minutes(),
            argon2_memory_kib: default_argon2_memory_kib(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
            list_page_size: default_list_page_size(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    pub const FILE_NAME: &'static str = ".passvault.toml";

    /// Load settings from `<project_dir>/.passvault.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            PassVaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Resolve the database path against `project_dir`.
    pub fn database_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.database)
    }

    /// Convert the Argon2 settings into crypto-layer params.
    pub fn argon2_params(&self) -> Argon2Params {
        Argon2Params {
            memory_kib: self.argon2_memory_kib,
            iterations: self.argon2_iterations,
            parallelism: self.argon2_parallelism,
        }
    }

    /// Typed service configuration.
    pub fn service_config(&self) -> Result<ServiceConfig> {
        if !(1..=MAX_TTL_MINUTES).contains(&self.session_ttl_minutes) {
            return Err(PassVaultError::ConfigError(format!(
                "session_ttl_minutes must be between 1 and {MAX_TTL_MINUTES}, got {}",
                self.session_ttl_minutes
            )));
        }
        Ok(ServiceConfig {
            session_ttl: Duration::minutes(self.session_ttl_minutes),
            argon2: self.argon2_params(),
            list_page_size: self.list_page_size,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.database, ".passvault/passvault.db");
        assert_eq!(s.session_ttl_minutes, 30);
        assert_eq!(s.argon2_memory_kib, 65_536);
        assert_eq!(s.argon2_iterations, 3);
        assert_eq!(s.argon2_parallelism, 4);
        assert_eq!(s.list_page_size, 1000);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.session_ttl_minutes, 30);
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
database = "data/vaults.db"
session_ttl_minutes = 5
argon2_memory_kib = 131072
argon2_iterations = 5
argon2_parallelism = 8
list_page_size = 50
"#;
        fs::write(tmp.path().join(".passvault.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.database, "data/vaults.db");
        assert_eq!(settings.session_ttl_minutes, 5);
        assert_eq!(settings.argon2_memory_kib, 131_072);
        assert_eq!(settings.argon2_iterations, 5);
        assert_eq!(settings.argon2_parallelism, 8);
        assert_eq!(settings.list_page_size, 50);
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".passvault.toml"), "session_ttl_minutes = 10\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.session_ttl_minutes, 10);
        assert_eq!(settings.database, ".passvault/passvault.db");
        assert_eq!(settings.argon2_iterations, 3);
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".passvault.toml"), "not valid {{toml").unwrap();

        assert!(matches!(
            Settings::load(tmp.path()),
            Err(PassVaultError::ConfigError(_))
        ));
    }

    #[test]
    fn database_path_joins_project_dir() {
        let s = Settings::default();
        assert_eq!(
            s.database_path(Path::new("/home/user/project")),
            PathBuf::from("/home/user/project/.passvault/passvault.db")
        );
    }

    #[test]
    fn service_config_carries_every_field() {
        let s = Settings {
            session_ttl_minutes: 12,
            argon2_memory_kib: 8_192,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            list_page_size: 7,
            ..Settings::default()
        };
        let config = s.service_config().unwrap();
        assert_eq!(config.session_ttl, Duration::minutes(12));
        assert_eq!(config.argon2.memory_kib, 8_192);
        assert_eq!(config.list_page_size, 7);
    }

    #[test]
    fn out_of_range_ttl_rejected() {
        for minutes in [0, -5, MAX_TTL_MINUTES + 1, 1_000_000_000_000, i64::MAX] {
            let s = Settings {
                session_ttl_minutes: minutes,
                ..Settings::default()
            };
            assert!(
                matches!(s.service_config(), Err(PassVaultError::ConfigError(_))),
                "ttl {minutes} should be rejected"
            );
        }
    }

    #[test]
    fn one_year_ttl_accepted() {
        let s = Settings {
            session_ttl_minutes: MAX_TTL_MINUTES,
            ..Settings::default()
        };
        assert_eq!(s.service_config().unwrap().session_ttl, Duration::days(365));
    }
}
