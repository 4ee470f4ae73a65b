//! The service over a SQLite file: state survives reopening the database.

#![cfg(feature = "sqlite")]

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;

use passvault::crypto::Argon2Params;
use passvault::store::SqliteStore;
use passvault::vault::Credential;
use passvault::{PassVault, PassVaultError, ServiceConfig};

fn open(path: &Path) -> PassVault {
    PassVault::builder()
        .store(Arc::new(SqliteStore::open(path).unwrap()))
        .config(ServiceConfig {
            argon2: Argon2Params {
                memory_kib: 8_192,
                iterations: 1,
                parallelism: 1,
            },
            ..ServiceConfig::default()
        })
        .build()
        .unwrap()
}

#[test]
fn sessions_and_vaults_survive_reopen() {
    let tmp = TempDir::new().unwrap();
    let db = tmp.path().join("nested").join("passvault.db");

    let (token, vault_id, credentials) = {
        let service = open(&db);
        service.register("alice@example.com", "Alice", "correcthorsebattery").unwrap();
        let token = service
            .login("alice@example.com", "correcthorsebattery")
            .unwrap()
            .to_string();
        let created = service
            .create_vault(&token, "Personal", Credential::new("email", "p@ss"))
            .unwrap();
        (
            created.token.to_string(),
            created.value.id.to_string(),
            created.value.credentials,
        )
    };

    let service = open(&db);
    let fetched = service.get_vault(&token, &vault_id).unwrap();
    assert_eq!(fetched.value, credentials);

    let listed = service.list_vaults(&token).unwrap();
    assert_eq!(listed.value.len(), 1);
    assert_eq!(listed.value[0].name, "Personal");
}

#[test]
fn duplicate_email_is_data_exists() {
    let tmp = TempDir::new().unwrap();
    let service = open(&tmp.path().join("passvault.db"));
    service.register("alice@example.com", "Alice", "correcthorsebattery").unwrap();
    assert!(matches!(
        service.register("alice@example.com", "Alice", "correcthorsebattery"),
        Err(PassVaultError::DataExists(_))
    ));
}

#[test]
fn delete_vault_cascades_to_listing() {
    let tmp = TempDir::new().unwrap();
    let service = open(&tmp.path().join("passvault.db"));
    service.register("alice@example.com", "Alice", "correcthorsebattery").unwrap();
    let token = service
        .login("alice@example.com", "correcthorsebattery")
        .unwrap()
        .to_string();

    let created = service
        .create_vault(&token, "Temp", Credential::new("x", "y"))
        .unwrap();
    service
        .delete_vault(&token, &created.value.id.to_string())
        .unwrap();
    assert!(service.list_vaults(&token).unwrap().value.is_empty());
}
