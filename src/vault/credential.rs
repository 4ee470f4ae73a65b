//! Credential entries and the credential map held inside a vault.
//!
//! Entries have no row of their own.  They exist only as values of the
//! JSON object sealed in a vault's ciphertext, keyed by entry id.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{PassVaultError, Result};

/// One named secret record inside a vault.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub name: String,
    pub password: String,
    /// Secondary credential (username, PIN, recovery code...).
    #[serde(rename = "credential", default)]
    pub secondary: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub note: String,
}

impl Credential {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            password: password.into(),
            ..Self::default()
        }
    }

    /// Name and password are required; everything else may be empty.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PassVaultError::Request("credential name is required".into()));
        }
        if self.password.is_empty() {
            return Err(PassVaultError::Request(
                "credential password is required".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .field("secondary", &"<redacted>")
            .field("url", &self.url)
            .field("note", &self.note)
            .finish()
    }
}

/// Plaintext content of a vault: entry id → credential.
///
/// Ordered, so serializing the same map always yields the same bytes.
pub type CredentialMap = BTreeMap<String, Credential>;

/// A fresh entry id: a random UUIDv4 as 32 lowercase hex chars.
pub fn new_entry_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_field_names() {
        let mut cred = Credential::new("email", "p@ss");
        cred.secondary = "alice".into();
        let json = serde_json::to_value(&cred).unwrap();
        assert_eq!(json["name"], "email");
        assert_eq!(json["password"], "p@ss");
        assert_eq!(json["credential"], "alice");
        assert_eq!(json["url"], "");
    }

    #[test]
    fn optional_fields_default_when_absent() {
        let cred: Credential = serde_json::from_str(r#"{"name":"email","password":"p@ss"}"#).unwrap();
        assert_eq!(cred, Credential::new("email", "p@ss"));
    }

    #[test]
    fn validate_requires_name_and_password() {
        assert!(Credential::new("email", "p@ss").validate().is_ok());
        assert!(Credential::new("  ", "p@ss").validate().is_err());
        assert!(Credential::new("email", "").validate().is_err());
    }

    #[test]
    fn debug_hides_secrets() {
        let shown = format!("{:?}", Credential::new("email", "hunter2"));
        assert!(!shown.contains("hunter2"));
        assert!(shown.contains("email"));
    }

    #[test]
    fn entry_ids_are_unique_hex() {
        let a = new_entry_id();
        let b = new_entry_id();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }
}
