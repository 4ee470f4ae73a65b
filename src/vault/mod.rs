//! Vault contents: the sealed credential map.
//!
//! This module provides:
//! - `Credential` entries and the `CredentialMap` (`credential`)
//! - The merge algorithm and map sealing helpers (`merge`)

pub mod credential;
pub mod merge;

// Re-export the most commonly used items.
pub use credential::{new_entry_id, Credential, CredentialMap};
pub use merge::{merge, open_map, seal_map};
