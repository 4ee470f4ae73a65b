//! `passvault credential ...`: change one entry of a vault.

use crate::cli::output;
use crate::cli::{open_service, require_token, Cli, CredentialAction};
use crate::errors::Result;

/// Execute a `credential` subcommand.
pub fn execute(cli: &Cli, action: CredentialAction) -> Result<()> {
    let token = require_token(cli)?;
    let service = open_service(cli)?;

    let (message, result) = match action {
        CredentialAction::Add { vault_id, entry } => {
            let name = entry.name.clone();
            let result = service.add_credential(token, &vault_id, entry.into_credential()?)?;
            (format!("Added '{name}'"), result)
        }
        CredentialAction::Update {
            vault_id,
            entry_id,
            entry,
        } => {
            let result =
                service.update_credential(token, &vault_id, &entry_id, entry.into_credential()?)?;
            (format!("Updated entry {entry_id}"), result)
        }
        CredentialAction::Delete { vault_id, entry_id } => {
            let result = service.delete_credential(token, &vault_id, &entry_id)?;
            (format!("Deleted entry {entry_id}"), result)
        }
    };

    output::success(&message);
    output::print_credentials_table(&result.value, false);
    output::session_token(&result.token);
    Ok(())
}
