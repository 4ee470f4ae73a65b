//! `passvault vault ...`: create, list, show, rename and delete vaults.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_service, require_token, Cli, VaultAction};
use crate::errors::{PassVaultError, Result};

/// Execute a `vault` subcommand.
pub fn execute(cli: &Cli, action: VaultAction) -> Result<()> {
    let token = require_token(cli)?;
    let service = open_service(cli)?;

    let next = match action {
        VaultAction::Create { name, entry } => {
            let created = service.create_vault(token, &name, entry.into_credential()?)?;
            output::success(&format!("Created vault '{name}' ({})", created.value.id));
            output::print_credentials_table(&created.value.credentials, false);
            created.token
        }
        VaultAction::List => {
            let listed = service.list_vaults(token)?;
            output::info(&format!("{} vault(s)", listed.value.len()));
            output::print_vaults_table(&listed.value);
            listed.token
        }
        VaultAction::Show { vault_id, reveal } => {
            let shown = service.get_vault(token, &vault_id)?;
            output::print_credentials_table(&shown.value, reveal);
            shown.token
        }
        VaultAction::Rename { vault_id, name } => {
            let renamed = service.rename_vault(token, &vault_id, &name)?;
            output::success(&format!("Renamed vault to '{name}'"));
            renamed.token
        }
        VaultAction::Delete { vault_id, force } => {
            // Unless --force is set, ask for confirmation before deleting.
            if !force {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete vault {vault_id} and all its credentials?"))
                    .default(false)
                    .interact()
                    .map_err(|e| PassVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

                if !confirmed {
                    output::info("Cancelled.");
                    return Ok(());
                }
            }

            let deleted = service.delete_vault(token, &vault_id)?;
            output::success(&format!("Deleted vault {vault_id}"));
            deleted.token
        }
    };

    output::session_token(&next);
    Ok(())
}
