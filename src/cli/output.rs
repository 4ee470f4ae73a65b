//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::session::SessionToken;
use crate::store::VaultSummary;
use crate::vault::CredentialMap;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the token to use for the next command, in a form a shell can eval.
pub fn session_token(token: &SessionToken) {
    println!("PASSVAULT_TOKEN={token}");
}

/// Print a table of vault metadata (Id, Name, Created, Updated).
pub fn print_vaults_table(vaults: &[VaultSummary]) {
    if vaults.is_empty() {
        info("No vaults yet.");
        tip("Run `passvault vault create <NAME> --entry-name <NAME>` to create one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Id", "Name", "Created", "Updated"]);

    for v in vaults {
        table.add_row(vec![
            v.id.to_string(),
            v.name.clone(),
            v.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            v.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print a vault's credentials.  Secrets are masked unless `reveal` is set.
pub fn print_credentials_table(credentials: &CredentialMap, reveal: bool) {
    if credentials.is_empty() {
        info("This vault is empty.");
        tip("Run `passvault credential add <VAULT_ID> --entry-name <NAME>` to add one.");
        return;
    }

    let mask = |value: &str| {
        if reveal || value.is_empty() {
            value.to_string()
        } else {
            "\u{2022}".repeat(8)
        }
    };

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Entry", "Name", "Password", "Credential", "Url", "Note"]);

    for (id, c) in credentials {
        table.add_row(vec![
            id.clone(),
            c.name.clone(),
            mask(&c.password),
            mask(&c.secondary),
            c.url.clone(),
            c.note.clone(),
        ]);
    }

    println!("{table}");
}
