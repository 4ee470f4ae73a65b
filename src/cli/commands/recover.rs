//! `passvault recover`: open a session with the private key.

use crate::cli::output;
use crate::cli::{open_service, read_private_key, Cli};
use crate::errors::Result;

/// Execute the `recover` command.
pub fn execute(cli: &Cli, email: &str, private_key: Option<&str>) -> Result<()> {
    let service = open_service(cli)?;
    let private_key = read_private_key(private_key)?;

    let token = service.recover(email, &private_key)?;

    output::success(&format!("Session recovered for {email}"));
    output::tip(&format!(
        "Consider `passvault reset-password {email}` if you lost your password."
    ));
    output::session_token(&token);

    Ok(())
}
