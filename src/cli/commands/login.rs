//! `passvault login`: open a session with email and password.

use crate::cli::output;
use crate::cli::{open_service, prompt_password, Cli};
use crate::errors::Result;

/// Execute the `login` command.
pub fn execute(cli: &Cli, email: &str) -> Result<()> {
    let service = open_service(cli)?;
    let password = prompt_password()?;

    let token = service.login(email, &password)?;

    output::success(&format!(
        "Logged in as {email} (session valid for {} minutes)",
        service.config().session_ttl.num_minutes()
    ));
    output::session_token(&token);

    Ok(())
}
