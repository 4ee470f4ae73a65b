//! `passvault register`: create an account.

use crate::cli::output;
use crate::cli::{open_service, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `register` command.
pub fn execute(cli: &Cli, email: &str, full_name: &str) -> Result<()> {
    let service = open_service(cli)?;
    let password = prompt_new_password(PASSWORD_ENV)?;

    let registration = service.register(email, full_name, &password)?;

    output::success(&format!("Registered {email} ({})", full_name.trim()));
    output::warning("Save this private key now. It is the only way back in if you lose your password:");
    println!("{}", registration.private_key.as_str());
    output::tip(&format!("Run `passvault login {email}` to start a session."));

    Ok(())
}
