//! `passvault passwd` and `passvault reset-password`.
//!
//! Both re-wrap the account's existing vault secret under the new password,
//! so every vault stays readable.

use crate::cli::output;
use crate::cli::{
    open_service, prompt_new_password, prompt_password, read_private_key, Cli, NEW_PASSWORD_ENV,
};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute_change(cli: &Cli, email: &str) -> Result<()> {
    let service = open_service(cli)?;
    let old_password = prompt_password()?;
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    service.change_password(email, &old_password, &new_password)?;

    output::success("Password changed");
    output::tip("Existing sessions stay valid until they expire.");
    Ok(())
}

/// Execute the `reset-password` command.
pub fn execute_reset(cli: &Cli, email: &str, private_key: Option<&str>) -> Result<()> {
    let service = open_service(cli)?;
    let private_key = read_private_key(private_key)?;
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    service.reset_password(email, &private_key, &new_password)?;

    output::success("Password reset");
    Ok(())
}
