//! `passvault logout`: revoke the current session token.

use crate::cli::output;
use crate::cli::{open_service, require_token, Cli};
use crate::errors::Result;

/// Execute the `logout` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let token = require_token(cli)?;
    open_service(cli)?.logout(token)?;

    output::success("Logged out");
    Ok(())
}
