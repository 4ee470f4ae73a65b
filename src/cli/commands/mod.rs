//! One module per subcommand, each exposing `execute`.

pub mod credential;
pub mod login;
pub mod logout;
pub mod password;
pub mod recover;
pub mod register;
pub mod vault;
