use clap::Parser;
use passvault::cli::commands;
use passvault::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let result = match cli.command {
        Commands::Register {
            ref email,
            ref full_name,
        } => commands::register::execute(&cli, email, full_name),
        Commands::Login { ref email } => commands::login::execute(&cli, email),
        Commands::Logout => commands::logout::execute(&cli),
        Commands::Recover {
            ref email,
            ref private_key,
        } => commands::recover::execute(&cli, email, private_key.as_deref()),
        Commands::Passwd { ref email } => commands::password::execute_change(&cli, email),
        Commands::ResetPassword {
            ref email,
            ref private_key,
        } => commands::password::execute_reset(&cli, email, private_key.as_deref()),
        Commands::Vault { ref action } => commands::vault::execute(&cli, action.clone()),
        Commands::Credential { ref action } => commands::credential::execute(&cli, action.clone()),
    };

    if let Err(e) = result {
        passvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Install the log subscriber.  `RUST_LOG` wins over `--log-level`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("passvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
