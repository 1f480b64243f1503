use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shelf_app::utils::is_password_allowed;
use shelf_kernel::settings::Settings;

#[derive(Parser)]
#[command(name = "shelf-cli", version, about = "Command-line tools for shelf")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a password against the account password rules
    CheckPassword { password: String },
    /// Print the effective settings as JSON, with tokens redacted
    Settings,
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .try_init()
        .ok();

    match Cli::parse().command {
        Command::CheckPassword { password } => {
            if is_password_allowed(&password) {
                println!("password allowed");
                Ok(ExitCode::SUCCESS)
            } else {
                println!(
                    "password rejected: needs more than 6 characters with a lowercase letter, \
                     an uppercase letter, a digit and a symbol"
                );
                Ok(ExitCode::FAILURE)
            }
        }
        Command::Settings => {
            let mut settings =
                Settings::load().with_context(|| "failed to load shelf settings")?;
            for user in &mut settings.auth.users {
                user.token = "<redacted>".to_string();
            }

            tracing::debug!(env = ?settings.environment, "settings loaded");
            println!("{}", serde_json::to_string_pretty(&settings)?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
