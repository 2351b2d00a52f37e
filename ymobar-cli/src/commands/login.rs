//! Login command - authenticate, optionally remember, and show usage.

use anyhow::{Result, bail};
use clap::Args;
use tracing::info;
use ymobar_store::Settings;

use super::{build_controller, print_usage};
use crate::Cli;

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Login ID (the phone number registered on the portal).
    #[arg(long, env = "YMOBAR_ID")]
    pub id: String,

    /// Password. Prefer the environment variable over the flag.
    #[arg(long, env = "YMOBAR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Remember the credentials in the system keychain.
    #[arg(long)]
    pub remember: bool,
}

/// Runs the login command.
pub async fn run(args: &LoginArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let Some(password) = args.password.as_deref().filter(|p| !p.is_empty()) else {
        bail!("Password required: pass --password or set YMOBAR_PASSWORD");
    };
    if args.remember && cli.no_keychain {
        bail!("--remember needs the keychain; drop --no-keychain");
    }

    let controller = build_controller(cli, settings)?;
    let result = controller.login(&args.id, password, args.remember).await;

    if let Err(e) = &result {
        if let Some(message) = controller.state().error {
            if !cli.quiet {
                eprintln!("{message}");
            }
        }
        info!(error = %e, "Login command failed");
    }
    let snapshot = result?;

    if args.remember && !cli.quiet {
        match controller.state().error {
            Some(message) => eprintln!("{message}"),
            None => eprintln!("Credentials remembered."),
        }
    }
    print_usage(&snapshot, cli)
}
