//! Usage command - log in and display current usage.

use anyhow::{Result, bail};
use clap::Args;
use tracing::info;
use ymobar_core::UsageSnapshot;
use ymobar_store::{SessionController, Settings};

use super::{build_controller, print_usage};
use crate::Cli;

/// Arguments for the usage command.
#[derive(Args, Default)]
pub struct UsageArgs {
    /// Login ID to use instead of remembered credentials.
    #[arg(long, env = "YMOBAR_ID")]
    pub id: Option<String>,

    /// Password to use instead of remembered credentials.
    #[arg(long, env = "YMOBAR_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let controller = build_controller(cli, settings)?;
    let snapshot = first_fetch(args, &controller).await?;
    print_usage(&snapshot, cli)
}

/// Logs in with explicit or remembered credentials and fetches usage.
///
/// Portal failures keep their [`ymobar_fetch::SessionError`] type inside the
/// returned error.
pub async fn first_fetch(args: &UsageArgs, controller: &SessionController) -> Result<UsageSnapshot> {
    // Clap only reads the environment when the subcommand is named.
    let id = args.id.clone().or_else(|| env_value("YMOBAR_ID"));
    let password = args.password.clone().or_else(|| env_value("YMOBAR_PASSWORD"));

    let snapshot = match (id, password) {
        (Some(id), Some(password)) => {
            info!("Logging in with credentials from the command line");
            controller.login(&id, &password, false).await?
        }
        _ => match controller.auto_login().await? {
            Some(snapshot) => snapshot,
            None => bail!(
                "No remembered credentials. Run `ymobar login --id <ID> --remember` first, \
                 or set YMOBAR_ID and YMOBAR_PASSWORD."
            ),
        },
    };

    Ok(snapshot)
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
