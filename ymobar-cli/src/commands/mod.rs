//! CLI command implementations.

pub mod config;
pub mod login;
pub mod logout;
pub mod usage;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;
use ymobar_core::UsageSnapshot;
use ymobar_fetch::PortalSession;
use ymobar_store::{
    CredentialStore, KeychainCredentialStore, MemoryCredentialStore, SessionController, Settings,
    SettingsStore,
};

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Loads settings from the default path, falling back to defaults.
pub async fn load_settings() -> Settings {
    SettingsStore::load_default().await.get().await
}

/// Builds a controller over a fresh portal session.
pub fn build_controller(cli: &Cli, settings: &Settings) -> Result<SessionController> {
    let portal = PortalSession::new(settings.endpoints(), &settings.session_options())
        .context("Failed to create HTTP client")?;

    let store: Arc<dyn CredentialStore> = if cli.no_keychain {
        debug!("Using in-memory credential store");
        Arc::new(MemoryCredentialStore::new())
    } else {
        Arc::new(KeychainCredentialStore::new())
    };

    Ok(SessionController::new(Arc::new(portal), store))
}

/// Prints a snapshot in the selected format.
pub fn print_usage(snapshot: &UsageSnapshot, cli: &Cli) -> Result<()> {
    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_usage(snapshot));
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format(snapshot)?);
        }
    }
    Ok(())
}
