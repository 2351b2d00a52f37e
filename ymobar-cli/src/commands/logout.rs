//! Logout command - forget remembered credentials.

use anyhow::Result;
use ymobar_store::Settings;

use super::build_controller;
use crate::Cli;

/// Runs the logout command.
pub async fn run(cli: &Cli, settings: &Settings) -> Result<()> {
    let controller = build_controller(cli, settings)?;
    controller.logout().await?;

    if !cli.quiet {
        println!("Logged out. Remembered credentials removed.");
    }
    Ok(())
}
