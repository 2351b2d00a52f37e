//! Watch command - periodic usage monitoring.

use anyhow::Result;
use clap::Args;
use std::io::{Write, stdout};
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::{info, warn};
use ymobar_fetch::SessionError;
use ymobar_store::{MIN_REFRESH_INTERVAL_SECS, SessionController, Settings, ViewState};

use super::build_controller;
use super::usage::{UsageArgs, first_fetch};
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for watch command.
#[derive(Args)]
pub struct WatchArgs {
    /// Refresh interval in seconds (defaults to the configured interval).
    #[arg(long, short)]
    pub interval: Option<u64>,

    #[command(flatten)]
    pub credentials: UsageArgs,
}

/// Effective refresh interval in seconds.
fn effective_interval(requested: Option<u64>, settings: &Settings) -> u64 {
    requested
        .unwrap_or(settings.refresh_interval_secs)
        .max(MIN_REFRESH_INTERVAL_SECS)
}

/// Runs the watch command.
pub async fn run(args: &WatchArgs, cli: &Cli, settings: &Settings) -> Result<()> {
    let refresh_interval = effective_interval(args.interval, settings);
    info!(interval = refresh_interval, "Starting watch mode");

    let controller = build_controller(cli, settings)?;

    // Rejected or missing credentials end the watch; anything else is
    // retried on the next tick.
    if let Err(e) = first_fetch(&args.credentials, &controller).await {
        match e.downcast_ref::<SessionError>() {
            Some(session) if !session.is_auth_rejected() => {
                warn!(error = %session, "Initial fetch failed, retrying on next tick");
            }
            _ => return Err(e),
        }
    }
    render(&controller, cli, refresh_interval)?;

    let mut ticker = interval(Duration::from_secs(refresh_interval));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("Watch interrupted");
                return Ok(());
            }
        }

        if let Err(e) = controller.refresh().await {
            warn!(error = %e, "Refresh failed");
        }
        render(&controller, cli, refresh_interval)?;
    }
}

fn render(controller: &SessionController, cli: &Cli, refresh_interval: u64) -> Result<()> {
    let state: ViewState = controller.state();

    match cli.format {
        OutputFormat::Text => {
            // Clear screen
            print!("\x1b[2J\x1b[H");
            stdout().flush()?;

            let now = chrono::Local::now();
            println!(
                "ymobar watch - {} (refresh: {}s)",
                now.format("%H:%M:%S"),
                refresh_interval
            );
            println!("{}", "─".repeat(50));
            println!();

            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_state(&state));
            println!();
            println!("Press Ctrl+C to exit");
        }
        OutputFormat::Json => {
            // One document per line so the stream stays parseable.
            let formatter = JsonFormatter::new(false);
            println!("{}", formatter.format_state(&state)?);
        }
    }

    Ok(())
}
