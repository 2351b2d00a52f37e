// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! ymobar CLI - Y!mobile data usage from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Log in once and remember the credentials in the system keychain
//! YMOBAR_PASSWORD=... ymobar login --id 09012345678 --remember
//!
//! # Show usage (logs in with remembered credentials)
//! ymobar
//!
//! # JSON output
//! ymobar --format json --pretty
//!
//! # Watch mode
//! ymobar watch --interval 600
//!
//! # Forget everything
//! ymobar logout
//! ```

mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use ymobar_fetch::SessionError;
use ymobar_store::LogLevel;

use commands::{config, login, logout, usage, watch};

// ============================================================================
// CLI Definition
// ============================================================================

/// ymobar CLI - Y!mobile data usage monitoring.
#[derive(Parser)]
#[command(name = "ymobar")]
#[command(about = "Y!mobile data usage monitoring CLI")]
#[command(long_about = r"
ymobar logs in to the Y!mobile customer portal and reports how much of the
monthly data allowance is left.

Examples:
  ymobar login --id 09012345678 --remember   # Log in, remember credentials
  ymobar                                      # Usage with remembered credentials
  ymobar --format json                        # JSON output
  ymobar watch                                # Refresh periodically
  ymobar logout                               # Forget credentials
")]
#[command(version)]
#[command(author = "ymobar contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Keep credentials in memory only; never touch the system keychain.
    #[arg(long, global = true)]
    pub no_keychain: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Quiet mode (minimal output).
    #[arg(long, short, global = true)]
    pub quiet: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch current usage (default if no command specified).
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Log in and fetch usage.
    Login(login::LoginArgs),

    /// Forget remembered credentials and the session.
    Logout,

    /// Refresh usage periodically.
    #[command(visible_alias = "w")]
    Watch(watch::WatchArgs),

    /// Manage configuration.
    Config(config::ConfigArgs),
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable text with colors.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
}

/// CLI exit codes.
#[repr(i32)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// General error.
    Error = 1,
    /// The portal refused the credentials.
    AuthRejected = 2,
}

impl ExitCode {
    /// Picks the exit code for a failed command.
    fn for_error(error: &anyhow::Error) -> Self {
        match error.downcast_ref::<SessionError>() {
            Some(e) if e.is_auth_rejected() => ExitCode::AuthRejected,
            _ => ExitCode::Error,
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

fn setup_logging(verbose: bool, quiet: bool, level: LogLevel) {
    if quiet {
        return; // No logging in quiet mode
    }

    let filter = if verbose {
        EnvFilter::new("ymobar=debug,info")
    } else {
        EnvFilter::new(format!("ymobar={level}"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .without_time()
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = commands::load_settings().await;
    setup_logging(cli.verbose, cli.quiet, settings.log_level);

    let result: Result<()> = match &cli.command {
        Some(Commands::Usage(args)) => usage::run(args, &cli, &settings).await,
        Some(Commands::Login(args)) => login::run(args, &cli, &settings).await,
        Some(Commands::Logout) => logout::run(&cli, &settings).await,
        Some(Commands::Watch(args)) => watch::run(args, &cli, &settings).await,
        Some(Commands::Config(args)) => config::run(args, &cli).await,
        None => {
            // Default to usage command
            usage::run(&usage::UsageArgs::default(), &cli, &settings).await
        }
    };

    let code = match result {
        Ok(()) => ExitCode::Success,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {e:#}");
            }
            ExitCode::for_error(&e)
        }
    };
    std::process::exit(code as i32);
}
