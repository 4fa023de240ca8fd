//! Docket CLI - runs named sessions such as the live documentation build.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use docket_session::RunError;
use tracing_subscriber::{filter::LevelFilter, fmt, EnvFilter};

mod commands;
mod config;

use config::DocketConfig;

#[derive(Parser)]
#[command(name = "docket")]
#[command(about = "Run named development sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to docket.toml config file
    #[arg(short, long, default_value = "docket.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List available sessions
    List,

    /// Run sessions by name (defaults from config, else all)
    Run {
        /// Sessions to run, in order
        sessions: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(cli.verbose, None);
            tracing::error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_logging(cli.verbose, config.log.level);

    match execute(cli.command, &config).await {
        Ok(code) => exit_code(code),
        Err(e) => {
            tracing::error!("{:#}", e);
            let code = e.downcast_ref::<RunError>().map_or(1, RunError::exit_code);
            exit_code(code)
        }
    }
}

async fn execute(command: Commands, config: &DocketConfig) -> Result<i32> {
    match command {
        Commands::List => {
            commands::list::run(config)?;
            Ok(0)
        }
        Commands::Run { sessions } => commands::run::run(&sessions, config).await,
    }
}

/// Initialize logging. `--verbose` wins over `RUST_LOG`, which wins over
/// the configured level.
fn init_logging(verbose: bool, configured: Option<LevelFilter>) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::default().add_directive(configured.unwrap_or(LevelFilter::INFO).into())
        })
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Truncate to the 0..=255 range a shell reports.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from((code & 0xff) as u8)
}
