//! Hive - a team of chat agents sharing one conversation
//!
//! CLI entry point.

#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod config;
mod team;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hive=info,hive_core=info,hive_channels=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = cli::Cli::parse();

    if cli.command.is_some() {
        info!("Hive v{}", env!("CARGO_PKG_VERSION"));
        if !std::path::Path::new(".env").exists() {
            debug!(".env file not found. Run 'hive init' to create one.");
        }
    }

    cli::run(cli).await
}
