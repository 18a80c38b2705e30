//! setlister - Fit a random setlist from a Spotify playlist into a target runtime

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod browse;
mod cli;
mod config;
mod error;
mod render;
mod setlist;
mod spotify;
mod utils;

use cli::{Cli, Commands};
use utils::ConditionalStderrLayer;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "setlister=debug,reqwest=debug"
    } else {
        "setlister=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(ConditionalStderrLayer::new(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        ))
        .init();

    match cli.command {
        Commands::Auth { credentials, force } => {
            cli::commands::auth(credentials, force).await?;
        }
        Commands::Generate(args) => {
            cli::commands::generate(args).await?;
        }
        Commands::Token { credentials } => {
            cli::commands::token(credentials).await?;
        }
        Commands::Completion { shell } => {
            cli::commands::completion(shell);
        }
    }

    Ok(())
}
