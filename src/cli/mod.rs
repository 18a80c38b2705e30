//! CLI module for setlister

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::render::ExportFormat;
use crate::setlist::TargetDuration;

pub mod auth;
pub mod commands;

pub use auth::AuthManager;

#[derive(Parser, Debug)]
#[command(name = "setlister", about = "Fit a random setlist from a Spotify playlist into a target runtime")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Spotify application credentials, falling back to the keyring
#[derive(Args, Debug, Clone, Default)]
pub struct CredentialArgs {
    /// Spotify client id
    #[arg(long, env = "SPOTIFY_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Spotify client secret
    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Spotify playlist link, URI or id
    #[arg(value_name = "PLAYLIST", required_unless_present = "file")]
    pub playlist: Option<String>,

    /// Target duration in hours (e.g. 1.5)
    #[arg(short = 't', long)]
    pub hours: TargetDuration,

    /// Read tracks from a JSON file instead of Spotify
    #[arg(long, value_name = "PATH", conflicts_with = "playlist")]
    pub file: Option<PathBuf>,

    /// Export the setlist in this format
    #[arg(short, long, value_enum)]
    pub export: Option<ExportFormat>,

    /// Export destination (defaults to setlist.<ext>)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Open the interactive view (reshuffle with r, export with e)
    #[arg(short, long)]
    pub interactive: bool,

    /// Seed for a reproducible shuffle
    #[arg(long)]
    pub seed: Option<u64>,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store Spotify client credentials in the system keyring
    Auth {
        #[command(flatten)]
        credentials: CredentialArgs,

        /// Replace stored credentials and drop the cached token
        #[arg(long)]
        force: bool,
    },

    /// Fetch a playlist and fit a setlist into the target duration
    Generate(GenerateArgs),

    /// Print a valid access token (cached until it expires)
    Token {
        #[command(flatten)]
        credentials: CredentialArgs,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}
