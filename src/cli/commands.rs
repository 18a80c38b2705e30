//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate as generate_completions;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::{AuthManager, CredentialArgs, GenerateArgs};
use crate::browse;
use crate::config::Settings;
use crate::error::SetlistError;
use crate::render::{self, ExportOptions};
use crate::setlist::{FileTrackSource, Session, TrackSource};
use crate::spotify::{ClientCredentials, SpotifyClient, TokenProvider, http_client, parse_playlist_id};

/// Build a token provider honoring the token cache setting
fn token_provider(settings: &Settings, http: reqwest::Client, creds: ClientCredentials) -> TokenProvider {
    let tokens = TokenProvider::new(http, &settings.token_url, creds);
    match settings.token_cache_path() {
        Some(path) => tokens.with_cache_file(path),
        None => tokens,
    }
}

/// Handle the `auth` command
pub async fn auth(credentials: CredentialArgs, force: bool) -> Result<()> {
    println!("{}", "Configuring Spotify client credentials...".cyan());

    let settings = Settings::load()?;
    let creds = AuthManager::authenticate(credentials, force, &settings).await?;

    println!();
    println!("{}", "Authentication successful!".green().bold());
    println!("  Client id: {}", creds.client_id);
    println!();
    println!("Credentials stored securely in system keyring.");

    Ok(())
}

/// Handle the `token` command
pub async fn token(credentials: CredentialArgs) -> Result<()> {
    let settings = Settings::load()?;
    let creds = AuthManager::resolve(&credentials)?;
    let tokens = token_provider(&settings, http_client(settings.http_timeout_secs)?, creds);

    let token = tokens.get_token().await?;
    println!("{}", token);
    Ok(())
}

/// Handle the `generate` command
pub async fn generate(args: GenerateArgs) -> Result<()> {
    let settings = Settings::load()?;

    // Reject a bad link before any network access
    let playlist_id = match (&args.file, &args.playlist) {
        (Some(_), _) => String::new(),
        (None, Some(link)) => parse_playlist_id(link)?,
        (None, None) => {
            return Err(SetlistError::InvalidPlaylistLink("no playlist link given".to_string()).into());
        }
    };

    let http = http_client(settings.http_timeout_secs)?;

    let source: Box<dyn TrackSource> = match &args.file {
        Some(path) => Box::new(FileTrackSource::new(path)),
        None => {
            let creds = AuthManager::resolve(&args.credentials)?;
            let tokens = token_provider(&settings, http.clone(), creds);
            Box::new(SpotifyClient::new(&settings.api_base_url, http.clone(), Arc::new(tokens)))
        }
    };

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .context("Invalid spinner template")?,
    );
    spinner.set_message("Fetching playlist...");
    spinner.enable_steady_tick(Duration::from_millis(100));

    let fetched = source.fetch_tracks(&playlist_id).await;
    spinner.finish_and_clear();

    let tracks = fetched
        .context("Failed to fetch playlist. Please check the link or try again later.")?;
    info!("Fetched {} tracks", tracks.len());

    let mut session = match Session::new(tracks, args.hours) {
        Ok(session) => session,
        Err(SetlistError::EmptyPlaylist) => {
            println!(
                "{}",
                "No songs found in the playlist. Please ensure the playlist has tracks.".yellow()
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut rng = match args.seed {
        Some(seed) => {
            debug!("Using shuffle seed {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let format = args.export.unwrap_or(settings.export_format);
    let export_options = ExportOptions {
        format,
        path: args.output.clone().unwrap_or_else(|| format.default_path()),
        thumbnail_size: settings.thumbnail_size,
        image_concurrency: settings.image_concurrency,
    };

    session.generate(&mut rng);

    if args.interactive {
        browse::run_setlist_view(&mut session, &mut rng, &http, &export_options).await?;
    }

    let setlist = session.setlist();
    println!(
        "Selected {} of {} tracks for a {} target.",
        setlist.len(),
        session.tracks().len(),
        session.target()
    );
    println!();
    render::print_table(setlist);

    if !args.interactive && (args.export.is_some() || args.output.is_some()) {
        let path = render::export(&http, setlist, &export_options).await?;
        println!();
        println!("Saved setlist to {}", path.display().to_string().cyan());
    }

    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    write_completions(shell, &mut io::stdout());
}

fn write_completions(shell: clap_complete::Shell, out: &mut dyn io::Write) {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    generate_completions(shell, &mut cmd, "setlister", out);
}
