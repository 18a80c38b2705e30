//! Keyring-based storage for Spotify client credentials

use anyhow::{Context, Result};
use dialoguer::{Input, Password};
use keyring::Entry;
use tracing::{debug, info};

use super::CredentialArgs;
use crate::config::Settings;
use crate::error::SetlistError;
use crate::spotify::{ClientCredentials, TokenProvider, http_client};

const KEYRING_SERVICE: &str = "setlister";

/// Manages client credential storage
pub struct AuthManager;

impl AuthManager {
    /// Store client credentials after checking they can obtain a token
    ///
    /// Stored credentials are returned as-is unless `force` is set. Missing
    /// values are prompted for.
    pub async fn authenticate(
        args: CredentialArgs,
        force: bool,
        settings: &Settings,
    ) -> Result<ClientCredentials> {
        if !force {
            if let Ok(creds) = Self::load() {
                info!("Found existing credentials in keyring");
                return Ok(creds);
            }
        } else {
            debug!("Force flag set, ignoring stored credentials");
        }

        let client_id = match args.client_id {
            Some(id) => id,
            None => Input::new()
                .with_prompt("Spotify client id")
                .interact_text()
                .context("Failed to read client id")?,
        };

        let client_secret = match args.client_secret {
            Some(secret) => secret,
            None => Password::new()
                .with_prompt("Spotify client secret")
                .interact()
                .context("Failed to read client secret")?,
        };

        let creds = ClientCredentials {
            client_id: client_id.trim().to_string(),
            client_secret: client_secret.trim().to_string(),
        };

        Self::verify(&creds, settings, force).await?;

        Self::store(&creds)?;
        info!("Credentials stored in keyring");

        Ok(creds)
    }

    /// Credentials from flags/environment, falling back to the keyring
    pub fn resolve(args: &CredentialArgs) -> std::result::Result<ClientCredentials, SetlistError> {
        if let (Some(client_id), Some(client_secret)) = (&args.client_id, &args.client_secret) {
            debug!("Using client credentials from command line or environment");
            return Ok(ClientCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            });
        }

        Self::load().map_err(|e| {
            debug!("No usable keyring credentials: {:#}", e);
            SetlistError::MissingCredentials
        })
    }

    /// Load credentials from keyring
    pub fn load() -> Result<ClientCredentials> {
        let client_id = Self::get_entry("client_id")?
            .get_password()
            .context("No Spotify client id in keyring")?;

        let client_secret = Self::get_entry("client_secret")?
            .get_password()
            .context("No Spotify client secret in keyring")?;

        Ok(ClientCredentials {
            client_id,
            client_secret,
        })
    }

    /// Store credentials in keyring
    pub fn store(creds: &ClientCredentials) -> Result<()> {
        Self::get_entry("client_id")?
            .set_password(&creds.client_id)
            .context("Failed to store client id in keyring")?;

        Self::get_entry("client_secret")?
            .set_password(&creds.client_secret)
            .context("Failed to store client secret in keyring")?;

        debug!("Credentials stored in keyring");
        Ok(())
    }

    /// Request a token with the credentials to prove they work
    async fn verify(creds: &ClientCredentials, settings: &Settings, force: bool) -> Result<()> {
        debug!("Verifying credentials against {}", settings.token_url);

        let mut tokens =
            TokenProvider::new(http_client(settings.http_timeout_secs)?, &settings.token_url, creds.clone());
        if let Some(path) = settings.token_cache_path() {
            tokens = tokens.with_cache_file(path);
        }
        if force {
            tokens.invalidate().await;
        }

        tokens
            .get_token()
            .await
            .context("Failed to verify credentials")?;

        info!("Credentials verified successfully");
        Ok(())
    }

    fn get_entry(key: &str) -> Result<Entry> {
        let entry_key = format!("spotify:{}", key);
        Entry::new(KEYRING_SERVICE, &entry_key).context("Failed to access keyring")
    }
}
