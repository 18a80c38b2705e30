//! Spotify Web API HTTP client

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::models::{ApiErrorResponse, PlaylistTracksPage};
use super::token::TokenProvider;
use crate::error::{Result, SetlistError};
use crate::setlist::{Track, TrackSource};

/// Page size for playlist item requests (API maximum)
const PAGE_LIMIT: u32 = 100;

/// Build the shared HTTP client
pub fn http_client(timeout_secs: u64) -> Result<Client> {
    let client = Client::builder()
        .user_agent(concat!("setlister/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(timeout_secs))
        .build()?;
    Ok(client)
}

/// HTTP client for the Spotify Web API
#[derive(Clone)]
pub struct SpotifyClient {
    base_url: String,
    http_client: Client,
    tokens: Arc<TokenProvider>,
}

impl SpotifyClient {
    pub fn new(base_url: &str, http_client: Client, tokens: Arc<TokenProvider>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
            tokens,
        }
    }

    fn playlist_tracks_url(&self, playlist_id: &str) -> String {
        format!(
            "{}/playlists/{}/tracks?limit={}",
            self.base_url,
            urlencoding::encode(playlist_id),
            PAGE_LIMIT
        )
    }

    /// Fetch a single page of playlist items
    async fn get_page(&self, url: &str) -> Result<PlaylistTracksPage> {
        let token = self.tokens.get_token().await?;
        debug!("Fetching playlist page: {}", url);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(token)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Ok(response.json().await?)
    }

    /// Fetch all tracks of a playlist, following `next` links until exhausted
    pub async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        let mut tracks = Vec::new();
        let mut next_url = Some(self.playlist_tracks_url(playlist_id));
        let mut pages = 0;

        while let Some(url) = next_url {
            let page = self.get_page(&url).await?;
            pages += 1;
            if pages == 1
                && let Some(total) = page.total
            {
                debug!("Playlist {} reports {} items", playlist_id, total);
            }

            tracks.extend(
                page.items
                    .into_iter()
                    .filter_map(|item| item.track)
                    .map(Track::from),
            );
            next_url = page.next;
        }

        debug!(
            "Fetched {} tracks for playlist {} in {} page(s)",
            tracks.len(),
            playlist_id,
            pages
        );
        Ok(tracks)
    }

    /// Turn a non-success response into an error
    async fn check_response(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorResponse>(&body)
            .map(|e| e.error.message)
            .ok()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| status.to_string());

        Err(SetlistError::from_status(status.as_u16(), message))
    }
}

#[async_trait]
impl TrackSource for SpotifyClient {
    async fn fetch_tracks(&self, playlist_id: &str) -> Result<Vec<Track>> {
        self.get_playlist_tracks(playlist_id).await
    }
}
