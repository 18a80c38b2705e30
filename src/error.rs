//! Error types for setlist generation

use thiserror::Error;

/// Result alias for the setlist domain
pub type Result<T> = std::result::Result<T, SetlistError>;

/// Errors surfaced while fetching a playlist and fitting a setlist
#[derive(Error, Debug)]
pub enum SetlistError {
    /// Target duration missing, non-numeric, zero or negative
    #[error("Invalid target duration: {0}")]
    InvalidTarget(String),

    /// The playlist link could not be parsed
    #[error("Invalid Spotify playlist link: {0}")]
    InvalidPlaylistLink(String),

    /// No client id / secret available for the token endpoint
    #[error("No Spotify client credentials found. Run 'setlister auth' or set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET")]
    MissingCredentials,

    /// The token endpoint refused to issue a token
    #[error("Failed to fetch Spotify token: {0}")]
    TokenRequest(String),

    /// Token rejected or expired
    #[error("Spotify authorization failed: {0}")]
    Unauthorized(String),

    /// Playlist does not exist or is not visible
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("Rate limit exceeded, please try again later")]
    RateLimited,

    /// Any other non-success response from the API
    #[error("Spotify API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The source returned zero usable tracks
    #[error("No songs found in the playlist")]
    EmptyPlaylist,
}

impl SetlistError {
    /// Map an API status code and message to an error
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized(message.into()),
            404 => Self::PlaylistNotFound(message.into()),
            429 => Self::RateLimited,
            _ => Self::Api {
                status,
                message: message.into(),
            },
        }
    }
}
