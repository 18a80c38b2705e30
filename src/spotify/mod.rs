//! Spotify Web API client module

pub mod client;
pub mod link;
pub mod models;
pub mod token;

pub use client::{SpotifyClient, http_client};
pub use link::parse_playlist_id;
pub use token::{ClientCredentials, TokenProvider};
