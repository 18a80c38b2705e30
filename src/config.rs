//! User configuration
//!
//! Stored in ~/.config/setlister/config.json. Missing file or missing fields
//! fall back to defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::render::document::ExportFormat;

/// Persistent settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spotify Web API base URL
    pub api_base_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// Timeout for every HTTP request, in seconds
    pub http_timeout_secs: u64,
    /// Longest side of exported thumbnails, in pixels
    pub thumbnail_size: u32,
    /// Number of cover images fetched at once during export
    pub image_concurrency: usize,
    /// Format used by the interactive export key
    pub export_format: ExportFormat,
    /// Reuse the access token between runs
    pub persist_token: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "https://api.spotify.com/v1".to_string(),
            token_url: "https://accounts.spotify.com/api/token".to_string(),
            http_timeout_secs: 30,
            thumbnail_size: 50,
            image_concurrency: 4,
            export_format: ExportFormat::Pdf,
            persist_token: true,
        }
    }
}

impl Settings {
    /// Load settings from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {:?}", path))?;

        let settings: Self =
            serde_json::from_str(&contents).with_context(|| "Failed to parse config")?;

        debug!("Loaded config from {:?}", path);
        Ok(settings)
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("setlister").join("config.json"))
    }

    /// Where the access token cache lives, if persistence is enabled
    pub fn token_cache_path(&self) -> Option<PathBuf> {
        if !self.persist_token {
            return None;
        }
        dirs::cache_dir().map(|d| d.join("setlister").join("token.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(settings.thumbnail_size, 50);
        assert_eq!(settings.export_format, ExportFormat::Pdf);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"thumbnail_size": 80, "export_format": "m3u"}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.thumbnail_size, 80);
        assert_eq!(settings.export_format, ExportFormat::M3u);
        assert_eq!(settings.http_timeout_secs, 30);
        assert_eq!(settings.api_base_url, "https://api.spotify.com/v1");
    }

    #[test]
    fn test_token_persistence_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"persist_token": false, "image_concurrency": 8}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.image_concurrency, 8);
        assert!(settings.token_cache_path().is_none());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
