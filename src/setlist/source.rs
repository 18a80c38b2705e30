//! Track sources feeding the fitter

use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

use super::track::Track;
use crate::error::Result;

/// Something that can list the tracks of a playlist
#[async_trait]
pub trait TrackSource: Send + Sync {
    /// Fetch every track of the playlist, in playlist order
    async fn fetch_tracks(&self, playlist_id: &str) -> Result<Vec<Track>>;
}

/// Reads tracks from a local JSON array instead of an API
///
/// The playlist id is ignored; the file is the playlist.
pub struct FileTrackSource {
    path: PathBuf,
}

impl FileTrackSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TrackSource for FileTrackSource {
    async fn fetch_tracks(&self, _playlist_id: &str) -> Result<Vec<Track>> {
        let contents = tokio::fs::read_to_string(&self.path).await?;
        let tracks: Vec<Track> = serde_json::from_str(&contents)?;
        debug!("Loaded {} tracks from {}", tracks.len(), self.path.display());
        Ok(tracks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetlistError;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_reads_tracks() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"name": "Intro - Band", "duration_secs": 95}},
                {{"name": "Closer - Band", "duration_secs": 301, "image_url": "https://img/1.jpg"}}
            ]"#
        )
        .unwrap();

        let source = FileTrackSource::new(file.path());
        let tracks = source.fetch_tracks("ignored").await.unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].name, "Intro - Band");
        assert_eq!(tracks[0].image_url, None);
        assert_eq!(tracks[1].duration_secs, 301);
        assert_eq!(tracks[1].image_url.as_deref(), Some("https://img/1.jpg"));
    }

    #[tokio::test]
    async fn test_file_source_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let source = FileTrackSource::new(file.path());
        let result = source.fetch_tracks("").await;
        assert!(matches!(result, Err(SetlistError::JsonParse(_))));
    }

    #[tokio::test]
    async fn test_file_source_missing_file() {
        let source = FileTrackSource::new("/nonexistent/setlister/tracks.json");
        assert!(matches!(
            source.fetch_tracks("").await,
            Err(SetlistError::Io(_))
        ));
    }
}
