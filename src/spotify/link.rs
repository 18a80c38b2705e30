//! Playlist link parsing

use url::Url;

use crate::error::{Result, SetlistError};

/// Extract the playlist id from a share link, a `spotify:playlist:` URI or a
/// bare id
///
/// ```text
/// https://open.spotify.com/playlist/37i9dQZF1DXcBWIGoYBM5M?si=abc
/// spotify:playlist:37i9dQZF1DXcBWIGoYBM5M
/// 37i9dQZF1DXcBWIGoYBM5M
/// ```
pub fn parse_playlist_id(link: &str) -> Result<String> {
    let link = link.trim();
    if link.is_empty() {
        return Err(SetlistError::InvalidPlaylistLink(
            "no playlist link given".to_string(),
        ));
    }

    if let Some(id) = link.strip_prefix("spotify:playlist:") {
        return validate_id(id, link);
    }

    if let Ok(url) = Url::parse(link) {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(link));
        }
        // Skip locale prefixes like /intl-de/playlist/<id>
        let id = url
            .path_segments()
            .ok_or_else(|| invalid(link))?
            .skip_while(|s| *s != "playlist")
            .nth(1)
            .ok_or_else(|| invalid(link))?;
        return validate_id(id, link);
    }

    validate_id(link, link)
}

fn validate_id(id: &str, link: &str) -> Result<String> {
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(id.to_string())
    } else {
        Err(invalid(link))
    }
}

fn invalid(link: &str) -> SetlistError {
    SetlistError::InvalidPlaylistLink(link.to_string())
}
