//! Cover thumbnails for exported documents
//!
//! Images are fetched, shrunk to a small JPEG and inlined as base64 data URIs
//! so the exported document has no external references.

use anyhow::{Context, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::stream::{self, StreamExt};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageReader};
use reqwest::Client;
use std::io::Cursor;
use tracing::{debug, warn};

use crate::setlist::Setlist;

const JPEG_QUALITY: u8 = 80;

/// Decode an image and re-encode it as a JPEG no larger than `max_size`
pub fn process_thumbnail(data: &[u8], max_size: u32) -> Result<Vec<u8>> {
    let img = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .context("Failed to guess image format")?
        .decode()
        .context("Failed to decode image")?;

    let img = DynamicImage::ImageRgb8(resize_to_fit(img, max_size).to_rgb8());

    let mut output = Vec::new();
    JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY)
        .encode_image(&img)
        .context("Failed to encode thumbnail as JPEG")?;

    debug!(
        "Thumbnail: {}x{} -> {} bytes",
        img.width(),
        img.height(),
        output.len()
    );
    Ok(output)
}

/// Resize to fit within `max_size` while keeping the aspect ratio
fn resize_to_fit(img: DynamicImage, max_size: u32) -> DynamicImage {
    let (width, height) = (img.width(), img.height());

    if width <= max_size && height <= max_size {
        return img;
    }

    let (new_width, new_height) = if width > height {
        let ratio = max_size as f64 / width as f64;
        (max_size, ((height as f64 * ratio) as u32).max(1))
    } else {
        let ratio = max_size as f64 / height as f64;
        (((width as f64 * ratio) as u32).max(1), max_size)
    };

    img.resize_exact(new_width, new_height, FilterType::Lanczos3)
}

/// Wrap JPEG bytes in a data URI
pub fn to_data_uri(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg))
}

async fn fetch_thumbnail(http_client: &Client, url: &str, max_size: u32) -> Result<String> {
    let response = http_client
        .get(url)
        .send()
        .await
        .context("Failed to fetch image")?;

    if !response.status().is_success() {
        anyhow::bail!("Image not found (status {})", response.status());
    }

    let data: bytes::Bytes = response
        .bytes()
        .await
        .context("Failed to read image response")?;

    let jpeg = tokio::task::spawn_blocking(move || process_thumbnail(&data, max_size))
        .await
        .context("Thumbnail task panicked")??;

    Ok(to_data_uri(&jpeg))
}

/// Thumbnail data URIs for every track, in setlist order
///
/// Tracks without an image, or whose image fails to load, get `None`.
pub async fn fetch_thumbnails(
    http_client: &Client,
    setlist: &Setlist,
    max_size: u32,
    concurrency: usize,
) -> Vec<Option<String>> {
    stream::iter(setlist.tracks.iter())
        .map(|track| async move {
            let url = track.image_url.as_deref()?;
            match fetch_thumbnail(http_client, url, max_size).await {
                Ok(uri) => Some(uri),
                Err(e) => {
                    warn!("No thumbnail for '{}': {:#}", track.name, e);
                    None
                }
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}
