//! Setlist export to files

use anyhow::{Context, Result};
use clap::ValueEnum;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::info;

use super::format::{total_label, track_label};
use super::images::fetch_thumbnails;
use super::pdf::render_pdf;
use crate::setlist::Setlist;

pub(super) const TITLE: &str = "Generated Setlist:";

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Printable PDF sheet
    Pdf,
    /// Self-contained HTML page with embedded thumbnails
    Html,
    /// Plain text listing
    Text,
    /// Extended M3U playlist
    M3u,
    /// JSON dump of the setlist
    Json,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Text => "txt",
            Self::M3u => "m3u",
            Self::Json => "json",
        }
    }

    /// Default file name in the current directory
    pub fn default_path(&self) -> PathBuf {
        PathBuf::from(format!("setlist.{}", self.extension()))
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Options controlling an export
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub thumbnail_size: u32,
    pub image_concurrency: usize,
}

pub(super) fn total_line(setlist: &Setlist) -> String {
    format!(
        "Total Setlist Time: {}",
        total_label(setlist.total_duration_secs)
    )
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// HTML document; `thumbnails` holds one optional data URI per track
pub fn render_html(setlist: &Setlist, thumbnails: &[Option<String>], image_width: u32) -> String {
    let mut rows = String::new();
    for (i, track) in setlist.tracks.iter().enumerate() {
        let image = thumbnails
            .get(i)
            .and_then(|t| t.as_deref())
            .map(|uri| {
                format!(
                    r#"<img src="{}" alt="Artist Image" width="{}">"#,
                    uri, image_width
                )
            })
            .unwrap_or_default();
        rows.push_str(&format!(
            "      <tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
            image,
            escape_html(&track.name),
            track_label(track.duration_secs)
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>Setlist</title>
  <style>
    body {{ font-family: Helvetica, Arial, sans-serif; margin: 2em; }}
    table {{ border-collapse: collapse; }}
    td {{ padding: 4px 12px; vertical-align: middle; }}
    td:last-child {{ text-align: right; }}
  </style>
</head>
<body>
  <h1>{}</h1>
  <p>{}</p>
  <table>
    <tbody>
{}    </tbody>
  </table>
</body>
</html>
"#,
        TITLE,
        total_line(setlist),
        rows
    )
}

pub fn render_text(setlist: &Setlist) -> String {
    let mut out = format!("{}\n{}\n\n", TITLE, total_line(setlist));
    for track in &setlist.tracks {
        out.push_str(&format!(
            "{}    {}\n",
            track.name,
            track_label(track.duration_secs)
        ));
    }
    out
}

/// Extended M3U with the track length and name of each entry
pub fn render_m3u(setlist: &Setlist) -> String {
    let mut content = String::from("#EXTM3U\n");
    for track in &setlist.tracks {
        content.push_str(&format!("#EXTINF:{},{}\n", track.duration_secs, track.name));
        if let Some(url) = &track.image_url {
            content.push_str(&format!("#EXTIMG:{}\n", url));
        }
        content.push_str(&track.name);
        content.push('\n');
    }
    content
}

pub fn render_json(setlist: &Setlist) -> Result<String> {
    serde_json::to_string_pretty(setlist).context("Failed to serialize setlist")
}

async fn write(path: &Path, contents: Vec<u8>) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write setlist to {:?}", path))
}

/// Render the setlist in the requested format and write it to disk
pub async fn export(http_client: &Client, setlist: &Setlist, options: &ExportOptions) -> Result<PathBuf> {
    let contents = match options.format {
        ExportFormat::Pdf => render_pdf(setlist)?,
        ExportFormat::Html => {
            let thumbnails = fetch_thumbnails(
                http_client,
                setlist,
                options.thumbnail_size,
                options.image_concurrency,
            )
            .await;
            render_html(setlist, &thumbnails, options.thumbnail_size).into_bytes()
        }
        ExportFormat::Text => render_text(setlist).into_bytes(),
        ExportFormat::M3u => render_m3u(setlist).into_bytes(),
        ExportFormat::Json => render_json(setlist)?.into_bytes(),
    };

    write(&options.path, contents).await?;
    info!("Exported {} setlist to {}", options.format, options.path.display());
    Ok(options.path.clone())
}
