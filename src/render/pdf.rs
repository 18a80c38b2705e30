//! PDF export: an A4 sheet with the title, total line and one row per track

use anyhow::{Result, anyhow};
use printpdf::{BuiltinFont, Mm, PdfDocument};

use super::document::{TITLE, total_line};
use super::format::track_label;
use crate::setlist::Setlist;

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const LEFT_MM: f32 = 10.0;
const DURATION_X_MM: f32 = 150.0;
/// Distance from the top edge where track rows start
const FIRST_ROW_MM: f32 = 30.0;
/// Distance from the top edge where rows resume on later pages
const CONTINUED_ROW_MM: f32 = 15.0;
const BOTTOM_MM: f32 = 15.0;
const ROW_MM: f32 = 10.0;
const WRAPPED_LINE_MM: f32 = 4.5;

const TITLE_PT: f32 = 16.0;
const TOTAL_PT: f32 = 12.0;
const ROW_PT: f32 = 10.0;

/// Characters of 10pt Helvetica that fit the 60 mm name column
const NAME_COLUMN_CHARS: usize = 32;

/// Word-wrap `name` into lines of at most `width` characters
///
/// Words longer than a line are split.
pub fn wrap_name(name: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in name.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width.max(1)) {
            let chunk: String = chunk.iter().collect();
            let current_len = current.chars().count();
            if current_len > 0 && current_len + 1 + chunk.chars().count() > width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&chunk);
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Height a track row takes on the page
fn row_height(lines: usize) -> f32 {
    ROW_MM + lines.saturating_sub(1) as f32 * WRAPPED_LINE_MM
}

/// PDF y coordinates run up from the bottom edge
fn from_top(offset_mm: f32) -> Mm {
    Mm(PAGE_HEIGHT_MM - offset_mm)
}

/// Render the setlist as PDF bytes
pub fn render_pdf(setlist: &Setlist) -> Result<Vec<u8>> {
    let (doc, page, layer) = PdfDocument::new(
        "Setlist",
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Setlist",
    );
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| anyhow!("Failed to load PDF font: {:?}", e))?;

    let mut layer = doc.get_page(page).get_layer(layer);
    layer.use_text(TITLE, TITLE_PT, Mm(LEFT_MM), from_top(10.0), &font);
    layer.use_text(total_line(setlist), TOTAL_PT, Mm(LEFT_MM), from_top(20.0), &font);

    let mut y = FIRST_ROW_MM;
    for track in &setlist.tracks {
        let lines = wrap_name(&track.name, NAME_COLUMN_CHARS);
        let height = row_height(lines.len());

        if y + height > PAGE_HEIGHT_MM - BOTTOM_MM {
            let (page, index) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Setlist");
            layer = doc.get_page(page).get_layer(index);
            y = CONTINUED_ROW_MM;
        }

        for (i, line) in lines.iter().enumerate() {
            let line_y = y + i as f32 * WRAPPED_LINE_MM;
            layer.use_text(line.as_str(), ROW_PT, Mm(LEFT_MM), from_top(line_y), &font);
        }
        layer.use_text(
            track_label(track.duration_secs),
            ROW_PT,
            Mm(DURATION_X_MM),
            from_top(y),
            &font,
        );
        y += height;
    }

    doc.save_to_bytes()
        .map_err(|e| anyhow!("Failed to write PDF: {:?}", e))
}
