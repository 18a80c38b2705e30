//! Plain terminal table for a setlist

use colored::Colorize;

use super::format::{total_label, track_label};
use crate::setlist::Setlist;

/// Render the setlist as numbered rows followed by the total
pub fn render_table(setlist: &Setlist) -> String {
    let name_width = setlist
        .tracks
        .iter()
        .map(|t| t.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Song".len());
    let index_width = setlist.len().to_string().len().max(1);

    let mut out = String::new();
    out.push_str(&format!(
        "{:>iw$}  {:<nw$}  {}\n",
        "#",
        "Song",
        "Duration",
        iw = index_width,
        nw = name_width
    ));

    for (i, track) in setlist.tracks.iter().enumerate() {
        out.push_str(&format!(
            "{:>iw$}  {:<nw$}  {:>8}\n",
            i + 1,
            track.name,
            track_label(track.duration_secs),
            iw = index_width,
            nw = name_width
        ));
    }

    out.push('\n');
    out.push_str(&format!(
        "Total Setlist Time: {}",
        total_label(setlist.total_duration_secs)
    ));
    out
}

/// Print the table with a colored header and total
pub fn print_table(setlist: &Setlist) {
    let rendered = render_table(setlist);
    let mut lines = rendered.lines();

    if let Some(header) = lines.next() {
        println!("{}", header.bold());
    }
    for line in lines {
        if line.starts_with("Total Setlist Time:") {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line);
        }
    }
}
