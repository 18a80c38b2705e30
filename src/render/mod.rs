//! Setlist presentation: labels, terminal table, document and PDF export

pub mod document;
pub mod format;
pub mod images;
pub mod pdf;
pub mod table;

pub use document::{ExportFormat, ExportOptions, export};
pub use format::{total_label, track_label};
pub use table::print_table;
