//! Duration labels

/// Total runtime as "Xh Ym" (seconds are dropped)
pub fn total_label(total_secs: u64) -> String {
    format!("{}h {}m", total_secs / 3600, (total_secs % 3600) / 60)
}

/// Track length as "M:SS"
pub fn track_label(duration_secs: u64) -> String {
    format!("{}:{:02}", duration_secs / 60, duration_secs % 60)
}
