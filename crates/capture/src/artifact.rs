use foundation::time::{IsoDate, filename_timestamp};

/// `globe-view-<timestamp>.png`
pub fn screenshot_filename(unix_secs: u64) -> String {
    format!("globe-view-{}.png", filename_timestamp(unix_secs))
}

/// `comparison-<before>-vs-<after>.png`
pub fn comparison_filename(before: &IsoDate, after: &IsoDate) -> String {
    format!("comparison-{before}-vs-{after}.png")
}
