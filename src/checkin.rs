use anyhow::{anyhow, Result};
use std::path::PathBuf;

// The marker holds a single YYYY-MM-DD string: the date of the last
// automatic daily check-in. It gates the once-per-day trigger the way the
// browser client's localStorage key did.

fn marker_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|d| d.join("studyplan-tui").join("last_checkin"))
}

/// The recorded check-in date, if any. An unreadable or absent marker just
/// means "not checked in today".
pub fn last_checkin() -> Option<String> {
    let path = marker_path()?;
    let contents = std::fs::read_to_string(&path).ok()?;
    let date = contents.trim();
    (!date.is_empty()).then(|| date.to_string())
}

/// Record that the daily check-in fired on `date`. Written at trigger time
/// regardless of whether the round trip later succeeds.
pub fn record_checkin(date: &str) -> Result<()> {
    let path = marker_path().ok_or_else(|| anyhow!("Could not determine cache directory"))?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, date)?;
    Ok(())
}
