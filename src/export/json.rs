//! JSON export: a pretty-printed array of review objects.

use crate::reviews::Review;
use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Formats reviews as a pretty-printed JSON array.
pub fn format_json(reviews: &[Review]) -> Result<String> {
    Ok(serde_json::to_string_pretty(reviews)?)
}

/// Writes reviews as a UTF-8 JSON array.
pub fn write_json(reviews: &[Review], path: &Path) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(format_json(reviews)?.as_bytes())?;
    file.write_all(b"\n")?;
    Ok(())
}
