//! CSV export with a fixed header row.

use crate::reviews::{Review, FIELD_NAMES};
use anyhow::Result;
use std::path::Path;

/// Formats reviews as CSV, header first.
pub fn format_csv(reviews: &[Review]) -> String {
    let mut lines = Vec::with_capacity(reviews.len() + 1);
    lines.push(FIELD_NAMES.join(","));

    for review in reviews {
        let row: Vec<String> =
            FIELD_NAMES.iter().map(|name| csv_escape(&review.field(name))).collect();
        lines.push(row.join(","));
    }

    let mut output = lines.join("\n");
    output.push('\n');
    output
}

/// Writes reviews as a UTF-8 CSV file.
pub fn write_csv(reviews: &[Review], path: &Path) -> Result<()> {
    std::fs::write(path, format_csv(reviews))?;
    Ok(())
}

fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
