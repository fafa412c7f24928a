//! Export sinks for merged reviews (JSON, CSV, Excel).

pub mod csv;
pub mod excel;
pub mod json;

use crate::config::ExportFormat;
use crate::reviews::Review;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub use self::csv::{format_csv, write_csv};
pub use self::excel::write_excel;
pub use self::json::{format_json, write_json};

/// Writes reviews to `path` in the given format, creating parent directories.
///
/// Write failures are returned to the caller; a missing export is never silent.
pub fn export(reviews: &[Review], format: ExportFormat, path: &Path) -> Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let written = match format {
        ExportFormat::Json => write_json(reviews, path),
        ExportFormat::Csv => write_csv(reviews, path),
        ExportFormat::Excel => write_excel(reviews, path),
    };
    written.with_context(|| format!("Failed to write {} export to {}", format, path.display()))?;

    info!("{} export written to {} ({} reviews)", format, path.display(), reviews.len());
    Ok(path.to_path_buf())
}

/// Writes one `<output_dir>/<file_stem>.<ext>` file per format.
pub fn export_all(
    reviews: &[Review],
    formats: &[ExportFormat],
    output_dir: &Path,
    file_stem: &str,
) -> Result<Vec<PathBuf>> {
    formats
        .iter()
        .map(|format| {
            let path = output_dir.join(format!("{}.{}", file_stem, format.extension()));
            export(reviews, *format, &path)
        })
        .collect()
}
