//! Excel export: a single `Reviews` worksheet with a bold header row.

use crate::reviews::{Review, FIELD_NAMES};
use anyhow::Result;
use rust_xlsxwriter::{Format, Workbook};
use std::path::Path;

const SHEET_NAME: &str = "Reviews";

/// Writes reviews to an `.xlsx` workbook. Ratings are stored as numbers.
pub fn write_excel(reviews: &[Review], path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, name) in FIELD_NAMES.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header)?;
    }

    for (idx, review) in reviews.iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, name) in FIELD_NAMES.iter().enumerate() {
            let col = col as u16;
            if *name == "rating" {
                worksheet.write_number(row, col, review.rating)?;
            } else {
                worksheet.write_string(row, col, review.field(name))?;
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}
