//! Markdown report generation
//!
//! Renders the ranked books of one tag as a numbered Markdown list.

use crate::rating::BookRecord;
use chrono::Local;
use std::fmt::Write as _;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Format of the "updated" timestamp in the report header
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Writes the report for `tag` to `output_path`
///
/// Any existing file at the path is removed before the new report is written.
///
/// # Arguments
///
/// * `tag` - The catalog tag the books were listed under
/// * `books` - Books in report order
/// * `output_path` - Path where the markdown file should be written
pub fn write_report(tag: &str, books: &[BookRecord], output_path: &Path) -> io::Result<()> {
    let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
    let markdown = format_report(tag, books, &timestamp);

    match fs::remove_file(output_path) {
        Ok(()) => tracing::debug!("Removed previous report {}", output_path.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;
    file.flush()?;

    Ok(())
}

/// Formats the report as markdown
///
/// # Arguments
///
/// * `tag` - The catalog tag, used as the document title
/// * `books` - Books in report order
/// * `timestamp` - Value of the "updated" field
pub fn format_report(tag: &str, books: &[BookRecord], timestamp: &str) -> String {
    let mut md = String::new();

    // Header
    let _ = write!(md, "## {}\n\n", tag);
    md.push_str("## Book list\n\n");
    let _ = writeln!(md, "### Total {}, updated: {}", books.len(), timestamp);

    // One block per book; trailing double spaces are Markdown line breaks
    for (i, book) in books.iter().enumerate() {
        let _ = writeln!(md, "\n### No.{} {}", i + 1, book.name());
        let _ = writeln!(md, " > Name: [{}]({})  ", book.name(), book.detail_url());
        let _ = writeln!(
            md,
            " > Link: [{}]({})  ",
            book.detail_url(),
            book.detail_url()
        );
        let _ = writeln!(md, " > Rating: {:.1}  ", book.rating());
        let _ = writeln!(md, " > Rating count: {}  ", book.rating_count());
        let _ = writeln!(md, " > Synopsis: {}  ", book.synopsis());
    }

    md
}
