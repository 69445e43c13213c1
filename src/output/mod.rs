//! Output module for generating ranking reports
//!
//! This module handles rendering the sorted books of a run as a Markdown
//! report and writing it to disk.

mod markdown;

pub use markdown::{format_report, write_report, TIMESTAMP_FORMAT};
