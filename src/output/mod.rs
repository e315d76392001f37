//! Output module
//!
//! Handles the on-disk archive and its CSV export.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Appending message entries to a JSON-Lines archive
//! - Converting an archive to `AuthorID,AuthorName,Content,DateTime` CSV

mod csv;
mod writer;

pub use csv::{CsvConverter, CsvRow, CSV_HEADER};
pub use writer::JsonlWriter;
