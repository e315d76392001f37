//! JSON-Lines writer
//!
//! Appends message entries to a file, one serialized entry per line. The
//! file is opened in append mode for each batch and closed again before the
//! next request, so no handle outlives a page.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Append-only JSON-Lines writer
#[derive(Debug, Clone)]
pub struct JsonlWriter {
    /// Output file
    path: PathBuf,
    /// Number of lines written by this writer
    lines_written: u64,
}

impl JsonlWriter {
    /// Create a writer for `path`; nothing is opened until the first append
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lines_written: 0,
        }
    }

    /// Output file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lines written so far
    #[must_use]
    pub fn lines_written(&self) -> u64 {
        self.lines_written
    }

    /// Append a batch of entries, returning how many lines were written
    ///
    /// The file is created if missing, even for an empty batch.
    pub fn append(&mut self, entries: &[JsonValue]) -> Result<usize> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                Error::output(format!("Failed to open {}: {e}", self.path.display()))
            })?;

        let mut writer = BufWriter::new(file);
        for entry in entries {
            serde_json::to_writer(&mut writer, entry)?;
            writer.write_all(b"\n")?;
        }
        writer.flush().map_err(|e| {
            Error::output(format!("Failed to flush {}: {e}", self.path.display()))
        })?;

        self.lines_written += entries.len() as u64;
        Ok(entries.len())
    }
}
