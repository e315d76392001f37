//! JSON-Lines to CSV conversion
//!
//! Produces `AuthorID,AuthorName,Content,DateTime` rows from an archive file.
//! Fields are written raw: commas, quotes and newlines inside message content
//! are not escaped, so the output is only reliable for simple content.

use crate::error::{Error, Result};
use crate::types::{matched_message, JsonValue};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Column header line
pub const CSV_HEADER: &str = "AuthorID,AuthorName,Content,DateTime";

/// One output row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvRow {
    pub author_id: String,
    pub author_name: String,
    pub content: String,
    pub timestamp: String,
}

impl CsvRow {
    /// Build a row from an archive entry (message group or bare message)
    pub fn from_entry(entry: &JsonValue) -> Result<Self> {
        let message =
            matched_message(entry).ok_or_else(|| Error::decode("entry has no message"))?;

        let author = message
            .get("author")
            .ok_or_else(|| Error::decode("message has no author"))?;

        Ok(Self {
            author_id: field(author, "id")?,
            author_name: field(author, "username")?,
            content: field(message, "content").unwrap_or_default(),
            timestamp: field(message, "timestamp")?,
        })
    }

    /// Render the row without a trailing newline
    pub fn to_line(&self) -> String {
        format!(
            "{},{},{},{}",
            self.author_id, self.author_name, self.content, self.timestamp
        )
    }
}

fn field(value: &JsonValue, key: &str) -> Result<String> {
    match value.get(key) {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        _ => Err(Error::decode(format!("missing field '{key}'"))),
    }
}

/// Converts archive files to CSV
#[derive(Debug, Clone, Default)]
pub struct CsvConverter {
    /// Write the column header before the first row
    header: bool,
}

impl CsvConverter {
    /// Create a converter with no header line
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the header line
    #[must_use]
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Convert lines from `reader`, writing rows to `writer`
    ///
    /// Blank lines are skipped. Returns the number of rows written.
    pub fn convert<R: BufRead, W: Write>(&self, reader: R, mut writer: W) -> Result<usize> {
        if self.header {
            writeln!(writer, "{CSV_HEADER}")?;
        }

        let mut rows = 0;
        for (line_num, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            let entry: JsonValue = serde_json::from_str(line).map_err(|e| {
                Error::decode(format!("Failed to parse JSONL at line {}: {e}", line_num + 1))
            })?;
            let row = CsvRow::from_entry(&entry).map_err(|e| {
                Error::decode(format!("Line {}: {e}", line_num + 1))
            })?;

            writeln!(writer, "{}", row.to_line())?;
            rows += 1;
        }

        writer.flush()?;
        Ok(rows)
    }

    /// Convert `input` and append the rows to `output`
    pub fn convert_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<usize> {
        let input = input.as_ref();
        let output = output.as_ref();

        let reader = BufReader::new(File::open(input).map_err(|e| {
            Error::output(format!("Failed to open {}: {e}", input.display()))
        })?);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(output)
            .map_err(|e| Error::output(format!("Failed to open {}: {e}", output.display())))?;

        let rows = self.convert(reader, BufWriter::new(file))?;
        debug!("Converted {} rows from {}", rows, input.display());
        Ok(rows)
    }
}
