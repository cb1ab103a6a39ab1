//! Text extraction for files handed to the summarizer.
//!
//! The summarization core only ever sees plain text. [`TextExtractor`] is the seam between the
//! two: [`PlainTextExtractor`] reads text-like files and renders CSV as a small table, and
//! reports binary office and PDF formats as unsupported so callers can skip them.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::processing::{Document, DocumentInfo};

/// Number of CSV data rows rendered into the extracted text.
pub const CSV_PREVIEW_ROWS: usize = 100;

const BINARY_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".doc", ".xlsx", ".xls", ".pptx"];

/// Errors raised while turning a file into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is a binary format this extractor does not parse.
    #[error("unsupported file format '{extension}' for {path}")]
    UnsupportedFormat {
        /// File that was rejected.
        path: String,
        /// Lower-cased extension, including the dot.
        extension: String,
    },
    /// The file exceeds the configured size limit.
    #[error("{path} is {size} bytes, above the {limit} byte limit")]
    TooLarge {
        /// File that was rejected.
        path: String,
        /// Size on disk.
        size: u64,
        /// Configured maximum.
        limit: u64,
    },
}

/// Produces raw text plus metadata for a file on disk.
pub trait TextExtractor {
    /// Extract the text of `path`.
    fn extract(&self, path: &Path) -> Result<Document, ExtractionError>;
}

/// Reads UTF-8 text (lossily) and renders CSV previews.
#[derive(Debug, Clone)]
pub struct PlainTextExtractor {
    max_file_size: u64,
}

impl Default for PlainTextExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE)
    }
}

impl PlainTextExtractor {
    /// Create an extractor that rejects files larger than `max_file_size` bytes.
    pub fn new(max_file_size: u64) -> Self {
        Self { max_file_size }
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Document, ExtractionError> {
        let display = path.display().to_string();
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| display.clone());
        let io_error = |source| ExtractionError::Io {
            path: display.clone(),
            source,
        };

        let size = fs::metadata(path).map_err(io_error)?.len();
        let info = DocumentInfo::from_filename(filename, size);
        if BINARY_EXTENSIONS.contains(&info.extension.as_str()) {
            return Err(ExtractionError::UnsupportedFormat {
                path: display.clone(),
                extension: info.extension,
            });
        }
        if size > self.max_file_size {
            return Err(ExtractionError::TooLarge {
                path: display.clone(),
                size,
                limit: self.max_file_size,
            });
        }

        let bytes = fs::read(path).map_err(io_error)?;
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let raw_text = if info.extension == ".csv" {
            render_csv(&info.filename, &text)
        } else {
            text
        };
        Ok(Document { info, raw_text })
    }
}

/// Render CSV as a header line listing the columns followed by the first rows.
fn render_csv(filename: &str, text: &str) -> String {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    let columns = lines.next().map(split_csv_line).unwrap_or_default();

    let mut rendered = format!(
        "CSV Data from {filename}:\nColumns: {}\n",
        columns.join(", ")
    );
    let rows: Vec<String> = lines
        .take(CSV_PREVIEW_ROWS)
        .enumerate()
        .map(|(row, line)| format!("{row}  {}", split_csv_line(line).join("  ")))
        .collect();
    rendered.push_str(&rows.join("\n"));
    rendered
}

/// Split one CSV record, honouring double-quoted fields and `""` escapes.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(ch),
        }
    }
    fields.push(field.trim().to_string());
    fields
}

/// Extract every path in order, skipping failures and files without text.
pub fn collect_documents<E, P>(extractor: &E, paths: &[P]) -> Vec<Document>
where
    E: TextExtractor + ?Sized,
    P: AsRef<Path>,
{
    paths
        .iter()
        .filter_map(|path| {
            let path = path.as_ref();
            match extractor.extract(path) {
                Ok(document) if document.raw_text.trim().is_empty() => {
                    tracing::warn!(path = %path.display(), "Skipping file without text");
                    None
                }
                Ok(document) => {
                    tracing::debug!(
                        path = %path.display(),
                        chars = document.raw_text.chars().count(),
                        "Extracted text"
                    );
                    Some(document)
                }
                Err(error) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %error,
                        "Skipping unreadable file"
                    );
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_lines_respect_quotes() {
        assert_eq!(
            split_csv_line(r#"name, "city, state", "say ""hi""""#),
            vec!["name", "city, state", r#"say "hi""#]
        );
    }

    #[test]
    fn csv_render_lists_columns_and_rows() {
        let rendered = render_csv("data.csv", "region,output\nnorth,12\nsouth,7\n");
        assert_eq!(
            rendered,
            "CSV Data from data.csv:\nColumns: region, output\n0  north  12\n1  south  7"
        );
    }

    #[test]
    fn csv_render_caps_rows() {
        let mut text = String::from("n\n");
        for i in 0..250 {
            text.push_str(&format!("{i}\n"));
        }
        let rendered = render_csv("big.csv", &text);
        assert_eq!(rendered.lines().count(), 2 + CSV_PREVIEW_ROWS);
    }
}
