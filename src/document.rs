//! Source documents and the text-extraction seam.
//!
//! Extraction is a collaborator: the pipeline only needs plain text plus a metadata record.
//! [`PlainTextExtractor`] covers text files whose pages are separated by form feeds; richer
//! formats plug in through [`TextExtractor`].

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

const PAGE_SEPARATOR: char = '\u{000C}';

/// Errors raised while reading a source document. Always fatal to the request.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The document could not be read from disk.
    #[error("failed to read document '{path}': {source}")]
    Io {
        /// Path we attempted to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document bytes were not valid UTF-8 text.
    #[error("document '{path}' is not valid UTF-8 text")]
    InvalidEncoding {
        /// Path of the offending document.
        path: PathBuf,
    },
}

/// Descriptive metadata accompanying a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Document title.
    pub title: Option<String>,
    /// Document author.
    pub author: Option<String>,
    /// Subject line.
    pub subject: Option<String>,
    /// Free-form keyword list.
    pub keywords: Option<String>,
    /// Creation timestamp as reported by the source.
    pub creation_date: Option<String>,
    /// Last modification timestamp as reported by the source.
    pub modification_date: Option<String>,
    /// Number of pages in the source document.
    pub page_count: usize,
}

impl DocumentMetadata {
    /// Title for prompt rendering, `Unknown` when absent.
    pub fn display_title(&self) -> &str {
        non_blank(self.title.as_deref()).unwrap_or("Unknown")
    }

    /// Author for prompt rendering, `Unknown` when absent.
    pub fn display_author(&self) -> &str {
        non_blank(self.author.as_deref()).unwrap_or("Unknown")
    }

    /// Keywords for prompt rendering, empty when absent.
    pub fn display_keywords(&self) -> &str {
        non_blank(self.keywords.as_deref()).unwrap_or("")
    }

    /// Page count for prompt rendering, `Unknown` when no pages were reported.
    pub fn display_page_count(&self) -> String {
        if self.page_count == 0 {
            "Unknown".to_string()
        } else {
            self.page_count.to_string()
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Raw text plus metadata for one summarization request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    metadata: DocumentMetadata,
}

impl Document {
    /// Build a document from already-extracted text.
    pub fn new(text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            text: text.into(),
            metadata,
        }
    }

    /// Full document text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Document metadata.
    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }
}

/// Source of document text and metadata.
pub trait TextExtractor: Send + Sync {
    /// Read the document at `path`.
    fn extract(&self, path: &Path) -> Result<Document, ExtractionError>;
}

/// Extractor for UTF-8 text files using form feeds as page breaks.
///
/// Each non-blank page is prefixed with `[Page N] ` (1-based, counted over all pages) and the
/// retained pages are joined by a blank line, which also gives the chunker a paragraph break
/// between pages. The title defaults to the file stem.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Construct the extractor.
    pub const fn new() -> Self {
        Self
    }

    /// Turn raw text into a [`Document`], as if it had been read from `path`.
    pub fn from_text(raw: &str, path: &Path) -> Document {
        let pages: Vec<&str> = raw.split(PAGE_SEPARATOR).collect();
        let text = pages
            .iter()
            .enumerate()
            .filter(|(_, page)| !page.trim().is_empty())
            .map(|(index, page)| format!("[Page {}] {}", index + 1, page))
            .collect::<Vec<_>>()
            .join("\n\n");

        let title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty());

        let metadata = DocumentMetadata {
            title,
            page_count: if raw.is_empty() { 0 } else { pages.len() },
            ..DocumentMetadata::default()
        };

        Document::new(text, metadata)
    }
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<Document, ExtractionError> {
        let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let raw = String::from_utf8(bytes).map_err(|_| ExtractionError::InvalidEncoding {
            path: path.to_path_buf(),
        })?;
        let document = Self::from_text(&raw, path);
        tracing::debug!(
            path = %path.display(),
            pages = document.metadata().page_count,
            chars = document.text().chars().count(),
            "Extracted document text"
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn pages_are_prefixed_and_blank_pages_skipped() {
        let document = PlainTextExtractor::from_text(
            "first page\u{000C}  \u{000C}third page",
            Path::new("report.txt"),
        );
        assert_eq!(
            document.text(),
            "[Page 1] first page\n\n[Page 3] third page"
        );
        assert_eq!(document.metadata().page_count, 3);
        assert_eq!(document.metadata().title.as_deref(), Some("report"));
    }

    #[test]
    fn empty_text_has_no_pages() {
        let document = PlainTextExtractor::from_text("", Path::new("empty.txt"));
        assert_eq!(document.text(), "");
        assert_eq!(document.metadata().page_count, 0);
    }

    #[test]
    fn metadata_display_defaults() {
        let metadata = DocumentMetadata {
            title: Some("  ".into()),
            ..DocumentMetadata::default()
        };
        assert_eq!(metadata.display_title(), "Unknown");
        assert_eq!(metadata.display_author(), "Unknown");
        assert_eq!(metadata.display_keywords(), "");
        assert_eq!(metadata.display_page_count(), "Unknown");
    }

    #[test]
    fn extract_reads_file_from_disk() {
        let mut file = tempfile::Builder::new()
            .suffix(".txt")
            .tempfile()
            .expect("temp file");
        write!(file, "Intro\u{000C}Body").expect("write");

        let document = PlainTextExtractor::new()
            .extract(file.path())
            .expect("extract");
        assert_eq!(document.text(), "[Page 1] Intro\n\n[Page 2] Body");
        assert_eq!(document.metadata().page_count, 2);
    }

    #[test]
    fn extract_reports_missing_and_binary_files() {
        let missing = PlainTextExtractor::new()
            .extract(Path::new("/definitely/not/here.txt"))
            .unwrap_err();
        assert!(matches!(missing, ExtractionError::Io { .. }));

        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(&[0xff, 0xfe, 0x00]).expect("write");
        let binary = PlainTextExtractor::new().extract(file.path()).unwrap_err();
        assert!(matches!(binary, ExtractionError::InvalidEncoding { .. }));
    }
}
