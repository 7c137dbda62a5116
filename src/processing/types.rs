//! Core data types and error definitions for the summarization pipeline.

use crate::document::{DocumentMetadata, ExtractionError};
use crate::summarization::SummarizationClientError;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors produced while turning raw text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// The pipeline was configured with an impossible size budget.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
}

/// Fatal errors emitted by the summarization pipeline.
#[derive(Debug, Error)]
pub enum SummarizeError {
    /// The source document could not be read.
    #[error("Failed to extract document: {0}")]
    Extraction(#[from] ExtractionError),
    /// Chunking rejected its configuration.
    #[error("Failed to chunk document: {0}")]
    Chunking(#[from] ChunkingError),
    /// The final combining call failed; there is no stage left to fall back to.
    #[error("Failed to combine section summaries: {0}")]
    Reduce(#[source] SummarizationClientError),
}

/// Why a single chunk has no summary. Captured into its [`ChunkResult`], never propagated.
#[derive(Debug, Error)]
pub enum ChunkFailure {
    /// The summarization client returned an error.
    #[error("{0}")]
    Client(#[from] SummarizationClientError),
    /// The call exceeded the per-call timeout.
    #[error("summarization call timed out after {0:?}")]
    TimedOut(Duration),
    /// The worker task ended without reporting a result.
    #[error("summarization task aborted: {0}")]
    Aborted(String),
}

impl ChunkFailure {
    /// Placeholder text substituted for the missing section summary.
    pub fn placeholder(&self) -> String {
        format!("[Error summarizing this section: {self}]")
    }
}

/// Prompt framing applied to map and reduce calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Emphasize financial terms, obligations, risks, and dates.
    #[default]
    Financial,
    /// Neutral framing for any document.
    General,
}

impl std::str::FromStr for SummaryMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "financial" => Ok(Self::Financial),
            "general" | "generic" => Ok(Self::General),
            _ => Err(()),
        }
    }
}

/// A contiguous slice of the document tagged with its emission position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Zero-based position in emission order.
    pub index: usize,
    /// Byte offset of the chunk's first character in the source text.
    pub offset: usize,
    /// Chunk text.
    pub text: String,
}

/// Outcome of summarizing one chunk.
#[derive(Debug)]
pub struct ChunkResult {
    /// Index of the chunk this result belongs to.
    pub index: usize,
    /// Summary text, or the captured failure.
    pub outcome: Result<String, ChunkFailure>,
}

impl ChunkResult {
    /// Summary text, or the failure placeholder when the chunk failed.
    pub fn summary_text(&self) -> String {
        match &self.outcome {
            Ok(summary) => summary.clone(),
            Err(failure) => failure.placeholder(),
        }
    }
}

/// Terminal record returned for every summarized document.
///
/// `section_summaries` always holds `chunk_count` entries in source order; failed sections
/// carry their placeholder text and are listed in `failed_sections`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryReport {
    /// Metadata of the summarized document.
    pub metadata: DocumentMetadata,
    /// Number of chunks the document was split into.
    pub chunk_count: usize,
    /// Per-chunk summaries ordered by chunk index.
    pub section_summaries: Vec<String>,
    /// Indices of sections whose summary is an error placeholder.
    pub failed_sections: Vec<usize>,
    /// Combined summary of the whole document.
    pub final_summary: String,
}
