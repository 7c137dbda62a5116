//! Reduce stage: restore source order and combine section summaries in one call.

use std::time::Duration;

use crate::document::DocumentMetadata;
use crate::summarization::{SummarizationClient, SummarizationClientError};

use super::prompt::build_reduce_prompt;
use super::types::{ChunkResult, SummarizeError, SummaryMode};

/// Ordered section summaries plus the combined final summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReducedSummary {
    /// Section summaries in chunk order; failed sections hold their placeholder.
    pub section_summaries: Vec<String>,
    /// Indices of failed sections.
    pub failed_sections: Vec<usize>,
    /// Output of the combining call.
    pub final_summary: String,
}

/// Sort results by chunk index and render each as summary text.
///
/// Failed chunks contribute their placeholder verbatim so the gap stays visible downstream.
pub fn order_section_summaries(mut results: Vec<ChunkResult>) -> (Vec<String>, Vec<usize>) {
    results.sort_by_key(|result| result.index);
    let failed = results
        .iter()
        .filter(|result| result.outcome.is_err())
        .map(|result| result.index)
        .collect();
    let summaries = results.iter().map(ChunkResult::summary_text).collect();
    (summaries, failed)
}

/// Combine chunk results into the final summary with a single client call.
///
/// The concatenated section block is never re-chunked, however long it gets. A failing call
/// is fatal: it surfaces as [`SummarizeError::Reduce`] instead of an empty summary.
pub async fn reduce_summaries(
    client: &dyn SummarizationClient,
    results: Vec<ChunkResult>,
    metadata: &DocumentMetadata,
    mode: SummaryMode,
    call_timeout: Option<Duration>,
) -> Result<ReducedSummary, SummarizeError> {
    let (section_summaries, failed_sections) = order_section_summaries(results);
    let prompt = build_reduce_prompt(&section_summaries, metadata, mode);
    tracing::debug!(
        sections = section_summaries.len(),
        failed = failed_sections.len(),
        prompt_chars = prompt.chars().count(),
        "Combining section summaries"
    );

    let call = client.generate_summary(&prompt);
    let outcome = match call_timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| Err(SummarizationClientError::Timeout(limit))),
        None => call.await,
    };

    let final_summary = outcome.map_err(|error| {
        tracing::error!(error = %error, "Reduce stage failed");
        SummarizeError::Reduce(error)
    })?;

    Ok(ReducedSummary {
        section_summaries,
        failed_sections,
        final_summary,
    })
}
