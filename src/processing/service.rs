//! Pipeline service coordinating segmentation, chunking, the map stage, and the reduce stage.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::{
    document::{Document, TextExtractor},
    metrics::{MetricsSnapshot, SummaryMetrics},
    processing::{
        chunking::{ChunkingOptions, create_chunks},
        dispatch::{DispatchOptions, dispatch_chunks},
        reduce::{ReducedSummary, reduce_summaries},
        segment::detect_section_boundaries,
        types::{SummarizeError, SummaryMode, SummaryReport},
    },
    summarization::SummarizationClient,
};

/// Tunables for one pipeline instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Maximum number of concurrent chunk summaries.
    pub max_workers: usize,
    /// Exclusive upper bound on boundary counts accepted by the boundary path.
    pub max_sections: usize,
    /// Prompt framing for both stages.
    pub mode: SummaryMode,
    /// Optional timeout wrapped around every client call.
    pub call_timeout: Option<Duration>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            max_workers: 4,
            max_sections: 30,
            mode: SummaryMode::Financial,
            call_timeout: None,
        }
    }
}

/// Map-reduce summarizer for whole documents.
///
/// The pipeline holds the injected client and its options; it keeps no per-document state, so
/// one instance can serve any number of requests, concurrently or not. Only the map stage runs
/// in parallel; segmentation, chunking, and the reduce call are sequential.
pub struct SummarizationPipeline {
    client: Arc<dyn SummarizationClient>,
    options: PipelineOptions,
    metrics: Arc<SummaryMetrics>,
}

impl SummarizationPipeline {
    /// Build a pipeline around an injected summarization client.
    pub fn new(client: Arc<dyn SummarizationClient>, options: PipelineOptions) -> Self {
        Self {
            client,
            options,
            metrics: Arc::new(SummaryMetrics::new()),
        }
    }

    /// Options this pipeline was built with.
    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Extract a document through `extractor` and summarize it.
    ///
    /// Extraction failures are fatal and returned before any summarization call is made.
    pub async fn summarize_path(
        &self,
        extractor: &dyn TextExtractor,
        path: &Path,
    ) -> Result<SummaryReport, SummarizeError> {
        tracing::info!(path = %path.display(), "Extracting document");
        let document = extractor.extract(path)?;
        self.summarize_document(&document).await
    }

    /// Summarize an already-extracted document.
    ///
    /// The returned report always lists one section summary per chunk, in source order,
    /// including placeholders for chunks whose summarization failed.
    pub async fn summarize_document(
        &self,
        document: &Document,
    ) -> Result<SummaryReport, SummarizeError> {
        let options = &self.options;
        let text = document.text();
        tracing::info!(
            chars = text.chars().count(),
            chunk_size = options.chunk_size,
            mode = ?options.mode,
            "Summarizing document"
        );

        let boundaries = detect_section_boundaries(text);
        let chunks = create_chunks(
            text,
            &boundaries,
            &ChunkingOptions {
                target_size: options.chunk_size,
                max_sections: options.max_sections,
            },
        )?;
        let chunk_count = chunks.len();

        let metadata = Arc::new(document.metadata().clone());
        let results = dispatch_chunks(
            Arc::clone(&self.client),
            chunks,
            Arc::clone(&metadata),
            DispatchOptions {
                max_workers: options.max_workers,
                mode: options.mode,
                call_timeout: options.call_timeout,
            },
        )
        .await;
        debug_assert_eq!(results.len(), chunk_count);

        let reduced = reduce_summaries(
            self.client.as_ref(),
            results,
            &metadata,
            options.mode,
            options.call_timeout,
        )
        .await;
        let ReducedSummary {
            section_summaries,
            failed_sections,
            final_summary,
        } = match reduced {
            Ok(reduced) => reduced,
            Err(error) => {
                self.metrics.record_reduce_failure();
                return Err(error);
            }
        };

        self.metrics
            .record_document(chunk_count as u64, failed_sections.len() as u64);
        tracing::info!(
            chunks = chunk_count,
            failed = failed_sections.len(),
            "Document summarized"
        );

        Ok(SummaryReport {
            metadata: Arc::unwrap_or_clone(metadata),
            chunk_count,
            section_summaries,
            failed_sections,
            final_summary,
        })
    }

    /// Return the current summarization metrics snapshot.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
