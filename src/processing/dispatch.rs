//! Map stage: per-chunk summarization under bounded concurrency.
//!
//! Every chunk becomes one task on a [`JoinSet`]; a [`Semaphore`] with `max_workers` permits
//! limits how many tasks call the client at once, and the rest wait in the semaphore's FIFO
//! queue. Tasks carry their chunk index, results land in one slot per index, and the dispatcher
//! returns only after every slot is filled. Failures are captured per chunk and never cancel
//! sibling tasks.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::document::DocumentMetadata;
use crate::summarization::SummarizationClient;

use super::prompt::build_chunk_prompt;
use super::types::{Chunk, ChunkFailure, ChunkResult, SummaryMode};

/// Settings shared by every task of one dispatch.
#[derive(Debug, Clone, Copy)]
pub struct DispatchOptions {
    /// Maximum number of concurrent client calls; `0` is treated as `1`.
    pub max_workers: usize,
    /// Prompt framing.
    pub mode: SummaryMode,
    /// Optional per-call timeout.
    pub call_timeout: Option<Duration>,
}

/// Summarize a single chunk with exactly one client call.
///
/// Client errors and timeouts are captured into the returned result.
pub async fn summarize_chunk(
    client: &dyn SummarizationClient,
    chunk: &Chunk,
    metadata: &DocumentMetadata,
    mode: SummaryMode,
    call_timeout: Option<Duration>,
) -> ChunkResult {
    let prompt = build_chunk_prompt(&chunk.text, metadata, mode);
    let call = client.generate_summary(&prompt);

    let outcome = match call_timeout {
        Some(limit) => match tokio::time::timeout(limit, call).await {
            Ok(result) => result.map_err(ChunkFailure::from),
            Err(_) => Err(ChunkFailure::TimedOut(limit)),
        },
        None => call.await.map_err(ChunkFailure::from),
    };

    if let Err(failure) = &outcome {
        tracing::warn!(chunk = chunk.index, error = %failure, "Chunk summarization failed");
    }

    ChunkResult {
        index: chunk.index,
        outcome,
    }
}

/// Summarize every chunk and return one result per chunk, ordered by index.
///
/// Completion order is unconstrained; the returned vector is rebuilt from per-index slots.
/// A task that dies without reporting (a panic inside the client, for example) leaves its slot
/// to be filled with [`ChunkFailure::Aborted`].
pub async fn dispatch_chunks(
    client: Arc<dyn SummarizationClient>,
    chunks: Vec<Chunk>,
    metadata: Arc<DocumentMetadata>,
    options: DispatchOptions,
) -> Vec<ChunkResult> {
    let total = chunks.len();
    let workers = options.max_workers.max(1);
    let started = Instant::now();
    tracing::debug!(chunks = total, workers, "Dispatching chunk summaries");

    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();
    for chunk in chunks {
        let client = Arc::clone(&client);
        let metadata = Arc::clone(&metadata);
        let permits = Arc::clone(&permits);
        tasks.spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(error) => {
                    return ChunkResult {
                        index: chunk.index,
                        outcome: Err(ChunkFailure::Aborted(error.to_string())),
                    };
                }
            };
            summarize_chunk(
                client.as_ref(),
                &chunk,
                &metadata,
                options.mode,
                options.call_timeout,
            )
            .await
        });
    }

    let mut slots: Vec<Option<ChunkResult>> =
        std::iter::repeat_with(|| None).take(total).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(result) => match slots.get_mut(result.index) {
                Some(slot) => *slot = Some(result),
                None => {
                    tracing::error!(
                        chunk = result.index,
                        total,
                        "Discarding result for unknown chunk index"
                    );
                }
            },
            Err(error) => {
                tracing::error!(error = %error, "Chunk summarization task ended abnormally");
            }
        }
    }

    let results: Vec<ChunkResult> = slots
        .into_iter()
        .enumerate()
        .map(|(index, slot)| {
            slot.unwrap_or_else(|| ChunkResult {
                index,
                outcome: Err(ChunkFailure::Aborted(
                    "task ended without reporting a result".into(),
                )),
            })
        })
        .collect();

    let failed = results.iter().filter(|result| result.outcome.is_err()).count();
    tracing::info!(
        chunks = total,
        failed,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Map stage complete"
    );
    results
}
