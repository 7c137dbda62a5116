use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters describing summarization activity.
#[derive(Default)]
pub struct SummaryMetrics {
    documents_summarized: AtomicU64,
    chunks_summarized: AtomicU64,
    chunk_failures: AtomicU64,
    reduce_failures: AtomicU64,
}

impl SummaryMetrics {
    /// Create an empty metrics accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed document along with its chunk and chunk-failure counts.
    pub fn record_document(&self, chunk_count: u64, failed_chunks: u64) {
        self.documents_summarized.fetch_add(1, Ordering::Relaxed);
        self.chunks_summarized
            .fetch_add(chunk_count, Ordering::Relaxed);
        self.chunk_failures
            .fetch_add(failed_chunks, Ordering::Relaxed);
    }

    /// Record a failed reduce call.
    pub fn record_reduce_failure(&self) {
        self.reduce_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Return a snapshot of the current counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            documents_summarized: self.documents_summarized.load(Ordering::Relaxed),
            chunks_summarized: self.chunks_summarized.load(Ordering::Relaxed),
            chunk_failures: self.chunk_failures.load(Ordering::Relaxed),
            reduce_failures: self.reduce_failures.load(Ordering::Relaxed),
        }
    }
}

/// Immutable view of summarization counters used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    /// Documents that produced a final summary.
    pub documents_summarized: u64,
    /// Total chunks dispatched across all summarized documents.
    pub chunks_summarized: u64,
    /// Chunks whose summary was replaced by an error placeholder.
    pub chunk_failures: u64,
    /// Reduce calls that failed and aborted their request.
    pub reduce_failures: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_documents_and_chunks() {
        let metrics = SummaryMetrics::new();
        metrics.record_document(2, 0);
        metrics.record_document(3, 1);
        metrics.record_reduce_failure();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.documents_summarized, 2);
        assert_eq!(snapshot.chunks_summarized, 5);
        assert_eq!(snapshot.chunk_failures, 1);
        assert_eq!(snapshot.reduce_failures, 1);
    }

    #[test]
    fn snapshot_starts_empty() {
        let metrics = SummaryMetrics::new();
        assert_eq!(metrics.snapshot().documents_summarized, 0);
        assert_eq!(metrics.snapshot().chunks_summarized, 0);
    }
}
