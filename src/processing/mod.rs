//! Document summarization pipeline: segmentation, chunking, parallel map, and ordered reduce.

pub mod chunking;
pub mod dispatch;
mod prompt;
pub mod reduce;
pub mod segment;
mod service;
pub mod types;

pub use service::{PipelineOptions, SummarizationPipeline};
pub use types::{
    Chunk, ChunkFailure, ChunkResult, ChunkingError, SummarizeError, SummaryMode, SummaryReport,
};
