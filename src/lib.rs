#![deny(missing_docs)]

//! Map-reduce document summarization.
//!
//! A document is split into section-aware chunks, each chunk is summarized in parallel under a
//! bounded worker limit, and the per-chunk summaries are combined into one final summary in
//! source order.

/// Environment-driven configuration management.
pub mod config;
/// Source documents, metadata, and text extraction.
pub mod document;
/// Structured logging and tracing setup.
pub mod logging;
/// Summarization activity counters.
pub mod metrics;
/// Summarization pipeline stages.
pub mod processing;
/// Summarization client abstraction and adapters.
pub mod summarization;
