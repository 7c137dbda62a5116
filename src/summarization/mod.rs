//! Abstractions over the text-in/text-out model call used by both pipeline stages.
//!
//! The pipeline only sees [`SummarizationClient`]. Two adapters ship with the crate: an
//! Ollama-backed HTTP client and [`BlockingSummarizationClient`], which wraps any synchronous
//! prompt function and runs it on tokio's blocking pool.

use crate::config::{Config, SummarizationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced by a summarization call.
#[derive(Debug, Error)]
pub enum SummarizationClientError {
    /// Provider was explicitly disabled or unreachable.
    #[error("Summarization provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate summary: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
    /// The call did not finish within the configured timeout.
    #[error("Summarization call timed out after {0:?}")]
    Timeout(Duration),
}

/// Interface implemented by summarization providers.
#[async_trait]
pub trait SummarizationClient: Send + Sync {
    /// Produce a response for a fully rendered prompt.
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError>;
}

type PromptFn = dyn Fn(&str) -> Result<String, SummarizationClientError> + Send + Sync;

/// Adapter for synchronous prompt functions.
///
/// Each call is moved onto the blocking pool, so a slow function occupies a blocking thread
/// rather than a runtime worker.
#[derive(Clone)]
pub struct BlockingSummarizationClient {
    inner: Arc<PromptFn>,
}

impl BlockingSummarizationClient {
    /// Wrap a synchronous prompt function.
    pub fn new<F>(function: F) -> Self
    where
        F: Fn(&str) -> Result<String, SummarizationClientError> + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(function),
        }
    }
}

#[async_trait]
impl SummarizationClient for BlockingSummarizationClient {
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError> {
        let function = Arc::clone(&self.inner);
        let prompt = prompt.to_string();
        tokio::task::spawn_blocking(move || function(&prompt))
            .await
            .map_err(|error| {
                SummarizationClientError::GenerationFailed(format!(
                    "prompt function did not complete: {error}"
                ))
            })?
    }
}

/// Build a summarization client based on configuration.
///
/// Returns `Ok(None)` when the provider is disabled.
pub fn build_summarization_client(
    config: &Config,
) -> Result<Option<Arc<dyn SummarizationClient>>, SummarizationClientError> {
    match config.summarization_provider {
        SummarizationProvider::None => Ok(None),
        SummarizationProvider::Ollama => {
            let model = config.summarization_model.clone().ok_or_else(|| {
                SummarizationClientError::ProviderUnavailable(
                    "no summarization model configured".into(),
                )
            })?;
            let base_url = config
                .ollama_url
                .clone()
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let client = OllamaSummarizationClient::new(base_url, model)?;
            Ok(Some(Arc::new(client)))
        }
    }
}

/// HTTP client for the Ollama `/api/generate` endpoint.
pub struct OllamaSummarizationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaSummarizationClient {
    /// Create a client targeting `base_url` with the given model.
    pub fn new(base_url: String, model: String) -> Result<Self, SummarizationClientError> {
        let http = Client::builder()
            .user_agent("docsum/summary")
            .build()
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to construct HTTP client: {error}"
                ))
            })?;
        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl SummarizationClient for OllamaSummarizationClient {
    async fn generate_summary(&self, prompt: &str) -> Result<String, SummarizationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": {
                "temperature": 0.1,
            }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                SummarizationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(SummarizationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SummarizationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            SummarizationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(SummarizationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    fn client_for(server: &MockServer) -> OllamaSummarizationClient {
        OllamaSummarizationClient::new(server.base_url(), "llama".into()).expect("client")
    }

    #[tokio::test]
    async fn ollama_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/generate")
                    .json_body_partial(r#"{"model": "llama", "prompt": "Summarize", "stream": false}"#);
                then.status(200).json_body(json!({
                    "response": "  Summary text\n",
                    "done": true
                }));
            })
            .await;

        let summary = client.generate_summary("Summarize").await.expect("summary");

        mock.assert_async().await;
        assert_eq!(summary, "Summary text");
    }

    #[tokio::test]
    async fn ollama_client_handles_error_status() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(500).body("boom");
            })
            .await;

        let error = client
            .generate_summary("Summarize")
            .await
            .expect_err("error response");

        assert!(
            matches!(error, SummarizationClientError::GenerationFailed(ref message) if message.contains("500"))
        );
    }

    #[tokio::test]
    async fn ollama_client_rejects_incomplete_response() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200)
                    .json_body(json!({ "response": "partial", "done": false }));
            })
            .await;

        let error = client.generate_summary("Summarize").await.unwrap_err();
        assert!(matches!(error, SummarizationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn ollama_client_maps_missing_endpoint_to_unavailable() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);

        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404);
            })
            .await;

        let error = client.generate_summary("Summarize").await.unwrap_err();
        assert!(matches!(error, SummarizationClientError::ProviderUnavailable(_)));
    }

    #[tokio::test]
    async fn blocking_client_runs_prompt_function() {
        let client = BlockingSummarizationClient::new(|prompt: &str| Ok(prompt.to_uppercase()));
        let summary = client.generate_summary("abc").await.expect("summary");
        assert_eq!(summary, "ABC");
    }

    #[test]
    fn disabled_provider_builds_no_client() {
        let config = Config::from_lookup(|key| {
            (key == "SUMMARIZATION_PROVIDER").then(|| "none".to_string())
        })
        .expect("config");
        assert!(build_summarization_client(&config).expect("build").is_none());
    }
}
