use crate::processing::{PipelineOptions, SummaryMode};
use serde::Deserialize;
use std::env;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CHUNK_SIZE: usize = 2000;
const DEFAULT_MAX_WORKERS: usize = 4;
const DEFAULT_MAX_SECTIONS: usize = 30;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the summarization pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Target chunk size, in characters.
    pub chunk_size: usize,
    /// Maximum number of chunk summaries in flight at once.
    pub max_workers: usize,
    /// Boundary counts at or above this value fall back to paragraph packing.
    pub max_sections: usize,
    /// Prompt framing used for both map and reduce calls.
    pub mode: SummaryMode,
    /// Optional timeout applied to every summarization call.
    pub call_timeout_secs: Option<u64>,
    /// Backend used to generate summaries.
    pub summarization_provider: SummarizationProvider,
    /// Model identifier passed to the provider.
    pub summarization_model: Option<String>,
    /// Base URL of the Ollama runtime.
    pub ollama_url: Option<String>,
}

/// Supported summarization backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarizationProvider {
    /// No provider; callers must inject their own client.
    None,
    /// Local Ollama runtime.
    Ollama,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as absent so an exported-but-empty variable falls back to the
    /// default instead of failing validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let chunk_size = parse_optional(&get, "SUMMARY_CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE);
        if chunk_size == 0 {
            return Err(ConfigError::InvalidValue("SUMMARY_CHUNK_SIZE".into()));
        }
        let max_workers =
            parse_optional(&get, "SUMMARY_MAX_WORKERS")?.unwrap_or(DEFAULT_MAX_WORKERS);
        if max_workers == 0 {
            return Err(ConfigError::InvalidValue("SUMMARY_MAX_WORKERS".into()));
        }
        let max_sections =
            parse_optional(&get, "SUMMARY_MAX_SECTIONS")?.unwrap_or(DEFAULT_MAX_SECTIONS);

        let mode = match get("SUMMARY_MODE") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("SUMMARY_MODE".into()))?,
            None => SummaryMode::Financial,
        };

        let summarization_provider = match get("SUMMARIZATION_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("SUMMARIZATION_PROVIDER".into()))?,
            None => SummarizationProvider::Ollama,
        };

        let summarization_model = get("SUMMARIZATION_MODEL");
        if summarization_provider == SummarizationProvider::Ollama && summarization_model.is_none()
        {
            return Err(ConfigError::MissingVariable("SUMMARIZATION_MODEL".into()));
        }

        Ok(Self {
            chunk_size,
            max_workers,
            max_sections,
            mode,
            call_timeout_secs: parse_optional(&get, "SUMMARY_CALL_TIMEOUT_SECS")?,
            summarization_provider,
            summarization_model,
            ollama_url: get("OLLAMA_URL"),
        })
    }

    /// Derive the options consumed by [`crate::processing::SummarizationPipeline`].
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            chunk_size: self.chunk_size,
            max_workers: self.max_workers,
            max_sections: self.max_sections,
            mode: self.mode,
            call_timeout: self.call_timeout_secs.map(Duration::from_secs),
        }
    }
}

fn parse_optional<G, T>(get: &G, key: &str) -> Result<Option<T>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    get(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummarizationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Load configuration from the environment, honoring a local `.env` file when present.
pub fn load_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    tracing::debug!(
        chunk_size = config.chunk_size,
        max_workers = config.max_workers,
        max_sections = config.max_sections,
        mode = ?config.mode,
        provider = ?config.summarization_provider,
        "Loaded configuration"
    );
    Ok(config)
}
