#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::config::secrets::Secrets;
use crate::embeddings::chunking::ChunkingConfig;
use crate::embeddings::openai::DEFAULT_EMBEDDING_DIMENSION;

const SUPPORTED_CLOUDS: [&str; 3] = ["aws", "gcp", "azure"];
const SUPPORTED_METRICS: [&str; 3] = ["cosine", "euclidean", "dotproduct"];
const MAX_INDEX_NAME_LEN: usize = 45;
const MAX_TOP_K: usize = 10_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub pinecone: PineconeConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PineconeConfig {
    pub index_name: String,
    pub cloud: String,
    pub region: String,
    pub metric: String,
    pub control_plane_url: String,
    pub api_version: String,
    pub ready_poll_interval_secs: u64,
    pub ready_timeout_secs: u64,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            index_name: "finda".to_string(),
            cloud: "aws".to_string(),
            region: "us-east-1".to_string(),
            metric: "cosine".to_string(),
            control_plane_url: "https://api.pinecone.io".to_string(),
            api_version: "2024-07".to_string(),
            ready_poll_interval_secs: 5,
            ready_timeout_secs: 300,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub dimension: usize,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-ada-002".to_string(),
            dimension: DEFAULT_EMBEDDING_DIMENSION,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { top_k: 2 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found")]
    DirectoryError,
    #[error("Failed to read environment file {path}: {reason}")]
    EnvFile { path: PathBuf, reason: String },
    #[error("Missing required key in environment file: {0}")]
    MissingKey(&'static str),
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error(
        "Invalid index name: '{0}' (must be 1-45 lowercase alphanumeric characters or '-')"
    )]
    InvalidIndexName(String),
    #[error("Invalid cloud: {0} (must be one of aws, gcp, azure)")]
    InvalidCloud(String),
    #[error("Invalid region: '{0}' (cannot be empty)")]
    InvalidRegion(String),
    #[error("Invalid metric: {0} (must be one of cosine, euclidean, dotproduct)")]
    InvalidMetric(String),
    #[error("Invalid API version: '{0}' (cannot be empty)")]
    InvalidApiVersion(String),
    #[error("Invalid ready poll interval: {0}s (must be between 1 and ready timeout)")]
    InvalidPollInterval(u64),
    #[error("Invalid model name: '{0}' (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid embedding dimension: {0} (must be between 1 and 20000)")]
    InvalidEmbeddingDimension(usize),
    #[error("Invalid chunk size: {0} (must be at least 1)")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({0}) must be smaller than chunk size ({1})")]
    InvalidOverlapSize(usize, usize),
    #[error("Invalid top k: {0} (must be between 1 and 10000)")]
    InvalidTopK(usize),
}

impl Config {
    /// Load settings from `settings_path` (defaults when absent) and secrets
    /// from the dotenv file at `env_path`.
    #[inline]
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(env_path: P, settings_path: Q) -> Result<Self> {
        let mut config = Self::load_settings(settings_path)?;
        config.secrets = Secrets::from_env_file(env_path.as_ref())
            .context("Failed to load secrets from environment file")?;
        Ok(config)
    }

    /// Load only the TOML settings; secrets are left empty
    #[inline]
    pub fn load_settings<P: AsRef<Path>>(settings_path: P) -> Result<Self> {
        let settings_path = settings_path.as_ref();

        if !settings_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(settings_path).with_context(|| {
            format!("Failed to read config file: {}", settings_path.display())
        })?;

        let config: Config = toml::from_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", settings_path.display())
        })?;

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// `~/.findaso-index`, the directory holding the default settings file
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        dirs::home_dir()
            .map(|home| home.join(".findaso-index"))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn default_settings_path() -> Result<PathBuf, ConfigError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pinecone.validate()?;
        self.openai.validate()?;
        self.validate_chunking_config()?;
        self.search.validate()?;
        Ok(())
    }

    fn validate_chunking_config(&self) -> Result<(), ConfigError> {
        let config = &self.chunking;

        if config.chunk_size == 0 {
            return Err(ConfigError::InvalidChunkSize(config.chunk_size));
        }

        if config.chunk_overlap >= config.chunk_size {
            return Err(ConfigError::InvalidOverlapSize(
                config.chunk_overlap,
                config.chunk_size,
            ));
        }

        Ok(())
    }
}

impl PineconeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name_ok = !self.index_name.is_empty()
            && self.index_name.len() <= MAX_INDEX_NAME_LEN
            && self
                .index_name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !name_ok {
            return Err(ConfigError::InvalidIndexName(self.index_name.clone()));
        }

        if !SUPPORTED_CLOUDS.contains(&self.cloud.as_str()) {
            return Err(ConfigError::InvalidCloud(self.cloud.clone()));
        }

        if self.region.trim().is_empty() {
            return Err(ConfigError::InvalidRegion(self.region.clone()));
        }

        if !SUPPORTED_METRICS.contains(&self.metric.as_str()) {
            return Err(ConfigError::InvalidMetric(self.metric.clone()));
        }

        if self.api_version.trim().is_empty() {
            return Err(ConfigError::InvalidApiVersion(self.api_version.clone()));
        }

        if self.ready_poll_interval_secs == 0
            || self.ready_poll_interval_secs > self.ready_timeout_secs
        {
            return Err(ConfigError::InvalidPollInterval(
                self.ready_poll_interval_secs,
            ));
        }

        self.control_plane_url()?;
        Ok(())
    }

    pub fn control_plane_url(&self) -> Result<Url, ConfigError> {
        parse_http_url(&self.control_plane_url)
    }
}

impl OpenAiConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if !(1..=20_000).contains(&self.dimension) {
            return Err(ConfigError::InvalidEmbeddingDimension(self.dimension));
        }

        self.base_url()?;
        Ok(())
    }

    pub fn base_url(&self) -> Result<Url, ConfigError> {
        parse_http_url(&self.base_url)
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_top_k(self.top_k)
    }
}

/// Check a result count against the range the vector store accepts
#[inline]
pub fn validate_top_k(top_k: usize) -> Result<(), ConfigError> {
    if !(1..=MAX_TOP_K).contains(&top_k) {
        return Err(ConfigError::InvalidTopK(top_k));
    }
    Ok(())
}

fn parse_http_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw).map_err(|_| ConfigError::InvalidUrl(raw.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(raw.to_string()));
    }
    Ok(url)
}
