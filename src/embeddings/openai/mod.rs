
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::FindasoError;
use crate::config::Config;
use crate::embeddings::Embedder;
use crate::http::{build_agent, read_reply};

/// Output size of text-embedding-ada-002
pub const DEFAULT_EMBEDDING_DIMENSION: usize = 1536;

/// Blocking client for the OpenAI embeddings endpoint.
///
/// Each call is a single request: no batching, caching or retries.
#[derive(Clone)]
pub struct OpenAiClient {
    endpoint: Url,
    api_key: String,
    model: String,
    dimension: usize,
    agent: ureq::Agent,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

impl OpenAiClient {
    #[inline]
    pub fn new(config: &Config) -> Result<Self> {
        let base_url = config
            .openai
            .base_url()
            .context("Failed to read OpenAI base URL from config")?;
        let endpoint = Url::parse(&format!(
            "{}/embeddings",
            base_url.as_str().trim_end_matches('/')
        ))
        .context("Failed to build embeddings URL")?;

        let api_key = config.secrets.openai_api_key.trim().to_string();
        anyhow::ensure!(!api_key.is_empty(), "missing OpenAI API key");

        Ok(Self {
            endpoint,
            api_key,
            model: config.openai.model.clone(),
            dimension: config.openai.dimension,
            agent: build_agent(None),
        })
    }

    #[inline]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.agent = build_agent(Some(timeout));
        self
    }

    #[inline]
    pub fn model(&self) -> &str {
        &self.model
    }

    fn validate_dimension(&self, embedding: &[f32]) -> Result<(), FindasoError> {
        if embedding.len() != self.dimension {
            return Err(FindasoError::Embedding(format!(
                "Embedding dimension mismatch for model '{}': expected {}, got {}",
                self.model,
                self.dimension,
                embedding.len()
            )));
        }
        Ok(())
    }
}

impl Embedder for OpenAiClient {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!("Requesting embedding for text (length: {})", text.len());

        let request = EmbedRequest {
            model: &self.model,
            input: text,
        };
        let request_json =
            serde_json::to_string(&request).context("Failed to serialize embedding request")?;

        let reply = read_reply(
            self.agent
                .post(self.endpoint.as_str())
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .send(&request_json),
            "embedding request",
        )?;

        if !reply.is_success() {
            return Err(FindasoError::Embedding(format!(
                "OpenAI returned HTTP {}: {}",
                reply.status,
                reply.error_message()
            ))
            .into());
        }

        let response: EmbedResponse =
            serde_json::from_str(&reply.body).context("Failed to parse embedding response")?;

        let embedding = response
            .data
            .into_iter()
            .min_by_key(|entry| entry.index)
            .map(|entry| entry.embedding)
            .ok_or_else(|| FindasoError::Embedding("OpenAI returned no embeddings".to_string()))?;

        self.validate_dimension(&embedding)?;

        debug!("Generated embedding with {} dimensions", embedding.len());
        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
