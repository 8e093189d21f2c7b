use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::cosine_similarity;
use crate::error::{AnalysisError, Result};
use crate::traits::TopicScorer;

#[derive(Debug, Clone, Serialize)]
pub struct OllamaEmbeddingRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct OllamaEmbeddingResponse {
    pub embedding: Vec<f64>,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModel {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct OllamaModelsResponse {
    pub models: Vec<OllamaModel>,
}

/// Topic relevance through Ollama sentence embeddings
pub struct OllamaEmbeddingClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of Ollama API (e.g., "http://localhost:11434")
    /// * `model` - Embedding model name (e.g., "all-minilm")
    pub fn new(base_url: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        })
    }

    /// Embed a single text
    pub async fn embed(&self, text: &str) -> Result<Vec<f64>> {
        let request = OllamaEmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::EmbeddingError(format!("Ollama request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AnalysisError::EmbeddingError(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let body: OllamaEmbeddingResponse = response.json().await.map_err(|e| {
            AnalysisError::EmbeddingError(format!("Failed to parse Ollama response: {}", e))
        })?;

        if body.embedding.is_empty() {
            return Err(AnalysisError::EmbeddingError(format!(
                "model {} returned an empty embedding",
                self.model
            )));
        }

        Ok(body.embedding)
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<OllamaModel>> {
        let response = self
            .client
            .get(format!("{}/api/tags", self.base_url))
            .send()
            .await
            .map_err(|e| AnalysisError::EmbeddingError(format!("Failed to list models: {}", e)))?;

        let models_response: OllamaModelsResponse = response.json().await.map_err(|e| {
            AnalysisError::EmbeddingError(format!("Failed to parse models response: {}", e))
        })?;

        Ok(models_response.models)
    }

    /// Verify the configured model is available
    pub async fn verify_model(&self) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.starts_with(&self.model)))
    }
}

#[async_trait::async_trait]
impl TopicScorer for OllamaEmbeddingClient {
    async fn similarity(&self, topic: &str, text: &str) -> Result<f64> {
        let topic_vec = self.embed(topic).await?;
        let essay_vec = self.embed(text).await?;

        let score = cosine_similarity(&topic_vec, &essay_vec)?;
        tracing::debug!("Topic similarity {:.4} using model {}", score, self.model);

        Ok(score)
    }
}
