use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};

/// Turns food descriptions into embedding vectors
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Embedder: Send + Sync {
    /// Returns one vector per input text, in input order
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Embeddings from the OpenAI embeddings API
#[derive(Clone)]
pub struct OpenAiEmbedder {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn into_vectors(response: EmbeddingResponse, expected: usize) -> AppResult<Vec<Vec<f32>>> {
        if response.data.len() != expected {
            return Err(AppError::ExternalApi(format!(
                "Expected {} embeddings, got {}",
                expected,
                response.data.len()
            )));
        }

        // Results are not guaranteed to come back in input order
        let mut data = response.data;
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait::async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        // Build the embeddings request
        let url = format!("{}/embeddings", self.api_url);
        let body = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        // Check for error status
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Embedding request failed");
            return Err(AppError::ExternalApi(format!(
                "OpenAI returned status {}: {}",
                status, body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let vectors = Self::into_vectors(parsed, texts.len())?;

        tracing::debug!(count = vectors.len(), model = %self.model, "Embeddings received");
        Ok(vectors)
    }
}
