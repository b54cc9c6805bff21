//! Azure OpenAI embeddings client

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use crate::config::OpenAiConfig;
use crate::errors::Result;
use crate::errors::SearchRagError;

/// Client for turning query text into a dense vector
pub struct EmbeddingClient {
    model: String,
    dimension: usize,
    endpoint: String,
    api_key: String,
    api_version: String,
    client: Client,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl EmbeddingClient {
    /// Create a new embedding client
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SearchRagError::HttpError(e.to_string()))?;

        Ok(Self {
            model: config.embedding_model.clone(),
            dimension: config.embedding_dimension,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            api_version: config.api_version.clone(),
            client,
        })
    }

    /// Deployment URL; the model name doubles as the deployment name
    #[must_use]
    pub fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings",
            self.endpoint, self.model
        )
    }

    /// Generate embedding for a single text
    ///
    /// # Errors
    /// - API request failures (network errors, timeouts, authentication failures)
    /// - Invalid API responses (malformed JSON, empty `data`)
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.url();
        debug!("Calling Azure OpenAI embeddings API: {}", url);

        let request = EmbeddingRequest {
            input: text,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SearchRagError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SearchRagError::EmbeddingError(format!(
                "Azure OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| SearchRagError::EmbeddingError(format!("Failed to parse response: {e}")))?;

        let embedding = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| SearchRagError::EmbeddingError("No embedding in response".to_string()))?;

        if embedding.len() != self.dimension {
            warn!(
                "Embedding dimension {} differs from configured {}",
                embedding.len(),
                self.dimension
            );
        }

        Ok(embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_uses_model_as_deployment() {
        let config = OpenAiConfig {
            endpoint: "https://example.openai.azure.com/".to_string(),
            ..OpenAiConfig::default()
        };
        let client = EmbeddingClient::new(&config).unwrap();
        assert_eq!(
            client.url(),
            "https://example.openai.azure.com/openai/deployments/text-embedding-3-large/embeddings"
        );
    }

    #[test]
    fn test_request_shape() {
        let body = serde_json::to_value(EmbeddingRequest {
            input: "有給休暇の申請方法",
            model: "text-embedding-3-large",
        })
        .unwrap();
        assert_eq!(body["input"], "有給休暇の申請方法");
        assert_eq!(body["model"], "text-embedding-3-large");
    }

    #[tokio::test]
    #[ignore = "Requires Azure OpenAI credentials"]
    async fn test_azure_embedding() {
        let mut config = crate::AppConfig::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        let client = EmbeddingClient::new(&config.openai).unwrap();

        let embedding = client.generate("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 3072);
    }
}
