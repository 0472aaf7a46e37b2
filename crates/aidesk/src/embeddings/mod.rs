//! Remote embeddings API client (OpenAI-compatible request shape).

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::ApiConfig;
use crate::error::LlmError;
use crate::llm::external::parse_json_body;

/// Seam between the retrieval pipeline and the hosted embeddings API.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError>;
}

pub struct RemoteEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl RemoteEmbedder {
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(api.connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(api.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: api.embedding_endpoint.clone(),
            api_key: api.embedding_api_key.clone(),
            model: api.embedding_model.clone(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for RemoteEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, LlmError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(endpoint = %self.endpoint, batch = texts.len(), "Requesting embeddings");

        let request = json!({
            "model": self.model,
            "input": texts,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::from_reqwest(&self.endpoint, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(endpoint = %self.endpoint, status = %status, "Embeddings API returned error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: EmbeddingResponse = parse_json_body(response, &self.endpoint).await?;

        let mut data = result.data;
        if data.len() != texts.len() {
            return Err(LlmError::MalformedBody {
                endpoint: self.endpoint.clone(),
                message: format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    data.len()
                ),
            });
        }
        data.sort_by_key(|d| d.index);
        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedding_response_deserializes_and_keeps_index() {
        let body = r#"{
            "object": "list",
            "data": [
                {"object": "embedding", "index": 1, "embedding": [0.3, 0.4]},
                {"object": "embedding", "index": 0, "embedding": [0.1, 0.2]}
            ],
            "model": "text-embedding",
            "usage": {"prompt_tokens": 4, "total_tokens": 4}
        }"#;
        let mut parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        parsed.data.sort_by_key(|d| d.index);
        assert_eq!(parsed.data[0].embedding, vec![0.1, 0.2]);
        assert_eq!(parsed.data[1].embedding, vec![0.3, 0.4]);
    }
}
