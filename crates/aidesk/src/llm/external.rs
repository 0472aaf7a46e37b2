//! OpenAI-compatible chat-completion client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::{ChatProvider, ChatTurn, GenerationConfig};
use crate::config::ApiConfig;
use crate::error::LlmError;

pub struct ChatModel {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatModel {
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .connect_timeout(std::time::Duration::from_secs(api.connect_timeout_secs))
            .timeout(std::time::Duration::from_secs(api.request_timeout_secs))
            .build()?;

        tracing::info!(
            endpoint = %api.chat_endpoint,
            model = %api.chat_model,
            "Creating chat-completion client"
        );

        Ok(Self {
            client,
            endpoint: api.chat_endpoint.clone(),
            api_key: api.api_key.clone(),
            model: api.chat_model.clone(),
        })
    }

    fn format_messages(turns: &[ChatTurn]) -> Vec<serde_json::Value> {
        turns
            .iter()
            .map(|t| json!({ "role": t.role.as_str(), "content": t.content }))
            .collect()
    }
}

/// Parse a response body as JSON, returning a clear error if the server
/// returned HTML (e.g. a gateway error page) instead of valid JSON.
pub(crate) async fn parse_json_body<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
    endpoint: &str,
) -> Result<T, LlmError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| LlmError::from_reqwest(endpoint, e))?;

    // CDNs/proxies sometimes return 200 with an HTML error page
    let trimmed = body.trim_start();
    if trimmed.starts_with('<') {
        let preview: String = trimmed.chars().take(200).collect();
        return Err(LlmError::MalformedBody {
            endpoint: endpoint.to_string(),
            message: format!("HTML instead of JSON (HTTP {}): {}", status, preview),
        });
    }

    serde_json::from_str::<T>(&body).map_err(|e| {
        let preview: String = body.chars().take(300).collect();
        LlmError::MalformedBody {
            endpoint: endpoint.to_string(),
            message: format!("{} (HTTP {}): {}", e, status, preview),
        }
    })
}

#[async_trait]
impl ChatProvider for ChatModel {
    async fn complete(
        &self,
        turns: &[ChatTurn],
        config: &GenerationConfig,
    ) -> Result<String, LlmError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            turns = turns.len(),
            max_tokens = config.max_tokens,
            "Sending chat-completion request"
        );

        let request = json!({
            "model": self.model,
            "messages": Self::format_messages(turns),
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "top_p": config.top_p,
            "stream": false
        });

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(endpoint = %self.endpoint, error = %e, "Request failed");
                LlmError::from_reqwest(&self.endpoint, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(endpoint = %self.endpoint, status = %status, body = %body, "API returned error");
            return Err(LlmError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let result: CompletionResponse = parse_json_body(response, &self.endpoint).await?;

        let Some(choice) = result.choices.into_iter().next() else {
            return Err(LlmError::MalformedBody {
                endpoint: self.endpoint.clone(),
                message: "no choices returned".to_string(),
            });
        };

        tracing::debug!(chars = choice.message.content.len(), "Chat completion received");
        Ok(choice.message.content)
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: String,
}
