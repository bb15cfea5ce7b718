use crate::error::PestGuardError;
use crate::llm::traits::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Client for any OpenAI-compatible `/chat/completions` endpoint
/// (DashScope compatible mode, Volcengine Ark, OpenAI).
pub struct OpenAICompatClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAICompatClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    /// Apply a transport-level timeout to every request.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, PestGuardError> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

/// Pull the provider's human-readable message out of an error body.
/// Falls back to the raw body when it is not the usual JSON shape.
fn provider_message(body: &str) -> String {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => value
            .get("error")
            .and_then(|e| e.get("message"))
            .or_else(|| value.get("message"))
            .and_then(|m| m.as_str())
            .map(|m| m.to_string())
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAICompatClient {
    async fn complete(
        &self,
        request: &CompletionRequest<'_>,
    ) -> Result<CompletionReply, PestGuardError> {
        let body = ChatRequest {
            model: request.model,
            messages: request.messages,
            temperature: request.temperature,
        };

        tracing::debug!(
            model = request.model,
            messages = request.messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        if !status.is_success() {
            return Ok(CompletionReply::Rejected {
                status: status.as_u16(),
                message: provider_message(&response_text),
            });
        }

        let api_response: ChatResponse = serde_json::from_str(&response_text)
            .map_err(|e| PestGuardError::Llm(format!("Failed to parse response: {e}")))?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PestGuardError::Llm("No response from API".into()))?;

        Ok(CompletionReply::Ok(choice.message.content.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_message_openai_shape() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#;
        assert_eq!(provider_message(body), "Incorrect API key provided");
    }

    #[test]
    fn test_provider_message_flat_shape() {
        let body = r#"{"code":"Throttling","message":"Requests rate limit exceeded"}"#;
        assert_eq!(provider_message(body), "Requests rate limit exceeded");
    }

    #[test]
    fn test_provider_message_raw_body() {
        assert_eq!(provider_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = OpenAICompatClient::new("key", "https://example.com/v1/");
        assert_eq!(client.endpoint(), "https://example.com/v1/chat/completions");
    }

    #[test]
    fn test_request_serializes_lowercase_roles() {
        let messages = vec![Message::system("persona"), Message::user("hi")];
        let body = ChatRequest {
            model: "qwen-turbo",
            messages: &messages,
            temperature: 0.8,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "qwen-turbo");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hi");
    }
}
