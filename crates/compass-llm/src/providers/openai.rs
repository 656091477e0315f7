use futures::future::BoxFuture;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use compass_core::config::ModelConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::CompletionClient;
use compass_core::types::CompletionRequest;

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible client. Works with OpenAI and any server exposing the
/// same chat-completions endpoint via `base_url`.
pub struct OpenAiClient {
    http: Client,
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
pub(crate) struct ChatRequest {
    pub model: String,
    pub messages: Vec<OaiMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Serialize)]
pub(crate) struct OaiMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// Build the wire body shared by OpenAI and Azure.
pub(crate) fn build_body(config: &ModelConfig, request: &CompletionRequest) -> ChatRequest {
    ChatRequest {
        model: config.model_id.clone(),
        messages: vec![OaiMessage {
            role: "user".to_string(),
            content: request.prompt.clone(),
        }],
        max_tokens: request.max_tokens,
        temperature: request.temperature,
    }
}

/// Pull the completion text out of a response envelope.
pub(crate) fn extract_text(raw: &str) -> Result<String> {
    let envelope: ChatResponse = serde_json::from_str(raw)
        .map_err(|e| CompassError::response_parse(format!("bad envelope: {e}"), raw))?;
    envelope
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| CompassError::response_parse("no completion choices", raw))
}

impl CompletionClient for OpenAiClient {
    fn complete(
        &self,
        config: &ModelConfig,
        request: CompletionRequest,
    ) -> BoxFuture<'_, Result<String>> {
        let config = config.clone();

        Box::pin(async move {
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| CompassError::Config("OpenAI: api_key is required".into()))?;
            let url = config.base_url.as_deref().unwrap_or(OPENAI_API_URL);

            let body = build_body(&config, &request);

            let response = self
                .http
                .post(url)
                .bearer_auth(api_key)
                .json(&body)
                .send()
                .await
                .map_err(|e| CompassError::external("openai", e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(CompassError::external(
                    "openai",
                    format!("HTTP {status}: {body}"),
                ));
            }

            let raw = response
                .text()
                .await
                .map_err(|e| CompassError::external("openai", e.to_string()))?;
            extract_text(&raw)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_text_from_envelope() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        assert_eq!(extract_text(raw).unwrap(), "hello");
    }

    #[test]
    fn test_extract_text_empty_choices() {
        let err = extract_text(r#"{"choices":[]}"#).unwrap_err();
        assert!(matches!(err, CompassError::ResponseParse { .. }));
    }

    #[test]
    fn test_extract_text_bad_envelope() {
        let err = extract_text("not json at all").unwrap_err();
        assert!(matches!(err, CompassError::ResponseParse { .. }));
    }

    #[test]
    fn test_build_body_single_user_message() {
        let config = ModelConfig {
            provider: "openai".to_string(),
            model_id: "gpt-4o-mini".to_string(),
            api_key: Some("sk-test".to_string()),
            base_url: None,
            azure_resource: None,
            azure_deployment: None,
            azure_api_version: None,
            max_tokens: 1500,
            temperature: 0.3,
        };
        let request = CompletionRequest::new("analyze this", 0.3, 1500);
        let body = build_body(&config, &request);
        assert_eq!(body.model, "gpt-4o-mini");
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.max_tokens, 1500);
    }
}
