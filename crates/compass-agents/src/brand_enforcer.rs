use std::sync::Arc;

use compass_core::config::ModelConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{BrandCompliance, CompletionRequest};
use compass_llm::parse::extract_json;

use crate::prompts;

/// Validates drafts against the house brand guidelines.
pub struct BrandEnforcer {
    client: Arc<dyn CompletionClient>,
    model: ModelConfig,
}

impl BrandEnforcer {
    pub fn new(client: Arc<dyn CompletionClient>, model: ModelConfig) -> Self {
        Self { client, model }
    }

    pub async fn validate_compliance(&self, content: &str) -> Result<BrandCompliance> {
        let prompt = prompts::render(
            prompts::BRAND_ENFORCER,
            &[
                ("content", content.to_string()),
                ("brand_voice", prompts::BRAND_VOICE.to_string()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.1, 800))
            .await?;
        extract_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_test_utils::MockCompletionClient;

    fn model() -> ModelConfig {
        ModelConfig {
            provider: "azure".into(),
            model_id: "gpt-4o-mini".into(),
            api_key: None,
            base_url: None,
            azure_resource: None,
            azure_deployment: None,
            azure_api_version: None,
            max_tokens: 800,
            temperature: 0.1,
        }
    }

    #[tokio::test]
    async fn test_compliant_verdict() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"compliant":true,"issues":[],"revised_content":null}"#,
        ]));
        let enforcer = BrandEnforcer::new(client, model());

        let verdict = enforcer.validate_compliance("Clear and direct.").await.unwrap();
        assert!(verdict.compliant);
        assert!(verdict.revised_content.is_none());
    }

    #[tokio::test]
    async fn test_non_compliant_returns_revision() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"compliant":false,"issues":["overpromises returns"],"revised_content":"Toned-down copy."}"#,
        ]));
        let enforcer = BrandEnforcer::new(client, model());

        let verdict = enforcer
            .validate_compliance("Guaranteed 12% returns!")
            .await
            .unwrap();
        assert!(!verdict.compliant);
        assert_eq!(verdict.revised_content.as_deref(), Some("Toned-down copy."));
    }
}
