use std::sync::Arc;

use serde::Deserialize;

use compass_core::config::ModelConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{CompletionRequest, RelevantArticle, SearchIntent};
use compass_llm::parse::extract_json;

use crate::prompts;

/// Derives the search intents readers will have after seeing relevant news.
pub struct IntentExtractor {
    client: Arc<dyn CompletionClient>,
    model: ModelConfig,
    market_context: String,
}

#[derive(Deserialize)]
struct IntentEnvelope {
    #[serde(default)]
    extracted_intents: Vec<SearchIntent>,
}

impl IntentExtractor {
    pub fn new(client: Arc<dyn CompletionClient>, model: ModelConfig) -> Self {
        Self {
            client,
            model,
            market_context: "retail banking market".to_string(),
        }
    }

    pub fn with_market_context(mut self, context: impl Into<String>) -> Self {
        self.market_context = context.into();
        self
    }

    pub async fn extract_from_news(
        &self,
        relevant_news: &[RelevantArticle],
    ) -> Result<Vec<SearchIntent>> {
        let prompt = prompts::render(
            prompts::INTENT_EXTRACTOR,
            &[
                ("news_articles", serde_json::to_string_pretty(relevant_news)?),
                ("market_context", self.market_context.clone()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.4, 1200))
            .await?;
        let envelope: IntentEnvelope = extract_json(&raw)?;
        Ok(envelope.extracted_intents)
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
            max_tokens: 1200,
            temperature: 0.4,
        }
    }

    #[tokio::test]
    async fn test_extracts_intents() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"extracted_intents":[{"query":"will mortgage rates drop","intent_type":"informational","audience":"homeowners","source_headline":"ECB cuts rates"}]}"#,
        ]));
        let extractor = IntentExtractor::new(client, model());

        let intents = extractor.extract_from_news(&[]).await.unwrap();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents[0].query, "will mortgage rates drop");
    }

    #[tokio::test]
    async fn test_market_context_reaches_prompt() {
        let client = Arc::new(MockCompletionClient::new([r#"{"extracted_intents":[]}"#]));
        let extractor = IntentExtractor::new(client.clone(), model())
            .with_market_context("Dutch banking market");

        extractor.extract_from_news(&[]).await.unwrap();
        assert!(client.received_prompts()[0].contains("Dutch banking market"));
    }
}
