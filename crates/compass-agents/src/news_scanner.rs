use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use compass_core::config::ModelConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{Article, CompletionRequest, RelevantArticle};
use compass_llm::parse::extract_json;

use crate::prompts;

/// Filters incoming news down to articles relevant to the tracked keywords.
pub struct NewsScanner {
    client: Arc<dyn CompletionClient>,
    model: ModelConfig,
}

#[derive(Deserialize)]
struct ScanEnvelope {
    #[serde(default)]
    relevant_articles: Vec<RelevantArticle>,
}

impl NewsScanner {
    pub fn new(client: Arc<dyn CompletionClient>, model: ModelConfig) -> Self {
        Self { client, model }
    }

    pub async fn analyze_relevance(
        &self,
        rss_articles: &[Article],
        tracked_keywords: &[String],
    ) -> Result<Vec<RelevantArticle>> {
        let prompt = prompts::render(
            prompts::NEWS_SCANNER,
            &[
                (
                    "rss_articles",
                    serde_json::to_string_pretty(rss_articles)?,
                ),
                ("tracked_keywords", tracked_keywords.join(", ")),
                ("brand_voice", prompts::BRAND_VOICE.to_string()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.3, 1500))
            .await?;
        let envelope: ScanEnvelope = extract_json(&raw)?;
        debug!(
            scanned = rss_articles.len(),
            relevant = envelope.relevant_articles.len(),
            "news relevance scan complete"
        );
        Ok(envelope.relevant_articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_test_utils::{article, MockCompletionClient};

    fn model() -> ModelConfig {
        ModelConfig {
            provider: "azure".into(),
            model_id: "gpt-4o-mini".into(),
            api_key: None,
            base_url: None,
            azure_resource: None,
            azure_deployment: None,
            azure_api_version: None,
            max_tokens: 1500,
            temperature: 0.3,
        }
    }

    #[tokio::test]
    async fn test_parses_relevant_articles() {
        let client = Arc::new(MockCompletionClient::new([r#"```json
{"relevant_articles":[{"headline":"ECB cuts rates","url":"https://x","relevance_score":91,"relevance_reason":"rate news","matched_keywords":["mortgage rates"]}]}
```"#]));
        let scanner = NewsScanner::new(client.clone(), model());

        let relevant = scanner
            .analyze_relevance(
                &[article("ECB cuts rates", 0)],
                &["mortgage rates".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(relevant.len(), 1);
        assert_eq!(relevant[0].headline, "ECB cuts rates");
        let prompts = client.received_prompts();
        assert!(prompts[0].contains("mortgage rates"));
        assert!(prompts[0].contains("ECB cuts rates"));
    }

    #[tokio::test]
    async fn test_malformed_response_is_parse_error() {
        let client = Arc::new(MockCompletionClient::new(["not json"]));
        let scanner = NewsScanner::new(client, model());

        let err = scanner
            .analyze_relevance(&[article("x", 0)], &[])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            compass_core::CompassError::ResponseParse { .. }
        ));
    }
}
