use std::sync::Arc;

use serde::Deserialize;

use compass_core::config::ModelConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{
    CompetitorSnippet, CompletionRequest, ContentAnalysis, ContentBrief, FinalArticle,
    OptimizedContent, SeoOptimization,
};
use compass_llm::parse::extract_json;

use crate::prompts;

/// Produces and reworks content: the two GEO optimization branches plus the
/// brief/draft/SEO/review steps of the generation pipeline. Runs on the
/// larger generation model.
pub struct ContentOptimizer {
    client: Arc<dyn CompletionClient>,
    model: ModelConfig,
}

#[derive(Deserialize)]
struct Draft {
    #[serde(default)]
    title: String,
    #[serde(default)]
    body: String,
}

impl ContentOptimizer {
    pub fn new(client: Arc<dyn CompletionClient>, model: ModelConfig) -> Self {
        Self { client, model }
    }

    /// Minimal changes to close identified gaps.
    pub async fn targeted_optimize(
        &self,
        content_analysis: &ContentAnalysis,
        competitor_snippets: &[CompetitorSnippet],
    ) -> Result<OptimizedContent> {
        let prompt = prompts::render(
            prompts::TARGETED_OPTIMIZER,
            &[
                (
                    "content_analysis",
                    serde_json::to_string_pretty(content_analysis)?,
                ),
                (
                    "competitor_snippets",
                    serde_json::to_string_pretty(competitor_snippets)?,
                ),
                ("brand_voice", prompts::BRAND_VOICE.to_string()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.5, 2500))
            .await?;
        extract_json(&raw)
    }

    /// Full rewrite for content scoring far below the inclusion bar.
    pub async fn comprehensive_rewrite(
        &self,
        target_keywords: &[String],
        competitor_snippets: &[CompetitorSnippet],
        content_analysis: &ContentAnalysis,
    ) -> Result<OptimizedContent> {
        let prompt = prompts::render(
            prompts::COMPREHENSIVE_REWRITE,
            &[
                ("target_keywords", target_keywords.join(", ")),
                (
                    "competitor_snippets",
                    serde_json::to_string_pretty(competitor_snippets)?,
                ),
                (
                    "content_analysis",
                    serde_json::to_string_pretty(content_analysis)?,
                ),
                ("brand_voice", prompts::BRAND_VOICE.to_string()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.6, 3000))
            .await?;
        extract_json(&raw)
    }

    pub async fn create_brief(&self, opportunity_id: &str) -> Result<ContentBrief> {
        let prompt = prompts::render(
            prompts::CONTENT_BRIEF,
            &[
                ("opportunity_id", opportunity_id.to_string()),
                ("brand_voice", prompts::BRAND_VOICE.to_string()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.4, 1200))
            .await?;
        extract_json(&raw)
    }

    /// Draft the article body for a brief. Returns the raw draft text.
    pub async fn generate_article(&self, brief: &ContentBrief) -> Result<String> {
        let prompt = prompts::render(
            prompts::CONTENT_GENERATOR,
            &[
                ("brief", serde_json::to_string_pretty(brief)?),
                ("brand_voice", prompts::BRAND_VOICE.to_string()),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.6, 3000))
            .await?;
        let draft: Draft = extract_json(&raw)?;
        Ok(format!("# {}\n\n{}", draft.title, draft.body))
    }

    pub async fn optimize_seo(
        &self,
        content: &str,
        target_keywords: &[String],
    ) -> Result<SeoOptimization> {
        let prompt = prompts::render(
            prompts::SEO_OPTIMIZER,
            &[
                ("content", content.to_string()),
                ("target_keywords", target_keywords.join(", ")),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.3, 2000))
            .await?;
        extract_json(&raw)
    }

    pub async fn final_review(&self, content: &str) -> Result<FinalArticle> {
        let prompt = prompts::render(prompts::FINAL_REVIEW, &[("content", content.to_string())]);

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.2, 2000))
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
            model_id: "gpt-4o".into(),
            api_key: None,
            base_url: None,
            azure_resource: None,
            azure_deployment: None,
            azure_api_version: None,
            max_tokens: 3000,
            temperature: 0.5,
        }
    }

    #[tokio::test]
    async fn test_targeted_optimize_parses_content() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"status":"optimized","title":"Mortgage rates explained","body":"...","changes":["added rate table"]}"#,
        ]));
        let optimizer = ContentOptimizer::new(client, model());

        let optimized = optimizer
            .targeted_optimize(&ContentAnalysis::default(), &[])
            .await
            .unwrap();
        assert_eq!(optimized.status, "optimized");
        assert_eq!(optimized.changes, vec!["added rate table"]);
    }

    #[tokio::test]
    async fn test_generate_article_joins_title_and_body() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"title":"Saving smart","body":"Start early."}"#,
        ]));
        let optimizer = ContentOptimizer::new(client, model());

        let draft = optimizer
            .generate_article(&ContentBrief::default())
            .await
            .unwrap();
        assert_eq!(draft, "# Saving smart\n\nStart early.");
    }
}
