use std::sync::Arc;

use compass_core::config::ModelConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{
    CompetitorSnippet, CompletionRequest, ContentAnalysis, InclusionPrediction, OptimizedContent,
};
use compass_llm::parse::extract_json;

use crate::prompts;

/// Scores current content against AI Overview winners and predicts
/// inclusion probability for optimized drafts.
pub struct ContentEvaluator {
    client: Arc<dyn CompletionClient>,
    model: ModelConfig,
}

impl ContentEvaluator {
    pub fn new(client: Arc<dyn CompletionClient>, model: ModelConfig) -> Self {
        Self { client, model }
    }

    pub async fn evaluate_content(
        &self,
        target_keywords: &[String],
        competitor_snippets: &[CompetitorSnippet],
    ) -> Result<ContentAnalysis> {
        let prompt = prompts::render(
            prompts::CONTENT_EVALUATOR,
            &[
                ("target_keywords", target_keywords.join(", ")),
                (
                    "competitor_snippets",
                    serde_json::to_string_pretty(competitor_snippets)?,
                ),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.2, 1800))
            .await?;
        extract_json(&raw)
    }

    /// Low temperature: predictions should be consistent between calls.
    pub async fn predict_inclusion(
        &self,
        content: &OptimizedContent,
        competitors: &[CompetitorSnippet],
        target_keywords: &[String],
    ) -> Result<InclusionPrediction> {
        let prompt = prompts::render(
            prompts::INCLUSION_PREDICTOR,
            &[
                ("content", serde_json::to_string_pretty(content)?),
                ("competitors", serde_json::to_string_pretty(competitors)?),
                ("target_keywords", target_keywords.join(", ")),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.1, 1200))
            .await?;
        extract_json(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use compass_test_utils::{snippet, MockCompletionClient};

    fn model() -> ModelConfig {
        ModelConfig {
            provider: "azure".into(),
            model_id: "gpt-4o-mini".into(),
            api_key: None,
            base_url: None,
            azure_resource: None,
            azure_deployment: None,
            azure_api_version: None,
            max_tokens: 1800,
            temperature: 0.2,
        }
    }

    #[tokio::test]
    async fn test_evaluate_content_parses_analysis() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"average_inclusion_score":72.5,"per_keyword_scores":[{"keyword":"mortgage rates","score":72.5}],"strengths":["clear"],"weaknesses":["no sources"]}"#,
        ]));
        let evaluator = ContentEvaluator::new(client, model());

        let analysis = evaluator
            .evaluate_content(
                &["mortgage rates".to_string()],
                &[snippet("mortgage rates", "competitor.example")],
            )
            .await
            .unwrap();
        assert!((analysis.average_inclusion_score - 72.5).abs() < f64::EPSILON);
        assert_eq!(analysis.per_keyword_scores.len(), 1);
    }

    #[tokio::test]
    async fn test_predict_inclusion_parses_prediction() {
        let client = Arc::new(MockCompletionClient::new([
            r#"{"probability":64,"reasoning":"solid but few citations","strengths":["direct answer"],"remaining_weaknesses":["thin sourcing"],"confidence":"medium"}"#,
        ]));
        let evaluator = ContentEvaluator::new(client, model());

        let prediction = evaluator
            .predict_inclusion(&OptimizedContent::default(), &[], &[])
            .await
            .unwrap();
        assert!((prediction.probability - 64.0).abs() < f64::EPSILON);
        assert_eq!(prediction.confidence, "medium");
    }
}
