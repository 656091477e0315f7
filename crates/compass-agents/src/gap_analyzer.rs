use std::sync::Arc;

use compass_core::config::ModelConfig;
use compass_core::error::Result;
use compass_core::traits::CompletionClient;
use compass_core::types::{CompetitiveGap, CompletionRequest, SearchIntent};
use compass_llm::parse::extract_json;

use crate::prompts;

/// Finds content gaps where competitor coverage is weak for high-value
/// intents. The completion is a bare JSON array of gaps.
pub struct GapAnalyzer {
    client: Arc<dyn CompletionClient>,
    model: ModelConfig,
}

impl GapAnalyzer {
    pub fn new(client: Arc<dyn CompletionClient>, model: ModelConfig) -> Self {
        Self { client, model }
    }

    pub async fn find_opportunities(
        &self,
        extracted_intents: &[SearchIntent],
        tracked_keywords: &[String],
    ) -> Result<Vec<CompetitiveGap>> {
        let prompt = prompts::render(
            prompts::GAP_ANALYZER,
            &[
                (
                    "extracted_intents",
                    serde_json::to_string_pretty(extracted_intents)?,
                ),
                ("tracked_keywords", tracked_keywords.join(", ")),
            ],
        );

        let raw = self
            .client
            .complete(&self.model, CompletionRequest::new(prompt, 0.4, 1500))
            .await?;
        extract_json(&raw)
    }
}
