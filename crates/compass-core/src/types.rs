use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one workflow run.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One article as delivered by a news source: already deduplicated,
/// bounded in count, and sorted newest-first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Article {
    pub headline: String,
    pub summary: String,
    pub url: String,
    pub published_date: Option<DateTime<Utc>>,
    pub source: String,
}

/// An article the scanner judged relevant, with its reasoning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevantArticle {
    pub headline: String,
    pub url: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub relevance_reason: String,
    #[serde(default)]
    pub matched_keywords: Vec<String>,
}

/// A search intent extracted from relevant news.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIntent {
    pub query: String,
    #[serde(default)]
    pub intent_type: String,
    #[serde(default)]
    pub audience: String,
    #[serde(default)]
    pub source_headline: String,
}

/// A competitive content gap identified by the gap analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitiveGap {
    pub potential_headline: String,
    pub urgency_score: f64,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    #[serde(default)]
    pub recommended_angle: String,
    #[serde(default)]
    pub competitor_weakness: String,
    #[serde(default)]
    pub traffic_potential: String,
}

/// A prioritized content opportunity surfaced to the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentOpportunity {
    pub headline: String,
    pub priority: f64,
    pub keywords: Vec<String>,
    pub content_angle: String,
    pub ai_overview_gap: String,
    pub estimated_traffic: String,
    pub urgency_level: UrgencyLevel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Urgent,
    #[default]
    Normal,
}

/// Final report of a news-intelligence run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsReport {
    pub content_opportunities: Vec<ContentOpportunity>,
    pub urgent_count: usize,
    pub total_analyzed: usize,
    pub analysis_timestamp: DateTime<Utc>,
}

/// AI Overview block scraped for one keyword.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiOverview {
    #[serde(default)]
    pub present: bool,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub cited_sources: Vec<String>,
}

/// One competitor snippet appearing in an AI Overview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetitorSnippet {
    pub keyword: String,
    pub domain: String,
    pub snippet: String,
    #[serde(default)]
    pub position: Option<u32>,
}

/// Evaluation of current content against AI Overview winners.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentAnalysis {
    #[serde(default)]
    pub average_inclusion_score: f64,
    #[serde(default)]
    pub per_keyword_scores: Vec<KeywordScore>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordScore {
    pub keyword: String,
    pub score: f64,
}

/// Content produced (or confirmed unchanged) by an optimization branch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptimizedContent {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub changes: Vec<String>,
}

impl OptimizedContent {
    /// Marker content for the monitor-only branch.
    pub fn no_changes_needed() -> Self {
        Self {
            status: "no_changes_needed".to_string(),
            ..Self::default()
        }
    }
}

/// Predicted AI Overview inclusion for optimized content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InclusionPrediction {
    #[serde(default)]
    pub probability: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub remaining_weaknesses: Vec<String>,
    #[serde(default)]
    pub confidence: String,
}

/// Final report of a generative-engine-optimization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeoReport {
    pub optimization_results: Vec<KeywordOptimization>,
    pub strategy: String,
    pub optimized_content: OptimizedContent,
    pub prediction: InclusionPrediction,
}

/// Per-keyword outcome within a GEO run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordOptimization {
    pub keyword: String,
    pub inclusion_score: f64,
}

/// Brief for a new article.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentBrief {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    #[serde(default)]
    pub angle: String,
    #[serde(default)]
    pub outline: Vec<String>,
}

/// Brand-voice compliance verdict.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandCompliance {
    #[serde(default)]
    pub compliant: bool,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub revised_content: Option<String>,
}

/// SEO adjustments applied to a draft.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeoOptimization {
    #[serde(default)]
    pub optimized_content: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub applied_changes: Vec<String>,
}

/// Fully reviewed article ready for publication.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinalArticle {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub meta_description: String,
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub review_notes: Vec<String>,
}

/// A single prompt-completion request against a completion capability.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, temperature: f32, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            temperature,
            max_tokens,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_unique() {
        assert_ne!(RunId::new().0, RunId::new().0);
    }

    #[test]
    fn test_urgency_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&UrgencyLevel::Urgent).unwrap(),
            "\"urgent\""
        );
        assert_eq!(
            serde_json::to_string(&UrgencyLevel::Normal).unwrap(),
            "\"normal\""
        );
    }

    #[test]
    fn test_relevant_article_tolerates_missing_fields() {
        let parsed: RelevantArticle =
            serde_json::from_str(r#"{"headline":"ECB cuts rates","url":"https://x"}"#).unwrap();
        assert_eq!(parsed.headline, "ECB cuts rates");
        assert!(parsed.matched_keywords.is_empty());
    }

    #[test]
    fn test_no_changes_needed_marker() {
        let content = OptimizedContent::no_changes_needed();
        assert_eq!(content.status, "no_changes_needed");
        assert!(content.body.is_empty());
    }
}
