use std::collections::HashMap;

use serde::Serialize;

use compass_core::types::{
    AiOverview, Article, BrandCompliance, CompetitiveGap, CompetitorSnippet, ContentAnalysis,
    ContentBrief, ContentOpportunity, FinalArticle, InclusionPrediction, OptimizedContent,
    RelevantArticle, SearchIntent, SeoOptimization, UrgencyLevel,
};

/// State threaded through a news-intelligence run. Stages only ever extend
/// it; graph topology guarantees writers run before readers.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NewsIntelState {
    pub rss_articles: Vec<Article>,
    pub tracked_keywords: Vec<String>,
    pub relevant_news: Vec<RelevantArticle>,
    pub extracted_intents: Vec<SearchIntent>,
    pub competitive_gaps: Vec<CompetitiveGap>,
    pub content_opportunities: Vec<ContentOpportunity>,
    pub priority_level: UrgencyLevel,
}

/// State threaded through a GEO optimization run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GeoState {
    pub target_keywords: Vec<String>,
    pub ai_overview_data: HashMap<String, AiOverview>,
    pub competitor_snippets: Vec<CompetitorSnippet>,
    pub content_analysis: ContentAnalysis,
    /// Which branch ran: "monitor", "targeted", or "comprehensive".
    pub optimization_strategy: String,
    pub optimized_content: OptimizedContent,
    pub inclusion_predictions: InclusionPrediction,
}

/// State threaded through a content-generation run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ContentGenState {
    pub opportunity_id: String,
    pub content_brief: ContentBrief,
    pub generated_content: String,
    pub brand_compliance: BrandCompliance,
    pub seo_optimization: SeoOptimization,
    pub final_article: FinalArticle,
}
