//! Embedded prompt templates.
//!
//! Placeholders use `{name}` markers filled by `render`. Templates ask for
//! JSON-only answers; the agents still strip code fences defensively when
//! parsing.

/// Substitute `{key}` placeholders in a template.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{key}}}"), value);
    }
    out
}

/// House brand-voice guidelines injected into generation prompts.
pub const BRAND_VOICE: &str = "\
Write in a clear, direct, and helpful voice. Plain language over jargon. \
Customer benefit first, product mechanics second. Never overpromise returns \
or downplay risk. Short sentences. Active voice.";

pub const NEWS_SCANNER: &str = "\
You are a content-marketing analyst for a retail bank.

Review the news articles below and decide which are relevant to our content
strategy, given the keywords we currently track.

ARTICLES:
{rss_articles}

TRACKED KEYWORDS: {tracked_keywords}

BRAND VOICE (for context on what we publish):
{brand_voice}

Respond with JSON only:
{\"relevant_articles\": [{\"headline\": str, \"url\": str, \
\"relevance_score\": number 0-100, \"relevance_reason\": str, \
\"matched_keywords\": [str]}]}";

pub const INTENT_EXTRACTOR: &str = "\
Extract the search intents readers will have after seeing this news.

NEWS ARTICLES:
{news_articles}

MARKET CONTEXT: {market_context}

For each distinct intent, give the likely search query, the intent type
(informational, commercial, transactional), and the audience.

Respond with JSON only:
{\"extracted_intents\": [{\"query\": str, \"intent_type\": str, \
\"audience\": str, \"source_headline\": str}]}";

pub const GAP_ANALYZER: &str = "\
Analyze competitive content gaps for our content strategy.

EXTRACTED INTENTS:
{extracted_intents}

TRACKED KEYWORDS: {tracked_keywords}

Identify opportunities where:
1. High search volume but weak competitor content
2. Trending topics with first-mover advantage
3. Complex financial topics needing expert explanation
4. We have unique product or service advantages

Respond with a JSON array only:
[{\"potential_headline\": str, \"urgency_score\": number 0-100, \
\"target_keywords\": [str], \"recommended_angle\": str, \
\"competitor_weakness\": str, \"traffic_potential\": str}]";

pub const CONTENT_EVALUATOR: &str = "\
Evaluate our current content against the snippets winning AI Overview
placement for these keywords.

TARGET KEYWORDS: {target_keywords}

COMPETITOR SNIPPETS:
{competitor_snippets}

Score each keyword 0-100 for how likely our existing content is to be
included in the AI Overview, and summarize strengths and weaknesses.

Respond with JSON only:
{\"average_inclusion_score\": number, \"per_keyword_scores\": \
[{\"keyword\": str, \"score\": number}], \"strengths\": [str], \
\"weaknesses\": [str]}";

pub const INCLUSION_PREDICTOR: &str = "\
Analyze this optimized content for AI Overview inclusion probability.

CONTENT:
{content}

COMPETITORS:
{competitors}

TARGET KEYWORDS: {target_keywords}

Provide the inclusion probability (0-100) with reasoning, specific
strengths versus competitors, remaining weaknesses, and your confidence.

Respond with JSON only:
{\"probability\": number, \"reasoning\": str, \"strengths\": [str], \
\"remaining_weaknesses\": [str], \"confidence\": str}";

pub const TARGETED_OPTIMIZER: &str = "\
Perform a targeted optimization pass on our content.

CURRENT CONTENT ANALYSIS:
{content_analysis}

COMPETITOR SNIPPETS:
{competitor_snippets}

BRAND VOICE:
{brand_voice}

Goal: improve AI Overview inclusion while keeping the brand voice intact.
Make the smallest set of changes that closes the identified gaps.

Respond with JSON only:
{\"status\": str, \"title\": str, \"body\": str, \"changes\": [str]}";

pub const COMPREHENSIVE_REWRITE: &str = "\
Rewrite our content comprehensively for AI Overview inclusion.

TARGET KEYWORDS: {target_keywords}

COMPETITOR ANALYSIS:
{competitor_snippets}

CURRENT CONTENT GAPS:
{content_analysis}

BRAND VOICE:
{brand_voice}

Create content that addresses all identified sub-intents, outperforms the
competitor snippets, keeps the brand voice authentic, and provides genuine
customer value.

Respond with JSON only:
{\"status\": str, \"title\": str, \"body\": str, \"changes\": [str]}";

pub const BRAND_ENFORCER: &str = "\
Validate this content against our brand guidelines.

CONTENT:
{content}

BRAND GUIDELINES:
{brand_voice}

Check tone, language, product positioning, and customer focus. If the
content is non-compliant, provide a revised version.

Respond with JSON only:
{\"compliant\": bool, \"issues\": [str], \"revised_content\": str or null}";

pub const CONTENT_BRIEF: &str = "\
Create a content brief for opportunity '{opportunity_id}'.

BRAND VOICE:
{brand_voice}

Respond with JSON only:
{\"title\": str, \"target_keywords\": [str], \"angle\": str, \
\"outline\": [str]}";

pub const CONTENT_GENERATOR: &str = "\
Write the full article for this brief.

BRIEF:
{brief}

BRAND VOICE:
{brand_voice}

Respond with JSON only:
{\"title\": str, \"body\": str}";

pub const SEO_OPTIMIZER: &str = "\
Optimize this article for search without harming readability.

ARTICLE:
{content}

TARGET KEYWORDS: {target_keywords}

Respond with JSON only:
{\"optimized_content\": str, \"meta_description\": str, \
\"applied_changes\": [str]}";

pub const FINAL_REVIEW: &str = "\
Perform a final quality review of this article before publication.

ARTICLE:
{content}

Score overall quality 0-100 and list any remaining notes for the editor.

Respond with JSON only:
{\"title\": str, \"body\": str, \"meta_description\": str, \
\"quality_score\": number, \"review_notes\": [str]}";
