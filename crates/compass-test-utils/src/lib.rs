//! Mock capabilities and fixtures shared by Compass test suites.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use futures::future::BoxFuture;

use compass_core::config::ModelConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::{CompletionClient, NewsSource, RankTracker, SerpSource};
use compass_core::types::{AiOverview, Article, CompetitorSnippet, CompletionRequest};

/// Completion client fed from a FIFO queue of canned responses. Records
/// every prompt it receives so tests can assert on rendered prompt content.
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockCompletionClient {
    pub fn new(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(|r| Ok(r.into())).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A client whose every call fails with an external-call error.
    pub fn failing(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            responses: Mutex::new(
                std::iter::repeat_with(|| {
                    Err(CompassError::external("mock-llm", message.clone()))
                })
                .take(64)
                .collect(),
            ),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far, in call order.
    pub fn received_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl CompletionClient for MockCompletionClient {
    fn complete(
        &self,
        _config: &ModelConfig,
        request: CompletionRequest,
    ) -> BoxFuture<'_, Result<String>> {
        self.prompts.lock().unwrap().push(request.prompt);
        let next = self.responses.lock().unwrap().pop_front();
        Box::pin(async move {
            next.unwrap_or_else(|| {
                Err(CompassError::external(
                    "mock-llm",
                    "mock response queue exhausted",
                ))
            })
        })
    }
}

/// Serp source returning the same AI Overview for every keyword.
pub struct MockSerpSource {
    overview: AiOverview,
}

impl MockSerpSource {
    pub fn new(overview: AiOverview) -> Self {
        Self { overview }
    }
}

impl Default for MockSerpSource {
    fn default() -> Self {
        Self {
            overview: AiOverview {
                present: true,
                summary: "Mortgage rates are set by the central bank.".to_string(),
                cited_sources: vec!["competitor.example".to_string()],
            },
        }
    }
}

impl SerpSource for MockSerpSource {
    fn fetch_ai_overview(&self, _keyword: &str) -> BoxFuture<'_, Result<AiOverview>> {
        let overview = self.overview.clone();
        Box::pin(async move { Ok(overview) })
    }
}

/// Rank tracker with a fixed keyword list.
pub struct MockRankTracker {
    keywords: Vec<String>,
}

impl MockRankTracker {
    pub fn new(keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }
}

impl RankTracker for MockRankTracker {
    fn tracked_keywords(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        let keywords = self.keywords.clone();
        Box::pin(async move { Ok(keywords) })
    }
}

/// News source yielding a fixed article list verbatim.
pub struct MockNewsSource {
    articles: Vec<Article>,
}

impl MockNewsSource {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }
}

impl NewsSource for MockNewsSource {
    fn fetch_articles(&self) -> BoxFuture<'_, Result<Vec<Article>>> {
        let articles = self.articles.clone();
        Box::pin(async move { Ok(articles) })
    }
}

/// Fixture article with a deterministic publish date offset in days.
pub fn article(headline: &str, days_ago: i64) -> Article {
    let base = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    Article {
        headline: headline.to_string(),
        summary: format!("Summary of {headline}"),
        url: format!("https://news.example/{}", headline.replace(' ', "-")),
        published_date: Some(base - chrono::Duration::days(days_ago)),
        source: "fixture".to_string(),
    }
}

/// Fixture competitor snippet.
pub fn snippet(keyword: &str, domain: &str) -> CompetitorSnippet {
    CompetitorSnippet {
        keyword: keyword.to_string(),
        domain: domain.to_string(),
        snippet: format!("{domain} answers '{keyword}' concisely."),
        position: Some(1),
    }
}
