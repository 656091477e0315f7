use futures::future::BoxFuture;

use crate::config::ModelConfig;
use crate::error::Result;
use crate::types::{AiOverview, Article, CompletionRequest};

/// Completion capability: render a prompt, get raw text back.
///
/// Callers are responsible for parsing the returned text; the client makes
/// no guarantee beyond "the provider answered with this string".
pub trait CompletionClient: Send + Sync + 'static {
    fn complete(
        &self,
        config: &ModelConfig,
        request: CompletionRequest,
    ) -> BoxFuture<'_, Result<String>>;
}

/// News capability. Implementations must deliver articles deduplicated,
/// bounded in count, and sorted by publish date descending.
pub trait NewsSource: Send + Sync + 'static {
    fn fetch_articles(&self) -> BoxFuture<'_, Result<Vec<Article>>>;
}

/// Rank-tracking capability: the keywords currently tracked for the brand.
pub trait RankTracker: Send + Sync + 'static {
    fn tracked_keywords(&self) -> BoxFuture<'_, Result<Vec<String>>>;
}

/// SERP capability: AI Overview data for a single keyword.
pub trait SerpSource: Send + Sync + 'static {
    fn fetch_ai_overview(&self, keyword: &str) -> BoxFuture<'_, Result<AiOverview>>;
}
