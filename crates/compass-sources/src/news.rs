use std::collections::{HashMap, HashSet};

use futures::future::BoxFuture;

use compass_core::config::NewsConfig;
use compass_core::error::Result;
use compass_core::traits::NewsSource;
use compass_core::types::Article;

/// In-memory news source over articles the dashboard already fetched.
/// Delivery honors the `NewsSource` contract: deduplicated by URL, newest
/// first, at most `per_source_limit` per feed, bounded by `max_articles`
/// overall.
pub struct StaticNewsSource {
    articles: Vec<Article>,
    config: NewsConfig,
}

impl StaticNewsSource {
    pub fn new(articles: Vec<Article>, config: NewsConfig) -> Self {
        Self { articles, config }
    }

    fn prepared(&self) -> Vec<Article> {
        let mut seen = HashSet::new();
        let mut articles: Vec<Article> = self
            .articles
            .iter()
            .filter(|a| seen.insert(a.url.clone()))
            .cloned()
            .collect();

        // None sorts last; undated articles never displace dated ones.
        articles.sort_by(|a, b| b.published_date.cmp(&a.published_date));

        let mut per_source: HashMap<&str, usize> = HashMap::new();
        let mut bounded = Vec::with_capacity(articles.len().min(self.config.max_articles));
        for article in &articles {
            let count = per_source.entry(article.source.as_str()).or_insert(0);
            if *count >= self.config.per_source_limit {
                continue;
            }
            *count += 1;
            bounded.push(article.clone());
            if bounded.len() == self.config.max_articles {
                break;
            }
        }
        bounded
    }
}

impl NewsSource for StaticNewsSource {
    fn fetch_articles(&self) -> BoxFuture<'_, Result<Vec<Article>>> {
        Box::pin(async move { Ok(self.prepared()) })
    }
}
