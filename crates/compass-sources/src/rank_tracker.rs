use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use compass_core::config::RankTrackerConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::RankTracker;

/// SerpBear-style rank tracker: `GET {base_url}/api/keywords` with bearer
/// auth. Transport failures surface as `ExternalCall`; degrading to a
/// default keyword set is the caller's decision, not ours.
pub struct HttpRankTracker {
    http: Client,
    config: RankTrackerConfig,
}

#[derive(Deserialize)]
struct KeywordsEnvelope {
    #[serde(default)]
    keywords: Vec<KeywordEntry>,
}

#[derive(Deserialize)]
struct KeywordEntry {
    keyword: String,
}

impl HttpRankTracker {
    pub fn new(config: RankTrackerConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn parse_keywords(raw: &str) -> Result<Vec<String>> {
        let envelope: KeywordsEnvelope = serde_json::from_str(raw)
            .map_err(|e| CompassError::response_parse(format!("bad keywords envelope: {e}"), raw))?;
        Ok(envelope.keywords.into_iter().map(|k| k.keyword).collect())
    }
}

impl RankTracker for HttpRankTracker {
    fn tracked_keywords(&self) -> BoxFuture<'_, Result<Vec<String>>> {
        Box::pin(async move {
            let url = format!("{}/api/keywords", self.config.base_url.trim_end_matches('/'));

            let mut request = self.http.get(&url);
            if let Some(key) = &self.config.api_key {
                request = request.bearer_auth(key);
            }

            let response = request.send().await.map_err(|e| {
                warn!(error = %e, "rank tracker unreachable");
                CompassError::external("rank_tracker", e.to_string())
            })?;

            if !response.status().is_success() {
                let status = response.status();
                warn!(%status, "rank tracker returned an error status");
                return Err(CompassError::external(
                    "rank_tracker",
                    format!("HTTP {status}"),
                ));
            }

            let raw = response
                .text()
                .await
                .map_err(|e| CompassError::external("rank_tracker", e.to_string()))?;
            Self::parse_keywords(&raw)
        })
    }
}
