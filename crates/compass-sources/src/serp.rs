use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use compass_core::config::SerpConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::SerpSource;
use compass_core::types::AiOverview;

/// SERP client: `GET {base_url}/api/serp?keyword=..` returning a JSON
/// envelope with an optional `ai_overview` block. A keyword with no AI
/// Overview is a normal answer, not an error.
pub struct HttpSerpSource {
    http: Client,
    config: SerpConfig,
}

#[derive(Deserialize)]
struct SerpEnvelope {
    #[serde(default)]
    ai_overview: Option<AiOverview>,
}

impl HttpSerpSource {
    pub fn new(config: SerpConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    fn parse_overview(raw: &str) -> Result<AiOverview> {
        let envelope: SerpEnvelope = serde_json::from_str(raw)
            .map_err(|e| CompassError::response_parse(format!("bad serp envelope: {e}"), raw))?;
        Ok(envelope.ai_overview.unwrap_or_default())
    }
}

impl SerpSource for HttpSerpSource {
    fn fetch_ai_overview(&self, keyword: &str) -> BoxFuture<'_, Result<AiOverview>> {
        let keyword = keyword.to_string();

        Box::pin(async move {
            let url = format!("{}/api/serp", self.config.base_url.trim_end_matches('/'));

            let mut request = self.http.get(&url).query(&[("keyword", keyword.as_str())]);
            if let Some(key) = &self.config.api_key {
                request = request.bearer_auth(key);
            }

            let response = request
                .send()
                .await
                .map_err(|e| CompassError::external("serp", e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                return Err(CompassError::external(
                    "serp",
                    format!("HTTP {status} for keyword '{keyword}'"),
                ));
            }

            let raw = response
                .text()
                .await
                .map_err(|e| CompassError::external("serp", e.to_string()))?;
            Self::parse_overview(&raw)
        })
    }
}
