use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CompassError, Result};

/// Top-level Compass configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    /// Per-agent model overrides, keyed by agent name (e.g. "content_optimizer").
    #[serde(default)]
    pub models: HashMap<String, ModelConfig>,
    #[serde(default)]
    pub rank_tracker: Option<RankTrackerConfig>,
    #[serde(default)]
    pub serp: Option<SerpConfig>,
    #[serde(default)]
    pub news: NewsConfig,
    #[serde(default)]
    pub workflow: WorkflowConfig,
}

/// Model parameters for one completion endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    pub model_id: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub azure_resource: Option<String>,
    #[serde(default)]
    pub azure_deployment: Option<String>,
    #[serde(default)]
    pub azure_api_version: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_provider() -> String {
    "azure".to_string()
}
fn default_max_tokens() -> u32 {
    1500
}
fn default_temperature() -> f32 {
    0.3
}

/// Rank-tracking API (SerpBear-compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankTrackerConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// SERP / AI Overview data endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerpConfig {
    pub base_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

/// News intake bounds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsConfig {
    #[serde(default = "default_max_articles")]
    pub max_articles: usize,
    #[serde(default = "default_per_source_limit")]
    pub per_source_limit: usize,
}

impl Default for NewsConfig {
    fn default() -> Self {
        Self {
            max_articles: default_max_articles(),
            per_source_limit: default_per_source_limit(),
        }
    }
}

fn default_max_articles() -> usize {
    20
}
fn default_per_source_limit() -> usize {
    5
}

/// Workflow run limits. The timeout is applied by the caller around the
/// whole run; the graph engine itself has no cancellation primitive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    300
}

impl AppConfig {
    /// Load config from a TOML file, with env var expansion.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|_| CompassError::ConfigNotFound(path.display().to_string()))?;

        // Expand ${ENV_VAR} references
        let expanded = expand_env_vars(&content);

        toml::from_str(&expanded).map_err(|e| CompassError::Config(e.to_string()))
    }

    /// Model config for a named agent, falling back to the default `[model]`.
    pub fn model_for(&self, agent: &str) -> &ModelConfig {
        self.models.get(agent).unwrap_or(&self.model)
    }
}

/// Expand `${ENV_VAR}` patterns in a string.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }
            match std::env::var(&var_name) {
                Ok(value) => result.push_str(&value),
                Err(_) => {
                    result.push_str("${");
                    result.push_str(&var_name);
                    result.push('}');
                }
            }
        } else {
            result.push(c);
        }
    }

    result
}
