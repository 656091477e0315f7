//! Completion clients and response handling.
//!
//! Providers speak the OpenAI chat-completions wire format (Azure OpenAI
//! differs only in endpoint shape and auth header) and return whole
//! responses as raw text. `parse` turns that text into structured data,
//! stripping markdown fences first. `retry` wraps any client with a
//! single-retry policy for transient transport failures.

pub mod parse;
pub mod providers;
pub mod retry;

pub use parse::extract_json;
pub use providers::{AzureClient, OpenAiClient};
pub use retry::RetryOnceClient;

use std::sync::Arc;

use compass_core::config::ModelConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::CompletionClient;

/// Build a completion client for the configured provider.
pub fn client_for(config: &ModelConfig) -> Result<Arc<dyn CompletionClient>> {
    match config.provider.as_str() {
        "azure" => Ok(Arc::new(AzureClient::new())),
        "openai" => Ok(Arc::new(OpenAiClient::new())),
        other => Err(CompassError::Config(format!(
            "unsupported completion provider '{other}'"
        ))),
    }
}
