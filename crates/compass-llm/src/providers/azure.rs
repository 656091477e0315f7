use futures::future::BoxFuture;
use reqwest::Client;

use compass_core::config::ModelConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::CompletionClient;
use compass_core::types::CompletionRequest;

/// Azure OpenAI client. Uses the same wire format as OpenAI but different
/// endpoint structure and `api-key` header instead of Bearer token.
pub struct AzureClient {
    http: Client,
}

impl AzureClient {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for AzureClient {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionClient for AzureClient {
    fn complete(
        &self,
        config: &ModelConfig,
        request: CompletionRequest,
    ) -> BoxFuture<'_, Result<String>> {
        let config = config.clone();

        Box::pin(async move {
            let resource = config
                .azure_resource
                .as_deref()
                .ok_or_else(|| CompassError::Config("Azure: azure_resource is required".into()))?;
            let deployment = config
                .azure_deployment
                .as_deref()
                .ok_or_else(|| CompassError::Config("Azure: azure_deployment is required".into()))?;
            let api_version = config.azure_api_version.as_deref().unwrap_or("2024-02-01");
            let api_key = config
                .api_key
                .as_deref()
                .ok_or_else(|| CompassError::Config("Azure: api_key is required".into()))?;

            let url = format!(
                "https://{resource}.openai.azure.com/openai/deployments/{deployment}/chat/completions?api-version={api_version}"
            );

            // Reuse the OpenAI body shape
            let body = super::openai::build_body(&config, &request);

            let response = self
                .http
                .post(&url)
                .header("api-key", api_key)
                .header("content-type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| CompassError::external("azure-openai", e.to_string()))?;

            if !response.status().is_success() {
                let status = response.status();
                let body = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "unknown".to_string());
                return Err(CompassError::external(
                    "azure-openai",
                    format!("HTTP {status}: {body}"),
                ));
            }

            let raw = response
                .text()
                .await
                .map_err(|e| CompassError::external("azure-openai", e.to_string()))?;
            super::openai::extract_text(&raw)
        })
    }
}
