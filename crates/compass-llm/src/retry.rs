use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tracing::warn;

use compass_core::config::ModelConfig;
use compass_core::error::{CompassError, Result};
use compass_core::traits::CompletionClient;
use compass_core::types::CompletionRequest;

const BASE_BACKOFF_MS: u64 = 1000;

/// A completion client that retries a transient transport failure exactly
/// once. This is stage-level policy: the graph engine itself never retries,
/// and structural or parse errors are not retried here either.
pub struct RetryOnceClient {
    inner: Arc<dyn CompletionClient>,
}

impl RetryOnceClient {
    pub fn new(inner: Arc<dyn CompletionClient>) -> Self {
        Self { inner }
    }
}

fn is_retryable(e: &CompassError) -> bool {
    match e {
        CompassError::ExternalCall { message, .. } => {
            message.contains("429")
                || message.contains("500")
                || message.contains("502")
                || message.contains("503")
                || message.contains("timeout")
                || message.contains("connection")
        }
        _ => false,
    }
}

fn backoff_with_jitter() -> Duration {
    // 0.8x to 1.2x
    let jitter = 0.8 + rand::random::<f64>() * 0.4;
    Duration::from_millis((BASE_BACKOFF_MS as f64 * jitter) as u64)
}

impl CompletionClient for RetryOnceClient {
    fn complete(
        &self,
        config: &ModelConfig,
        request: CompletionRequest,
    ) -> BoxFuture<'_, Result<String>> {
        let config = config.clone();

        Box::pin(async move {
            match self.inner.complete(&config, request.clone()).await {
                Ok(text) => Ok(text),
                Err(e) if is_retryable(&e) => {
                    let backoff = backoff_with_jitter();
                    warn!(
                        error = %e,
                        backoff_ms = backoff.as_millis() as u64,
                        "retrying completion request once"
                    );
                    tokio::time::sleep(backoff).await;
                    self.inner.complete(&config, request).await
                }
                Err(e) => Err(e),
            }
        })
    }
}
