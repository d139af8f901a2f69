//! Generation backend abstraction
//!
//! Provides a common interface over the text-generation service and the
//! resolver that picks which of its models to use.

mod error;
mod gemini;
mod resolver;
mod types;

pub use error::{LlmError, LlmErrorKind};
pub use gemini::GeminiBackend;
pub use resolver::ModelResolver;
pub use types::*;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for generation backends
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// List the models the backend exposes, with their supported operations
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError>;

    /// Generate text for a single prompt with the named model
    async fn generate(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError>;

    /// Provider name for logs
    fn provider(&self) -> &str;
}

/// Logging wrapper for generation backends
pub struct LoggingBackend {
    inner: Arc<dyn GenerationBackend>,
}

impl LoggingBackend {
    pub fn new(inner: Arc<dyn GenerationBackend>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl GenerationBackend for LoggingBackend {
    async fn list_models(&self) -> Result<Vec<ModelInfo>, LlmError> {
        let result = self.inner.list_models().await;
        match &result {
            Ok(models) => tracing::info!(
                provider = self.inner.provider(),
                count = models.len(),
                "Model catalogue listed"
            ),
            Err(e) => tracing::warn!(
                provider = self.inner.provider(),
                error = %e.message,
                kind = e.kind.as_str(),
                "Model catalogue listing failed"
            ),
        }
        result
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.generate(model, prompt).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %model,
                    duration_ms = %duration.as_millis(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    finish_reason = response.finish_reason.as_deref().unwrap_or("none"),
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %model,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = e.kind.as_str(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn provider(&self) -> &str {
        self.inner.provider()
    }
}
