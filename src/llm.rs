//! LLM provider abstraction
//!
//! Provides a common streaming interface over language-model providers.

mod anthropic;
mod error;
mod models;
mod registry;
mod types;

pub use anthropic::AnthropicService;
pub use error::{LlmError, LlmErrorKind};
pub use models::{all_models, ModelDef};
pub use registry::{LlmConfig, ModelInfo, ModelRegistry};
pub use types::*;

use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Open a streamed completion
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        let start = Instant::now();
        let model = self.model_id.clone();

        match self.inner.stream(request).await {
            Ok(stream) => {
                tracing::debug!(
                    model = %model,
                    ttfb_ms = %start.elapsed().as_millis(),
                    "LLM stream opened"
                );
                let logged = stream.inspect(move |item| match item {
                    Ok(StreamEvent::Finish { usage, stop_reason }) => {
                        tracing::info!(
                            model = %model,
                            duration_ms = %start.elapsed().as_millis(),
                            input_tokens = usage.input_tokens,
                            output_tokens = usage.output_tokens,
                            stop_reason = stop_reason.as_deref().unwrap_or("none"),
                            "LLM request completed"
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            model = %model,
                            duration_ms = %start.elapsed().as_millis(),
                            error = %e.message,
                            "LLM stream failed"
                        );
                    }
                    Ok(_) => {}
                });
                Ok(logged.boxed())
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %start.elapsed().as_millis(),
                    error = %e.message,
                    retryable = e.kind.is_retryable(),
                    "LLM request failed"
                );
                Err(e)
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
