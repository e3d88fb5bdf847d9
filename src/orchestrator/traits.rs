//! Trait abstractions for orchestrator I/O
//!
//! These traits enable testing the loop with mock implementations.

use crate::llm::{LlmError, LlmRequest, LlmStream, ModelRegistry, ToolDefinition};
use crate::tools::{ToolCall, ToolContext, ToolOutput, ToolRegistry};
use async_trait::async_trait;
use std::sync::Arc;

/// Client for streaming model turns
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Open a streamed model turn
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Executor for tools
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute one call. Never fails; errors come back inside the output.
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolOutput;

    /// Get tool definitions for LLM
    fn definitions(&self) -> Vec<ToolDefinition>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: LlmClient + ?Sized> LlmClient for Arc<T> {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        (**self).stream(request).await
    }

    fn model_id(&self) -> &str {
        (**self).model_id()
    }
}

#[async_trait]
impl<T: ToolExecutor + ?Sized> ToolExecutor for Arc<T> {
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolOutput {
        (**self).execute(call, ctx).await
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        (**self).definitions()
    }
}

// ============================================================================
// Production Adapters
// ============================================================================

/// Adapter to use `ModelRegistry` as `LlmClient`
pub struct RegistryLlmClient {
    registry: Arc<ModelRegistry>,
    model_id: String,
}

impl RegistryLlmClient {
    pub fn new(registry: Arc<ModelRegistry>, model_id: String) -> Self {
        Self { registry, model_id }
    }
}

#[async_trait]
impl LlmClient for RegistryLlmClient {
    async fn stream(&self, request: &LlmRequest) -> Result<LlmStream, LlmError> {
        let llm = self
            .registry
            .get(&self.model_id)
            .or_else(|| self.registry.default())
            .ok_or_else(|| LlmError::network("No LLM available"))?;
        llm.stream(request).await
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, call: &ToolCall, ctx: &ToolContext) -> ToolOutput {
        self.dispatch(call, ctx).await
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        ToolRegistry::definitions(self)
    }
}
