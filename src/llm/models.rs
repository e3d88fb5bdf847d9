//! Model definitions
//!
//! Every model the agent can be pointed at, in one place.

use super::{AnthropicService, LlmService};
use std::sync::Arc;

/// Model definition with metadata
#[derive(Debug, Clone)]
pub struct ModelDef {
    /// User-facing model ID (e.g., "claude-4.5-sonnet")
    pub id: &'static str,
    /// API name used by the provider (e.g., "claude-sonnet-4-5-20250929")
    pub api_name: &'static str,
    /// Human-readable description
    pub description: &'static str,
}

impl ModelDef {
    /// Build the service for this model. Accepts any non-empty key,
    /// including "implicit" in gateway mode.
    pub fn create(
        &self,
        api_key: &str,
        gateway: Option<&str>,
    ) -> Result<Arc<dyn LlmService>, String> {
        if api_key.is_empty() {
            return Err(format!("{} requires ANTHROPIC_API_KEY or gateway", self.id));
        }
        let service = AnthropicService::new(api_key.to_string(), self.id, self.api_name, gateway)
            .map_err(|e| e.message)?;
        Ok(Arc::new(service))
    }
}

/// Get all available model definitions
pub fn all_models() -> &'static [ModelDef] {
    &[
        ModelDef {
            id: "claude-4.5-sonnet",
            api_name: "claude-sonnet-4-5-20250929",
            description: "Claude Sonnet 4.5 (balanced, default)",
        },
        ModelDef {
            id: "claude-4.5-haiku",
            api_name: "claude-haiku-4-5-20251001",
            description: "Claude Haiku 4.5 (fast, inexpensive)",
        },
        ModelDef {
            id: "claude-4.5-opus",
            api_name: "claude-opus-4-5-20251101",
            description: "Claude Opus 4.5 (most capable, slower)",
        },
    ]
}
