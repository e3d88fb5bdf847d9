//! HTTP API for the calendar agent

mod handlers;
mod sse;
mod types;

pub use handlers::create_router;

use crate::calendar::CalendarStore;
use crate::config::AppConfig;
use crate::llm::ModelRegistry;
use crate::orchestrator::{
    ChatOrchestrator, LlmClient, Orchestrator, OrchestratorConfig, RegistryLlmClient,
};
use crate::tools::ToolRegistry;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub store: Arc<dyn CalendarStore>,
    pub llm_registry: Arc<ModelRegistry>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CalendarStore>,
        llm_registry: Arc<ModelRegistry>,
    ) -> Self {
        let llm: Arc<dyn LlmClient> = Arc::new(RegistryLlmClient::new(
            llm_registry.clone(),
            llm_registry.default_model_id().to_string(),
        ));
        Self::with_llm(config, store, llm_registry, llm)
    }

    /// Build state around a specific model client
    pub fn with_llm(
        config: AppConfig,
        store: Arc<dyn CalendarStore>,
        llm_registry: Arc<ModelRegistry>,
        llm: Arc<dyn LlmClient>,
    ) -> Self {
        let orchestrator = Orchestrator::new(
            llm,
            ToolRegistry::calendar(),
            OrchestratorConfig {
                max_steps: config.max_steps,
                timeout: config.request_timeout,
                max_tokens: None,
            },
        );
        Self {
            orchestrator: Arc::new(orchestrator),
            store,
            llm_registry,
            config: Arc::new(config),
        }
    }
}
