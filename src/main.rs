//! Calendar agent - natural-language calendar management
//!
//! An HTTP service that lets a language-model agent read and write a
//! calendar through typed tools, with a free/busy engine for finding open
//! time.

mod api;
mod calendar;
mod config;
mod freebusy;
mod llm;
mod orchestrator;
mod state_machine;
mod system_prompt;
mod time;
mod tools;

use api::{create_router, AppState};
use calendar::{CalendarStore, InMemoryStore, SqliteStore};
use config::AppConfig;
use llm::ModelRegistry;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "calendar_agent=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    // Configuration
    let config = AppConfig::from_env()?;

    // Calendar store
    let store: Arc<dyn CalendarStore> = match &config.db_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            tracing::info!(path = %path.display(), "Opening calendar database");
            Arc::new(SqliteStore::open(path)?)
        }
        None => {
            tracing::warn!("CALENDAR_AGENT_DB_PATH not set; events are kept in memory");
            Arc::new(InMemoryStore::new())
        }
    };

    // Initialize LLM registry
    let llm_registry = Arc::new(ModelRegistry::new(&config.llm));

    if llm_registry.has_models() {
        tracing::info!(
            models = ?llm_registry.available_models(),
            default = %llm_registry.default_model_id(),
            "LLM registry initialized"
        );
    } else {
        tracing::warn!("No LLM API keys configured. Set ANTHROPIC_API_KEY or LLM_GATEWAY.");
    }

    tracing::info!(
        tz = %config.tz.name(),
        max_steps = config.max_steps,
        timeout_secs = config.request_timeout.as_secs(),
        "Agent configured"
    );

    let port = config.port;
    let state = AppState::new(config, store, llm_registry);

    // Create router
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(cors)
        .layer(compression)
        .layer(TraceLayer::new_for_http());

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Calendar agent listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
