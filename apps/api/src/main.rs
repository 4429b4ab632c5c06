mod analysis;
mod config;
mod errors;
mod llm_client;
mod rebuild;
mod routes;
mod state;
mod upload;
mod views;
mod workflow;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::requester::GeminiAnalyzer;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::rebuild::requester::GeminiRewriter;
use crate::routes::build_router;
use crate::state::AppState;
use crate::workflow::store::SessionStore;

/// How often idle sessions are looked for.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<()> {
    // Fails fast when the model credential is missing
    let config = Config::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},tower_http=info",
                env!("CARGO_CRATE_NAME"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    let llm = LlmClient::new(
        config.gemini_api_key.clone(),
        config.gemini_base_url.clone(),
        config.gemini_model.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    let sessions = SessionStore::new();
    sessions.spawn_sweeper(config.session_ttl, SESSION_SWEEP_INTERVAL);
    info!("Idle sessions expire after {}s", config.session_ttl.as_secs());

    let state = AppState {
        config: config.clone(),
        sessions,
        analyzer: Arc::new(GeminiAnalyzer(llm.clone())),
        rewriter: Arc::new(GeminiRewriter(llm)),
    };
    info!(
        "Theme: {:?}, request body limit: {} bytes",
        config.theme, config.max_request_bytes
    );

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
