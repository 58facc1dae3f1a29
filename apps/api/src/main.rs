mod config;
mod errors;
mod jobs;
mod llm_client;
mod resume;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::jobs::apify::ApifyClient;
use crate::jobs::JobBoards;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing credentials)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting JobMate API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::gemini(config.gemini_api_key.clone(), &config.gemini_api_base)
        .context("Failed to build Gemini client")?;
    info!("LLM client initialized (Gemini at {})", config.gemini_api_base);
    if config.google_api_key == config.gemini_api_key {
        info!("GOOGLE_API_KEY not set separately; using GEMINI_API_KEY");
    }

    // Initialize Apify client
    let apify = ApifyClient::new(config.apify_token.clone(), &config.apify_api_base)
        .context("Failed to build Apify client")?;
    info!("Apify client initialized");

    let state = AppState {
        llm,
        jobs: JobBoards::new(apify),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
