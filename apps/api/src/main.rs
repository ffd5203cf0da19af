mod analysis;
mod chat;
mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;
mod tools;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::ocr::TesseractRecognizer;
use crate::analysis::orchestrator::ResumeAnalyzer;
use crate::chat::session::SessionStore;
use crate::config::Config;
use crate::llm_client::{GeminiClient, GenerativeBackend, LlmRouter};
use crate::routes::build_router;
use crate::state::AppState;
use crate::tools::web_search::WebSearch;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Gemini backend adapter
    let backend = build_backend(&config);
    let llm = LlmRouter::new(config.llm_settings(), backend);
    info!(
        "LLM router initialized (text: {}, vision: {}, strategies: {:?})",
        config.text_model, config.vision_model, config.strategies
    );

    // Initialize OCR fallback
    let recognizer = Arc::new(TesseractRecognizer::new(config.tesseract_bin.clone()));
    let analyzer = ResumeAnalyzer::new(llm.clone(), recognizer);

    let web_search = WebSearch::new(&config.web_search_url, config.web_search_timeout)?;

    // Build app state
    let state = AppState {
        config: config.clone(),
        llm,
        analyzer,
        web_search,
        sessions: SessionStore::new(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Builds the HTTP adapter. Returns `None` when there is no credential or the
/// client cannot be constructed; the router reports either case per request.
fn build_backend(config: &Config) -> Option<Arc<dyn GenerativeBackend>> {
    let Some(api_key) = config.gemini_api_key.clone() else {
        warn!("GEMINI_API_KEY is not set; model-backed endpoints will return a configuration message");
        return None;
    };

    match GeminiClient::new(
        api_key,
        &config.gemini_base_url,
        config.gemini_timeout,
        &config.strategies,
    ) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!("Failed to build Gemini HTTP client: {e}");
            None
        }
    }
}
