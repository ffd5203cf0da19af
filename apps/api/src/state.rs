use crate::analysis::orchestrator::ResumeAnalyzer;
use crate::chat::session::SessionStore;
use crate::config::Config;
use crate::llm_client::LlmRouter;
use crate::tools::web_search::WebSearch;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub llm: LlmRouter,
    /// Vision-first resume analysis with the OCR fallback wired in.
    pub analyzer: ResumeAnalyzer,
    pub web_search: WebSearch,
    /// Ephemeral chat histories, keyed by session id.
    pub sessions: SessionStore,
}
