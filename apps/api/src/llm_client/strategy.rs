//! Invocation Strategy Chain: the closed set of backend call contracts and the
//! loops that walk them.
//!
//! The text chain performs exactly one `ModelInstance` call without optional
//! parameters. The vision chain walks [`Strategy::PRIORITY`], skipping contracts
//! the backend does not offer, and stops at the first call that reaches the
//! extractor. A parameter rejection retries the same contract once without the
//! optional parameter; any other failure is recorded and the chain advances.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::extractor::{extract_text, RawResponse};
use super::{BackendCall, BackendError, LlmError};

/// One known backend call contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// `{model}:generateContent` on a model-bound endpoint.
    ModelInstance,
    /// The `responses` free-function surface.
    Responses,
    /// The older `{model}:generateText` surface.
    LegacyGenerateText,
}

impl Strategy {
    /// Fixed attempt order for the vision chain.
    pub const PRIORITY: [Strategy; 3] = [
        Strategy::ModelInstance,
        Strategy::Responses,
        Strategy::LegacyGenerateText,
    ];

    /// Name used in `GEMINI_STRATEGIES`.
    pub fn config_name(self) -> &'static str {
        match self {
            Strategy::ModelInstance => "model_instance",
            Strategy::Responses => "responses",
            Strategy::LegacyGenerateText => "legacy_generate_text",
        }
    }

    /// Human label used in diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            Strategy::ModelInstance => "model instance generate_content",
            Strategy::Responses => "responses.generate",
            Strategy::LegacyGenerateText => "generate_text",
        }
    }

    /// Deduplicates `enabled` and returns it in priority order.
    pub fn in_priority_order(enabled: &[Strategy]) -> Vec<Strategy> {
        Self::PRIORITY
            .into_iter()
            .filter(|s| enabled.contains(s))
            .collect()
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_name())
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PRIORITY
            .into_iter()
            .find(|strategy| strategy.config_name() == s.trim())
            .ok_or_else(|| {
                format!(
                    "unknown strategy '{}' (expected one of: model_instance, responses, legacy_generate_text)",
                    s.trim()
                )
            })
    }
}

/// A backend adapter that speaks one or more of the [`Strategy`] contracts.
///
/// Carried by the router as `Arc<dyn GenerativeBackend>` so tests can swap in a
/// recording fake.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Whether the vision chain may use `strategy`. Unsupported contracts are
    /// skipped without counting as an attempt. The text chain ignores this.
    fn supports(&self, strategy: Strategy) -> bool;

    async fn invoke(
        &self,
        strategy: Strategy,
        call: &BackendCall<'_>,
    ) -> Result<RawResponse, BackendError>;
}

/// Text capability: one `ModelInstance` call, no optional parameters.
/// `supports` is not consulted; it only gates the vision chain.
pub async fn run_text_chain(
    backend: &dyn GenerativeBackend,
    call: &BackendCall<'_>,
) -> Result<String, LlmError> {
    let call = call.without_parameters();
    debug!("Text call: model={}", call.model);

    match backend.invoke(Strategy::ModelInstance, &call).await {
        Ok(raw) => Ok(extract_text(&raw)),
        Err(e) => {
            warn!("Text call failed: {e}");
            Err(LlmError::BackendCallFailed(e.to_string()))
        }
    }
}

/// Vision capability: walks every supported strategy until one succeeds.
pub async fn run_vision_chain(
    backend: &dyn GenerativeBackend,
    call: &BackendCall<'_>,
) -> Result<String, LlmError> {
    let mut last_error: Option<String> = None;

    for strategy in Strategy::PRIORITY {
        if !backend.supports(strategy) {
            debug!("Backend does not offer {strategy}; skipping");
            continue;
        }

        match attempt(backend, strategy, call).await {
            Ok(raw) => {
                info!("Vision call succeeded via {strategy}");
                return Ok(extract_text(&raw));
            }
            Err(e) => {
                warn!("Vision strategy {strategy} failed: {e}");
                last_error = Some(format!("{} error: {e}", strategy.label()));
            }
        }
    }

    Err(LlmError::AllStrategiesExhausted {
        last_error: last_error
            .unwrap_or_else(|| "no supported invocation strategy is enabled".to_string()),
    })
}

/// One strategy, with the parameter-rejection retry.
async fn attempt(
    backend: &dyn GenerativeBackend,
    strategy: Strategy,
    call: &BackendCall<'_>,
) -> Result<RawResponse, BackendError> {
    match backend.invoke(strategy, call).await {
        Err(BackendError::Rejected(reason)) if call.params.is_set() => {
            info!("{strategy} rejected optional parameters ({reason}); retrying without them");
            backend.invoke(strategy, &call.without_parameters()).await
        }
        other => other,
    }
}
