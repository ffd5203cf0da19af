//! Capability Router: text requests go to the text chain with the text model,
//! requests carrying an image go to the vision chain with the vision model.
//!
//! Precondition order (each short-circuits before any network call):
//! credential, backend availability, then for file input: path exists, file readable.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use super::strategy::{run_text_chain, run_vision_chain, GenerativeBackend};
use super::{
    BackendCall, GenerationParams, GenerationRequest, ImagePayload, LlmError, TEXT_MODEL,
    VISION_MAX_OUTPUT_TOKENS, VISION_MODEL,
};

/// Startup configuration for the router. Passed in explicitly; nothing is read
/// from the environment here.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub text_model: String,
    pub vision_model: String,
    pub vision_max_output_tokens: Option<u32>,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            text_model: TEXT_MODEL.to_string(),
            vision_model: VISION_MODEL.to_string(),
            vision_max_output_tokens: Some(VISION_MAX_OUTPUT_TOKENS),
        }
    }
}

#[derive(Clone)]
pub struct LlmRouter {
    settings: Arc<LlmSettings>,
    /// `None` when the HTTP client could not be built at startup.
    backend: Option<Arc<dyn GenerativeBackend>>,
}

impl LlmRouter {
    pub fn new(settings: LlmSettings, backend: Option<Arc<dyn GenerativeBackend>>) -> Self {
        Self {
            settings: Arc::new(settings),
            backend,
        }
    }

    /// Routes a request to the text or vision chain.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, LlmError> {
        let backend = self.backend()?;

        match &request.image {
            None => {
                let call = BackendCall {
                    model: &self.settings.text_model,
                    prompt: &request.prompt,
                    image: None,
                    params: GenerationParams::default(),
                };
                run_text_chain(backend, &call).await
            }
            Some(image) => {
                let params = request.params.unwrap_or(GenerationParams {
                    max_output_tokens: self.settings.vision_max_output_tokens,
                });
                let call = BackendCall {
                    model: &self.settings.vision_model,
                    prompt: &request.prompt,
                    image: Some(image),
                    params,
                };
                run_vision_chain(backend, &call).await
            }
        }
    }

    /// Text-only convenience wrapper.
    pub async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        self.generate(&GenerationRequest::text(prompt)).await
    }

    /// Vision call for an image on disk.
    pub async fn describe_image_file(&self, prompt: &str, path: &Path) -> Result<String, LlmError> {
        self.backend()?;

        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            warn!("Image not found: {}", path.display());
            return Err(LlmError::ResourceNotFound(path.to_path_buf()));
        }

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| LlmError::ResourceUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        info!(
            "Sending {} ({} bytes) to the vision chain",
            path.display(),
            bytes.len()
        );

        let image = ImagePayload::new(bytes, ImagePayload::mime_for_path(path));
        self.generate(&GenerationRequest::vision(prompt, image)).await
    }

    fn backend(&self) -> Result<&dyn GenerativeBackend, LlmError> {
        if self.settings.api_key.as_deref().map_or(true, str::is_empty) {
            return Err(LlmError::ConfigurationMissing);
        }
        self.backend.as_deref().ok_or_else(|| {
            LlmError::DependencyUnavailable("the Gemini HTTP client failed to initialise".to_string())
        })
    }
}
