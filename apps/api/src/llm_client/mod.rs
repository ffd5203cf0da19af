/// LLM Client — the single point of entry for all Gemini calls in Coach.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions go through `LlmRouter`, which picks the capability
/// (text or vision) and walks the matching strategy chain.
///
/// Every public operation returns `Result<String, LlmError>`; nothing here
/// panics or leaks a transport error to the caller.
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub mod extractor;
pub mod prompts;
pub mod router;
pub mod strategy;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use router::{LlmRouter, LlmSettings};
pub use strategy::{GenerativeBackend, Strategy};

use extractor::RawResponse;
use types::{GenerateContentRequest, GenerateTextRequest, GoogleError, ResponsesRequest};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const TEXT_MODEL: &str = "models/gemini-2.5-flash";
pub const VISION_MODEL: &str = "models/gemini-2.5-flash-image";
pub const VISION_MAX_OUTPUT_TOKENS: u32 = 600;

/// Substrings in a 400 body that mean "you sent a field I don't know".
const PARAMETER_REJECTION_MARKERS: [&str; 4] = [
    "unknown name",
    "maxoutputtokens",
    "max_output_tokens",
    "generationconfig",
];

/// Caller-facing failures. `Display` is the sentence shown to the user.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Gemini API key not set. Put GEMINI_API_KEY in your .env")]
    ConfigurationMissing,

    #[error("Gemini client unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Resume image not found: {}", .0.display())]
    ResourceNotFound(PathBuf),

    #[error("Could not read image file {}: {source}", .path.display())]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "Gemini Error (vision): all image methods failed.\n\
         Possible causes: API contract mismatch, model not supporting image input, or quota.\n\
         Last error: {last_error}\n\n\
         If this persists, try upgrading Coach to a release that speaks the current Gemini API,\n\
         or adjust GEMINI_STRATEGIES, then restart the service and try again."
    )]
    AllStrategiesExhausted { last_error: String },

    #[error("Gemini Error: {0}")]
    BackendCallFailed(String),
}

impl LlmError {
    /// Stable machine-readable tag for API consumers.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::ConfigurationMissing => "configuration_missing",
            LlmError::DependencyUnavailable(_) => "dependency_unavailable",
            LlmError::ResourceNotFound(_) => "resource_not_found",
            LlmError::ResourceUnreadable { .. } => "resource_unreadable",
            LlmError::AllStrategiesExhausted { .. } => "all_strategies_exhausted",
            LlmError::BackendCallFailed(_) => "backend_call_failed",
        }
    }
}

/// Failure of a single strategy call. Handled inside the chain, never surfaced.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The contract refused an optional parameter; retry without it.
    #[error("parameter rejected: {0}")]
    Rejected(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// An in-memory image with its MIME type.
#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Bytes,
    pub mime_type: String,
}

impl ImagePayload {
    pub fn new(bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }

    /// MIME type from the file extension, `image/png` when unknown.
    pub fn mime_for_path(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg") | Some("jpeg") => "image/jpeg",
            Some("webp") => "image/webp",
            Some("gif") => "image/gif",
            _ => "image/png",
        }
    }
}

/// Optional generation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationParams {
    pub max_output_tokens: Option<u32>,
}

impl GenerationParams {
    pub fn is_set(&self) -> bool {
        self.max_output_tokens.is_some()
    }
}

/// A caller's request. Routed by whether it carries an image.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub image: Option<ImagePayload>,
    /// `None` means "use the capability default".
    pub params: Option<GenerationParams>,
}

impl GenerationRequest {
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            image: None,
            params: None,
        }
    }

    pub fn vision(prompt: impl Into<String>, image: ImagePayload) -> Self {
        Self {
            prompt: prompt.into(),
            image: Some(image),
            params: None,
        }
    }
}

/// Borrowed view of one strategy call.
#[derive(Debug, Clone, Copy)]
pub struct BackendCall<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    pub image: Option<&'a ImagePayload>,
    pub params: GenerationParams,
}

impl<'a> BackendCall<'a> {
    pub fn without_parameters(&self) -> Self {
        Self {
            params: GenerationParams::default(),
            ..*self
        }
    }
}

/// HTTP adapter for the Gemini API. The text capability always uses the
/// model-instance contract; the vision chain uses the [`Strategy`] contracts
/// the client was built with.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    strategies: Vec<Strategy>,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        base_url: &str,
        timeout: Duration,
        strategies: &[Strategy],
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            strategies: Strategy::in_priority_order(strategies),
        })
    }

    fn request_for(&self, strategy: Strategy, call: &BackendCall<'_>) -> reqwest::RequestBuilder {
        let max_output_tokens = call.params.max_output_tokens;
        match strategy {
            Strategy::ModelInstance => self
                .client
                .post(format!(
                    "{}/v1beta/{}:generateContent",
                    self.base_url, call.model
                ))
                .header("x-goog-api-key", &self.api_key)
                .json(&GenerateContentRequest::new(
                    call.prompt,
                    call.image,
                    max_output_tokens,
                )),
            Strategy::Responses => self
                .client
                .post(format!("{}/v1beta/openai/responses", self.base_url))
                .bearer_auth(&self.api_key)
                .json(&ResponsesRequest::new(
                    call.model,
                    call.prompt,
                    call.image,
                    max_output_tokens,
                )),
            Strategy::LegacyGenerateText => self
                .client
                .post(format!(
                    "{}/v1beta2/{}:generateText",
                    self.base_url, call.model
                ))
                .query(&[("key", self.api_key.as_str())])
                .json(&GenerateTextRequest::new(
                    call.prompt,
                    call.image,
                    max_output_tokens,
                )),
        }
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    fn supports(&self, strategy: Strategy) -> bool {
        self.strategies.contains(&strategy)
    }

    async fn invoke(
        &self,
        strategy: Strategy,
        call: &BackendCall<'_>,
    ) -> Result<RawResponse, BackendError> {
        let response = self.request_for(strategy, call).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(classify_failure(status, body, call.params.is_set()));
        }

        debug!("{strategy} returned {} bytes", body.len());
        Ok(success_body(body))
    }
}

/// A 2xx body is a success whatever its shape; non-JSON text is kept as a
/// string for the extractor to dump.
fn success_body(body: String) -> RawResponse {
    if body.trim().is_empty() {
        return RawResponse::empty();
    }
    match serde_json::from_str(&body) {
        Ok(value) => RawResponse::new(value),
        Err(_) => RawResponse::new(Value::String(body)),
    }
}

/// Maps a non-2xx response to a `BackendError`. A 400 naming an unknown field
/// while optional parameters were sent is a parameter rejection.
fn classify_failure(status: StatusCode, body: String, sent_parameters: bool) -> BackendError {
    let message = serde_json::from_str::<GoogleError>(&body)
        .map(|e| match e.error.status {
            Some(code) => format!("{code}: {}", e.error.message),
            None => e.error.message,
        })
        .unwrap_or(body);

    if status == StatusCode::BAD_REQUEST && sent_parameters && is_parameter_rejection(&message) {
        return BackendError::Rejected(message);
    }

    BackendError::Api {
        status: status.as_u16(),
        message,
    }
}

fn is_parameter_rejection(message: &str) -> bool {
    let lower = message.to_lowercase();
    PARAMETER_REJECTION_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNKNOWN_FIELD: &str = r#"{"error":{"code":400,"message":"Invalid JSON payload received. Unknown name \"maxOutputTokens\": Cannot find field.","status":"INVALID_ARGUMENT"}}"#;

    #[test]
    fn test_unknown_field_with_parameters_is_rejection() {
        let err = classify_failure(StatusCode::BAD_REQUEST, UNKNOWN_FIELD.to_string(), true);
        assert!(matches!(err, BackendError::Rejected(ref m) if m.contains("INVALID_ARGUMENT")));
    }

    #[test]
    fn test_unknown_field_without_parameters_is_plain_failure() {
        let err = classify_failure(StatusCode::BAD_REQUEST, UNKNOWN_FIELD.to_string(), false);
        assert!(matches!(err, BackendError::Api { status: 400, .. }));
    }

    #[test]
    fn test_quota_error_keeps_status_and_message() {
        let body = r#"{"error":{"code":429,"message":"You exceeded your current quota","status":"RESOURCE_EXHAUSTED"}}"#;
        let err = classify_failure(StatusCode::TOO_MANY_REQUESTS, body.to_string(), true);
        let text = err.to_string();
        assert!(text.contains("429"));
        assert!(text.contains("quota"));
    }

    #[test]
    fn test_non_json_error_body_is_kept_verbatim() {
        let err = classify_failure(StatusCode::NOT_FOUND, "Not Found".to_string(), false);
        assert_eq!(err.to_string(), "API error (status 404): Not Found");
    }

    #[test]
    fn test_non_json_success_body_is_kept_as_text() {
        let raw = success_body("  plain answer\n".to_string());
        assert_eq!(raw, RawResponse::new(Value::String("  plain answer\n".to_string())));
        assert_eq!(extractor::extract_text(&raw), "plain answer");
        assert_eq!(success_body(" ".to_string()), RawResponse::empty());
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(ImagePayload::mime_for_path(Path::new("cv.JPG")), "image/jpeg");
        assert_eq!(ImagePayload::mime_for_path(Path::new("cv.jpeg")), "image/jpeg");
        assert_eq!(ImagePayload::mime_for_path(Path::new("cv.png")), "image/png");
        assert_eq!(ImagePayload::mime_for_path(Path::new("cv")), "image/png");
    }

    #[test]
    fn test_without_parameters_keeps_everything_else() {
        let image = ImagePayload::new(Bytes::from_static(b"x"), "image/png");
        let call = BackendCall {
            model: "m",
            prompt: "p",
            image: Some(&image),
            params: GenerationParams {
                max_output_tokens: Some(10),
            },
        };
        let stripped = call.without_parameters();
        assert_eq!(stripped.model, "m");
        assert_eq!(stripped.prompt, "p");
        assert!(stripped.image.is_some());
        assert!(!stripped.params.is_set());
    }

    #[test]
    fn test_gemini_client_supports_only_enabled_strategies() {
        let client = GeminiClient::new(
            "key".to_string(),
            "http://localhost:1/",
            Duration::from_secs(1),
            &[Strategy::Responses],
        )
        .unwrap();
        assert!(client.supports(Strategy::Responses));
        assert!(!client.supports(Strategy::ModelInstance));
        assert_eq!(client.base_url, "http://localhost:1");
    }
}
