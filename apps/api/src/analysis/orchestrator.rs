//! Resume analysis: vision first, OCR + text as the fallback.
//!
//! Flow: VISION_ATTEMPT → DONE when the answer looks genuine.
//!       VISION_ATTEMPT → OCR_ATTEMPT → DONE when every vision strategy failed
//!       or the answer matches a failure signature.
//!
//! Vision precondition errors (missing key, no client, missing or unreadable
//! file) are returned as-is without touching OCR.
//!
//! Failure signatures are a case-insensitive substring heuristic ("quota",
//! "429", "vision"). The Gemini endpoints do not give a distinguishable quota
//! error on every contract, so a genuine answer that mentions "vision" also
//! triggers the fallback. That is a known limitation.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::analysis::ocr::{extract_pdf_text, RecognitionError, TextRecognizer};
use crate::analysis::prompts::{build_resume_text_prompt, RESUME_VISION_PROMPT};
use crate::llm_client::{LlmError, LlmRouter};

const FAILURE_SIGNATURES: [&str; 3] = ["quota", "429", "vision"];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("OCR error: {0}")]
    RecognitionFailed(#[source] RecognitionError),

    #[error("OCR returned no text. Try a clearer image or a PDF export.")]
    RecognitionEmpty,

    #[error("Unsupported resume file '{0}'. Upload a PNG, JPG or PDF.")]
    UnsupportedDocument(String),

    #[error(transparent)]
    Llm(#[from] LlmError),
}

impl AnalysisError {
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::RecognitionFailed(_) => "recognition_failed",
            AnalysisError::RecognitionEmpty => "recognition_empty",
            AnalysisError::UnsupportedDocument(_) => "unsupported_document",
            AnalysisError::Llm(e) => e.kind(),
        }
    }
}

/// What kind of resume file was uploaded, from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self, AnalysisError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("png") | Some("jpg") | Some("jpeg") => Ok(DocumentKind::Image),
            Some("pdf") => Ok(DocumentKind::Pdf),
            _ => Err(AnalysisError::UnsupportedDocument(
                path.file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )),
        }
    }
}

/// True when a vision answer looks like a quota or capability failure.
pub fn matches_failure_signature(text: &str) -> bool {
    let lower = text.to_lowercase();
    FAILURE_SIGNATURES.iter().any(|sig| lower.contains(sig))
}

#[derive(Clone)]
pub struct ResumeAnalyzer {
    llm: LlmRouter,
    recognizer: Arc<dyn TextRecognizer>,
}

impl ResumeAnalyzer {
    pub fn new(llm: LlmRouter, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self { llm, recognizer }
    }

    /// Analyzes an uploaded resume. PDFs skip the vision attempt and use
    /// their embedded text directly.
    pub async fn analyze_document(&self, path: &Path) -> Result<String, AnalysisError> {
        match DocumentKind::from_path(path)? {
            DocumentKind::Image => self.analyze_image(path).await,
            DocumentKind::Pdf => {
                let text = extract_pdf_text(path)
                    .await
                    .map_err(AnalysisError::RecognitionFailed)?;
                self.analyze_text(&text).await
            }
        }
    }

    /// Vision attempt, then OCR fallback.
    pub async fn analyze_image(&self, path: &Path) -> Result<String, AnalysisError> {
        match self
            .llm
            .describe_image_file(RESUME_VISION_PROMPT, path)
            .await
        {
            Ok(text) if !matches_failure_signature(&text) => {
                info!("Vision analysis succeeded for {}", path.display());
                return Ok(text);
            }
            Ok(_) => info!("Vision answer matched a failure signature; falling back to OCR"),
            Err(e @ LlmError::AllStrategiesExhausted { .. }) => {
                warn!("Vision analysis failed ({}); falling back to OCR", e.kind())
            }
            // Precondition failures go straight back to the user.
            Err(e) => return Err(e.into()),
        }

        let text = self
            .recognizer
            .recognize(path)
            .await
            .map_err(AnalysisError::RecognitionFailed)?;
        self.analyze_text(&text).await
    }

    /// Text capability over already-extracted resume text. The text call's
    /// outcome is final either way.
    async fn analyze_text(&self, resume_text: &str) -> Result<String, AnalysisError> {
        if resume_text.trim().is_empty() {
            return Err(AnalysisError::RecognitionEmpty);
        }

        info!(
            "Analyzing {} characters of extracted resume text",
            resume_text.len()
        );
        let prompt = build_resume_text_prompt(resume_text);
        Ok(self.llm.generate_text(&prompt).await?)
    }
}
