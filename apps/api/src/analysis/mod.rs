// Resume Analyzer
// Implements: upload handling, vision-first analysis, OCR / PDF text fallback.
// All model calls go through llm_client; OCR goes through the TextRecognizer seam.

pub mod handlers;
pub mod ocr;
pub mod orchestrator;
pub mod prompts;
