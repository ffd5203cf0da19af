//! OCR boundary: turns a resume image (or PDF) into plain text.
//!
//! `AppState` carries an `Arc<dyn TextRecognizer>`; the default is the
//! `tesseract` executable, driven as a child process.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("cannot identify image file: {0}")]
    Decode(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{binary} exited with {status}: {stderr}")]
    Engine {
        binary: String,
        status: String,
        stderr: String,
    },

    #[error("PDF text extraction failed: {0}")]
    Pdf(String),

    #[error("OCR worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image_path: &Path) -> Result<String, RecognitionError>;
}

/// Runs `tesseract <image> stdout` on a grayscale copy of the image.
pub struct TesseractRecognizer {
    binary: String,
}

impl TesseractRecognizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image_path: &Path) -> Result<String, RecognitionError> {
        let path = image_path.to_path_buf();
        // Decoding is CPU-bound.
        let prepared = tokio::task::spawn_blocking(move || prepare_image(&path)).await??;

        let output = Command::new(&self.binary)
            .arg(prepared.path())
            .arg("stdout")
            .output()
            .await?;

        if !output.status.success() {
            return Err(RecognitionError::Engine {
                binary: self.binary.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let text = String::from_utf8_lossy(&output.stdout).into_owned();
        debug!(
            "OCR recognised {} characters from {}",
            text.len(),
            image_path.display()
        );
        Ok(text)
    }
}

/// Decodes the image and writes a grayscale PNG copy for the OCR engine.
fn prepare_image(path: &Path) -> Result<NamedTempFile, RecognitionError> {
    let gray = image::open(path)?.to_luma8();
    let file = tempfile::Builder::new()
        .prefix("coach-ocr-")
        .suffix(".png")
        .tempfile()?;
    gray.save_with_format(file.path(), image::ImageFormat::Png)?;
    Ok(file)
}

/// Extracts the embedded text layer of a PDF.
pub async fn extract_pdf_text(path: &Path) -> Result<String, RecognitionError> {
    let bytes = tokio::fs::read(path).await?;
    let source: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
            RecognitionError::Pdf(format!("{}: {e}", source.display()))
        })
    })
    .await?
}
