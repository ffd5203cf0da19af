//! Axum route handler for the Resume Analyzer.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::orchestrator::DocumentKind;
use crate::errors::AppError;
use crate::models::reply::TextReply;
use crate::state::AppState;

/// Upload size cap for the analyze route.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const FILE_FIELD: &str = "file";

/// POST /api/v1/resume/analyze
///
/// Multipart upload with a `file` field (png, jpg, jpeg or pdf). The file is
/// saved under the upload directory, analyzed from disk, then removed.
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<TextReply>, AppError> {
    let (file_name, bytes) = read_file_field(&mut multipart).await?;

    DocumentKind::from_path(Path::new(&file_name))
        .map_err(|e| AppError::Validation(e.to_string()))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("uploaded file is empty".to_string()));
    }

    let saved = save_upload(&state.config.upload_dir, &file_name, &bytes).await?;
    info!("Saved resume upload to {}", saved.display());

    let reply: TextReply = state.analyzer.analyze_document(&saved).await.into();
    discard_upload(&saved).await;
    Ok(Json(reply))
}

/// Uploads only live for the duration of one analysis.
async fn discard_upload(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!("Failed to remove upload {}: {e}", path.display());
    }
}

async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("file field has no file name".to_string()))?;
        let bytes = field.bytes().await?;
        return Ok((file_name, bytes));
    }
    Err(AppError::Validation(format!(
        "multipart body has no '{FILE_FIELD}' field"
    )))
}

async fn save_upload(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", dir.display()))?;

    let path = dir.join(format!("{}-{}", Uuid::new_v4(), sanitize_file_name(file_name)));
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to save upload to {}", path.display()))?;
    Ok(path)
}

/// Keeps only the final path component and a conservative character set.
fn sanitize_file_name(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
