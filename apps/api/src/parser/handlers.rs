//! Upload-and-parse handler: multipart file in, structured resume out.

use anyhow::anyhow;
use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::{
    errors::AppError,
    extract::{detect_kind, extract_document},
    parser::pipeline::parse_resume_text,
    response::ApiResponse,
    schema::ParsedResume,
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedUpload {
    pub resume: ParsedResume,
    pub meta: UploadMeta,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadMeta {
    pub filename: String,
    pub format: &'static str,
    pub text_chars: usize,
    pub model: String,
}

/// POST /api/v1/resumes/parse
///
/// Unauthenticated: parsing happens before signup in the product flow.
/// The document never touches disk; extraction and the AI call both run
/// on the in-memory bytes.
pub async fn parse_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ParsedUpload>>, AppError> {
    let mut upload: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("resume").to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
            upload = Some((filename, content_type, bytes));
        }
    }

    let (filename, content_type, bytes) =
        upload.ok_or_else(|| AppError::Validation("A 'file' field is required".to_string()))?;

    let kind = detect_kind(&filename, content_type.as_deref())?;

    // PDF/DOCX parsing is CPU-bound; keep it off the async runtime.
    let task_filename = filename.clone();
    let text = tokio::task::spawn_blocking(move || {
        extract_document(&task_filename, content_type.as_deref(), &bytes)
    })
    .await
    .map_err(|e| anyhow!("extraction task failed: {e}"))??;

    let text_chars = text.len();
    let resume = parse_resume_text(&text, &state.llm).await?;

    info!(
        filename = %filename,
        format = kind.as_str(),
        chars = text_chars,
        "parsed uploaded resume"
    );

    Ok(Json(ApiResponse::ok(ParsedUpload {
        resume,
        meta: UploadMeta {
            filename,
            format: kind.as_str(),
            text_chars,
            model: state.llm.model().to_string(),
        },
    })))
}
