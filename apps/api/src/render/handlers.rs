//! HTML rendering endpoint.

use axum::{response::Html, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    errors::AppError,
    render::{render_resume, validate_accent, TemplateKind},
    schema::validate::validate_resume,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub template: TemplateKind,
    pub accent_color: Option<String>,
    pub resume: Value,
}

/// POST /api/v1/render
///
/// Stateless: the caller sends the resume in the body, so drafts can be
/// previewed without saving them first.
pub async fn render_html(Json(body): Json<RenderRequest>) -> Result<Html<String>, AppError> {
    let accent = validate_accent(body.accent_color.as_deref())?;
    let resume = validate_resume(&body.resume);
    let html = render_resume(body.template, &resume, &accent)?;
    Ok(Html(html))
}
