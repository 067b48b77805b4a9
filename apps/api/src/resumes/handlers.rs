//! Resume CRUD handlers. All routes here sit behind the auth middleware.

use std::net::SocketAddr;

use anyhow::anyhow;
use axum::{
    extract::{ConnectInfo, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{handlers::EMAIL_RE, middleware::AuthUser},
    errors::{AppError, FieldError},
    models::resume::ResumeSummary,
    profile::completeness::{compute_completeness, CompletenessReport},
    response::{ApiResponse, Pagination},
    resumes::store::{self, SaveParams},
    schema::{validate::validate_resume, ParsedResume},
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedResume {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    pub is_update: bool,
    pub profile_completeness: CompletenessReport,
}

/// Full stored document: the parsed fields flattened next to row metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDetail {
    pub id: Uuid,
    #[serde(flatten)]
    pub resume: ParsedResume,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResume {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

/// POST /api/v1/resumes
///
/// Accepts arbitrary JSON, coerces it through the schema validator, and
/// upserts the caller's single stored resume. The response reports whether
/// an existing document was replaced and the recomputed completeness.
pub async fn save_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<ApiResponse<SavedResume>>), AppError> {
    let source = match body.get("source").and_then(Value::as_str) {
        None => "upload",
        Some(s) if s == "upload" || s == "manual" => s,
        Some(_) => {
            return Err(AppError::FieldValidation(vec![FieldError {
                field: "source",
                message: "Source must be 'upload' or 'manual'",
            }]))
        }
    }
    .to_string();

    let mut resume = validate_resume(&body);
    resume.personal_info.email = resume.personal_info.email.to_lowercase();

    let name = resume.personal_info.name.clone();
    let email = resume.personal_info.email.clone();

    let mut errors = Vec::new();
    let name_chars = name.chars().count();
    if name.is_empty() {
        errors.push(FieldError {
            field: "personalInfo.name",
            message: "Name is required",
        });
    } else if !(2..=100).contains(&name_chars) {
        errors.push(FieldError {
            field: "personalInfo.name",
            message: "Name must be between 2 and 100 characters",
        });
    }
    if !EMAIL_RE.is_match(&email) {
        errors.push(FieldError {
            field: "personalInfo.email",
            message: "Valid email is required",
        });
    }
    if !errors.is_empty() {
        return Err(AppError::FieldValidation(errors));
    }

    let ip = client_ip(&headers, addr);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let data = serde_json::to_value(&resume).map_err(|e| anyhow!("serializing resume: {e}"))?;

    let is_update = store::exists_for_user(&state.db, auth.id).await?;
    let saved = store::upsert(
        &state.db,
        SaveParams {
            user_id: auth.id,
            name: &name,
            email: &email,
            data: &data,
            source: &source,
            ip_address: Some(ip.as_str()),
            user_agent: user_agent.as_deref(),
        },
    )
    .await?;

    let report = compute_completeness(&auth.name, &auth.email, Some(&resume));
    sqlx::query(
        "UPDATE users SET resume_count = 1, profile_completeness = $2, updated_at = now() WHERE id = $1",
    )
    .bind(auth.id)
    .bind(report.overall as i32)
    .execute(&state.db)
    .await?;

    info!(user_id = %auth.public_id, is_update, "resume saved");

    let (status, message) = if is_update {
        (StatusCode::OK, "Resume updated successfully")
    } else {
        (StatusCode::CREATED, "Resume saved successfully")
    };

    let payload = SavedResume {
        id: saved.id,
        email: saved.email,
        name: saved.name,
        created_at: (!is_update).then_some(saved.created_at),
        updated_at: is_update.then_some(saved.updated_at),
        is_update,
        profile_completeness: report,
    };

    Ok((status, Json(ApiResponse::with_message(message, payload))))
}

/// GET /api/v1/resumes
pub async fn list_resumes(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ApiResponse<Vec<ResumeSummary>>>, AppError> {
    let page = match query.page {
        Some(p) if p > 0 => p,
        _ => 1,
    };
    let limit = match query.limit {
        Some(l) if l > 0 => l,
        _ => 10,
    };
    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let (resumes, total) = store::list(&state.db, auth.id, page, limit, search).await?;

    Ok(Json(ApiResponse::paginated(
        resumes,
        Pagination::new(page, limit, total),
    )))
}

/// GET /api/v1/resumes/:id
pub async fn get_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ResumeDetail>>, AppError> {
    let id = parse_resume_id(&id)?;
    let row = store::find_owned(&state.db, id, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    Ok(Json(ApiResponse::ok(ResumeDetail {
        id: row.id,
        resume: validate_resume(&row.data),
        source: row.source,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })))
}

/// DELETE /api/v1/resumes/:id
pub async fn delete_resume(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeletedResume>>, AppError> {
    let id = parse_resume_id(&id)?;
    let deleted = store::delete_owned(&state.db, id, auth.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    // The profile score drops back to whatever name + email alone earn.
    let report = compute_completeness(&auth.name, &auth.email, None);
    sqlx::query(
        "UPDATE users SET resume_count = 0, profile_completeness = $2, updated_at = now() WHERE id = $1",
    )
    .bind(auth.id)
    .bind(report.overall as i32)
    .execute(&state.db)
    .await?;

    info!(user_id = %auth.public_id, resume_id = %id, "resume deleted");

    Ok(Json(ApiResponse::with_message(
        "Resume deleted successfully",
        DeletedResume {
            id: deleted.id,
            name: deleted.name,
            email: deleted.email,
        },
    )))
}

fn parse_resume_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::Validation("Invalid resume ID".to_string()))
}

/// Prefers the first X-Forwarded-For hop, falling back to the socket peer.
fn client_ip(headers: &HeaderMap, addr: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| addr.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn local_addr() -> SocketAddr {
        "127.0.0.1:9000".parse().unwrap()
    }

    #[test]
    fn test_client_ip_prefers_forwarded_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(client_ip(&headers, local_addr()), "203.0.113.7");
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        assert_eq!(client_ip(&HeaderMap::new(), local_addr()), "127.0.0.1");

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_ip(&headers, local_addr()), "127.0.0.1");
    }

    #[test]
    fn test_parse_resume_id_rejects_garbage() {
        assert!(parse_resume_id("not-a-uuid").is_err());
        assert!(parse_resume_id("123").is_err());

        let id = Uuid::new_v4();
        assert_eq!(parse_resume_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_detail_flattens_resume_fields() {
        let detail = ResumeDetail {
            id: Uuid::new_v4(),
            resume: ParsedResume::default(),
            source: "upload".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert!(json.get("personalInfo").is_some());
        assert!(json.get("skills").is_some());
        assert!(json.get("resume").is_none());
    }
}
