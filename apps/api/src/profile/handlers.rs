//! Profile and analytics handlers.

use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    auth::middleware::AuthUser,
    errors::AppError,
    models::{
        resume::TaggedCount,
        user::{ProfileInfo, UserRow},
    },
    profile::completeness::{compute_completeness, next_steps, NextStep, SectionCompletion},
    response::ApiResponse,
    resumes::store,
    schema::validate::validate_resume,
    state::AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileData {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub profile_info: ProfileInfo,
    pub has_resume: bool,
    pub completion_breakdown: Vec<SectionCompletion>,
    pub next_steps: Vec<NextStep>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub user_stats: UserStats,
    pub global_stats: GlobalStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub user_id: String,
    pub resume_count: i32,
    pub has_resume: bool,
    pub profile_completeness: i32,
    pub joined_date: DateTime<Utc>,
    pub last_login_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalStats {
    pub total_users: i64,
    pub total_resumes: i64,
    pub resumes_this_month: i64,
    pub top_skills: Vec<TaggedCount>,
    pub top_companies: Vec<TaggedCount>,
}

/// GET /api/v1/profile
///
/// Full checklist view: account fields, per-section completion and the
/// suggested next steps. The recomputed overall score is persisted.
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<ProfileData>>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let resume = store::find_by_user(&state.db, user.id).await?;
    let parsed = resume.as_ref().map(|row| validate_resume(&row.data));
    let report = compute_completeness(&user.name, &user.email, parsed.as_ref());
    let steps = next_steps(&report);

    let user = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET profile_completeness = $2, updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .bind(report.overall as i32)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ApiResponse::ok(ProfileData {
        user_id: user.public_id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        profile_info: ProfileInfo {
            joined_date: user.created_at,
            last_login_date: user.last_login_at,
            resume_count: user.resume_count,
            profile_completeness: user.profile_completeness,
        },
        has_resume: resume.is_some(),
        completion_breakdown: report.sections,
        next_steps: steps,
    })))
}

/// GET /api/v1/analytics
pub async fn get_analytics(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<AnalyticsData>>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let has_resume = store::exists_for_user(&state.db, user.id).await?;

    let total_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db)
        .await?;
    let total_resumes = store::count_all(&state.db).await?;
    let resumes_this_month = store::count_this_month(&state.db).await?;
    let top_skills = store::top_skills(&state.db, 10).await?;
    let top_companies = store::top_companies(&state.db, 10).await?;

    Ok(Json(ApiResponse::ok(AnalyticsData {
        user_stats: UserStats {
            user_id: user.public_id,
            resume_count: user.resume_count,
            has_resume,
            profile_completeness: user.profile_completeness,
            joined_date: user.created_at,
            last_login_date: user.last_login_at,
        },
        global_stats: GlobalStats {
            total_users,
            total_resumes,
            resumes_this_month,
            top_skills,
            top_companies,
        },
    })))
}
