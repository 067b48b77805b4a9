//! Registration, login and current-user handlers.

use anyhow::anyhow;
use axum::{extract::State, http::StatusCode, Extension, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    auth::{
        middleware::AuthUser,
        passwords::{hash_password, verify_password},
        tokens::{sign_token, Claims},
    },
    errors::{AppError, FieldError},
    models::user::{generate_public_id, UserPayload, UserRow},
    profile::completeness::compute_completeness,
    resumes::store,
    response::ApiResponse,
    schema::validate::validate_resume,
    state::AppState,
};

pub static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: UserPayload,
}

/// POST /api/v1/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthPayload>>), AppError> {
    let name = body.name.trim().to_string();
    let email = body.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if name.chars().count() < 2 {
        errors.push(FieldError {
            field: "name",
            message: "Name is required",
        });
    }
    if !EMAIL_RE.is_match(&email) {
        errors.push(FieldError {
            field: "email",
            message: "Valid email is required",
        });
    }
    if body.password.len() < 6 {
        errors.push(FieldError {
            field: "password",
            message: "Password must be at least 6 characters",
        });
    }
    if !errors.is_empty() {
        return Err(AppError::FieldValidation(errors));
    }

    let taken = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE email = $1")
        .bind(&email)
        .fetch_one(&state.db)
        .await?;
    if taken > 0 {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    // Argon2 is CPU-bound; keep it off the async runtime.
    let password = body.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| anyhow!("password hashing task failed: {e}"))??;

    let public_id = generate_public_id();
    let completeness = compute_completeness(&name, &email, None).overall as i32;

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (public_id, name, email, password_hash, profile_completeness, last_login_at)
        VALUES ($1, $2, $3, $4, $5, now())
        RETURNING *
        "#,
    )
    .bind(&public_id)
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .bind(completeness)
    .fetch_one(&state.db)
    .await?;

    let token = sign_token(&Claims::for_user(&user), &state.config.jwt_secret)
        .map_err(|e| anyhow!("token signing failed: {e}"))?;

    info!(user_id = %user.public_id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::with_message(
            "Registered successfully",
            AuthPayload {
                token,
                user: UserPayload::from_row(&user),
            },
        )),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthPayload>>, AppError> {
    let email = body.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if !EMAIL_RE.is_match(&email) {
        errors.push(FieldError {
            field: "email",
            message: "Valid email is required",
        });
    }
    if body.password.is_empty() {
        errors.push(FieldError {
            field: "password",
            message: "Password is required",
        });
    }
    if !errors.is_empty() {
        return Err(AppError::FieldValidation(errors));
    }

    // Same 401 whether the account is missing or the password is wrong.
    let Some(user) = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(&state.db)
        .await?
    else {
        return Err(AppError::Unauthorized("Invalid credentials"));
    };

    let password = body.password;
    let stored_hash = user.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| anyhow!("password verify task failed: {e}"))?;
    if !verified {
        return Err(AppError::Unauthorized("Invalid credentials"));
    }

    let user = sqlx::query_as::<_, UserRow>(
        "UPDATE users SET last_login_at = now(), updated_at = now() WHERE id = $1 RETURNING *",
    )
    .bind(user.id)
    .fetch_one(&state.db)
    .await?;

    let token = sign_token(&Claims::for_user(&user), &state.config.jwt_secret)
        .map_err(|e| anyhow!("token signing failed: {e}"))?;

    info!(user_id = %user.public_id, "user logged in");

    Ok(Json(ApiResponse::with_message(
        "Login successful",
        AuthPayload {
            token,
            user: UserPayload::from_row(&user),
        },
    )))
}

/// GET /api/v1/auth/me
///
/// Recomputes profile completeness against the stored resume and persists
/// the result, so the figure stays fresh without a background job.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UserPayload>>, AppError> {
    let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(auth.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let resume = store::find_by_user(&state.db, user.id).await?;
    let parsed = resume.as_ref().map(|row| validate_resume(&row.data));
    let report = compute_completeness(&user.name, &user.email, parsed.as_ref());

    let user = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users SET profile_completeness = $2, resume_count = $3, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(report.overall as i32)
    .bind(if resume.is_some() { 1_i32 } else { 0 })
    .fetch_one(&state.db)
    .await?;

    Ok(Json(ApiResponse::ok(UserPayload::from_row(&user))))
}
