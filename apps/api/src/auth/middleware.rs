//! Bearer-token middleware for protected routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::{auth::tokens::verify_token, errors::AppError, state::AppState};

/// Authenticated identity, inserted into request extensions once the
/// token checks out.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub public_id: String,
    pub name: String,
    pub email: String,
}

pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token =
        bearer_token(request.headers()).ok_or(AppError::Unauthorized("Unauthorized"))?;
    let claims = verify_token(token, &state.config.jwt_secret)
        .map_err(|_| AppError::Unauthorized("Invalid or expired token"))?;

    request.extensions_mut().insert(AuthUser {
        id: claims.sub,
        public_id: claims.public_id,
        name: claims.name,
        email: claims.email,
    });
    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
