pub mod health;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::auth::middleware::require_auth;
use crate::parser::handlers as parser;
use crate::profile::handlers as profile;
use crate::render::handlers as render;
use crate::resumes::handlers as resumes;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Parsing and rendering stay public: both run before signup in the
    // product flow and touch no stored data.
    let public = Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/resumes/parse", post(parser::parse_upload))
        .route("/api/v1/render", post(render::render_html));

    let protected = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route(
            "/api/v1/resumes",
            post(resumes::save_resume).get(resumes::list_resumes),
        )
        .route(
            "/api/v1/resumes/:id",
            get(resumes::get_resume).delete(resumes::delete_resume),
        )
        .route("/api/v1/profile", get(profile::get_profile))
        .route("/api/v1/analytics", get(profile::get_analytics))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}
