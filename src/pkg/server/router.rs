use axum::middleware::from_fn_with_state;
use axum::routing::{post, put};
use axum::{Router, routing::get};

use super::handlers;
use super::handlers::auth::{forgot_password, login, logout, reset_password, signup};
use super::handlers::probes::{healthz, livez};
use super::middlewares::authn;
use super::state::AppState;
use crate::prelude::Result;

pub async fn build_routes() -> Result<Router> {
    let state = AppState::new().await?;
    let app = Router::new()
        .route("/jobs", get(handlers::jobs::list).post(handlers::jobs::create))
        .route("/jobs/search", get(handlers::jobs::search))
        .route(
            "/jobs/{id}",
            get(handlers::jobs::retrieve)
                .put(handlers::jobs::update)
                .delete(handlers::jobs::remove),
        )
        .route("/jobs/{id}/status", put(handlers::jobs::set_status))
        .route(
            "/jobs/{id}/applications",
            get(handlers::applications::list_for_job),
        )
        .route(
            "/students/{id}/applications",
            get(handlers::applications::list_for_student),
        )
        .route("/applications", post(handlers::applications::apply))
        .route("/logout", post(logout))
        .layer(from_fn_with_state(state.clone(), authn::authenticate))
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/password/forgot", post(forgot_password))
        .route("/password/reset", post(reset_password))
        .route("/colleges", get(handlers::colleges::list))
        .route("/stats/recent-job", get(handlers::stats::recent_job))
        .route("/stats/employer-count", get(handlers::stats::employer_count))
        .route("/healthz", get(healthz))
        .route("/livez", get(livez))
        .with_state(state);

    Ok(app)
}
