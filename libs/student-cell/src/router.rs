use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::session_middleware;

use crate::handlers;

pub fn student_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/profile", get(handlers::get_profile))
        .route("/grades", get(handlers::get_grades))
        .route("/kardex", get(handlers::get_kardex))
        .route("/schedule", get(handlers::get_schedule))
        .layer(middleware::from_fn_with_state(state.clone(), session_middleware))
        .with_state(state)
}
