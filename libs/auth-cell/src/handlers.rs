use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::HeaderMap,
};
use serde_json::{json, Value};
use tracing::{debug, info};

use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, SessionStatus};
use shared_models::error::AppError;
use shared_utils::extractor::{clear_session_cookie, session_cookie, session_from_headers, with_cookie};

use crate::services::LoginService;

#[axum::debug_handler]
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<Value>), AppError> {
    let service = LoginService::new(&config);

    let outcome = service.login(&request).await?;
    let cookie = session_cookie(&config, &outcome.session.token)?;

    info!("Login succeeded, session stored");

    Ok((
        with_cookie(HeaderMap::new(), cookie),
        Json(json!({
            "success": true,
            "expires_at": outcome.session.expires_at,
            "user": outcome.user,
        })),
    ))
}

#[axum::debug_handler]
pub async fn logout(
    State(config): State<Arc<AppConfig>>,
) -> (HeaderMap, Json<Value>) {
    debug!("Clearing session cookie");

    (
        with_cookie(HeaderMap::new(), clear_session_cookie(&config)),
        Json(json!({ "success": true })),
    )
}

#[axum::debug_handler]
pub async fn session_status(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Json<SessionStatus> {
    let status = match session_from_headers(&headers, &config.session_cookie_name) {
        Ok(session) => SessionStatus {
            authenticated: true,
            expires_at: session.expires_at,
        },
        Err(_) => SessionStatus {
            authenticated: false,
            expires_at: None,
        },
    };

    Json(status)
}
