use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use headers::HeaderMapExt;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_models::upstream::ErrorKind;

use crate::jwt::token_expiry;

pub const NO_SESSION: &str = "No hay sesión activa. Por favor, inicia sesión nuevamente.";
pub const SESSION_EXPIRED: &str = "Tu sesión ha expirado. Por favor, inicia sesión nuevamente.";
pub const INVALID_TOKEN: &str = "El servidor devolvió un token de sesión inválido.";

/// Token from the session cookie, else from an `Authorization: Bearer` header.
pub fn find_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let from_cookie = headers
        .typed_get::<headers::Cookie>()
        .and_then(|cookies| cookies.get(cookie_name).map(str::to_string))
        .filter(|token| !token.is_empty());

    from_cookie.or_else(|| {
        headers
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    })
}

/// Build the request's session, rejecting missing or expired tokens.
pub fn session_from_headers(headers: &HeaderMap, cookie_name: &str) -> Result<Session, AppError> {
    let token = find_token(headers, cookie_name)
        .ok_or_else(|| AppError::Auth(NO_SESSION.to_string()))?;

    let session = Session::new(token.clone()).with_expiry(token_expiry(&token));
    if session.is_expired_at(Utc::now()) {
        debug!("Rejecting expired session token");
        return Err(AppError::Auth(SESSION_EXPIRED.to_string()));
    }

    Ok(session)
}

// Middleware for session-gated routes; handlers read `Extension<Session>`
pub async fn session_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let session = session_from_headers(request.headers(), &config.session_cookie_name)?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

/// A cookie value must not be able to close the pair and start attributes.
fn is_cookie_safe(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_graphic() && !matches!(b, b';' | b',' | b'"' | b'\\'))
}

/// `Set-Cookie` value that stores the session token.
pub fn session_cookie(config: &AppConfig, token: &str) -> Result<HeaderValue, AppError> {
    if !is_cookie_safe(token) {
        warn!("Upstream token rejected: not a valid cookie value");
        return Err(AppError::upstream(ErrorKind::UpstreamError, INVALID_TOKEN));
    }

    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        config.session_cookie_name, token, config.session_max_age_secs
    );
    if config.session_cookie_secure {
        cookie.push_str("; Secure");
    }

    HeaderValue::from_str(&cookie)
        .map_err(|_| AppError::Internal("Invalid session token for cookie".to_string()))
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(config: &AppConfig) -> HeaderValue {
    let cookie = format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
        config.session_cookie_name
    );
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static("auth_token=; Path=/; Max-Age=0"))
}

pub fn with_cookie(mut headers: HeaderMap, cookie: HeaderValue) -> HeaderMap {
    headers.append(SET_COOKIE, cookie);
    headers
}
