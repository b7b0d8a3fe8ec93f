use std::collections::BTreeMap;

use regex::Regex;
use serde_json::{json, Value};
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::{LoginRequest, Session};
use shared_models::error::AppError;
use shared_upstream::client::LOGIN_PATH;
use shared_upstream::messages::LOGIN;
use shared_upstream::{normalize, Candidate, ExtractionPlan, Normalized, PayloadShape, UpstreamClient, UpstreamError};
use shared_utils::jwt::token_expiry;

const TOKEN_PLAN: ExtractionPlan = ExtractionPlan::new(
    LOGIN,
    PayloadShape::Text,
    &[
        Candidate::Path("message.login.token"),
        Candidate::Path("token"),
        Candidate::Path("access_token"),
        Candidate::Path("data.token"),
    ],
);

const USER_PLAN: ExtractionPlan = ExtractionPlan::new(
    LOGIN,
    PayloadShape::Object,
    &[
        Candidate::Path("user"),
        Candidate::Path("message.user"),
        Candidate::Path("data.user"),
    ],
);

pub struct LoginOutcome {
    pub session: Session,
    pub user: Option<Value>,
}

pub struct LoginService {
    upstream: UpstreamClient,
}

impl LoginService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }

    /// Field-level checks before anything is sent upstream.
    pub fn validate(request: &LoginRequest) -> Result<(), AppError> {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();

        let email = request.email.trim();
        if email.is_empty() {
            fields.entry("email".into()).or_default().push("El email es requerido".into());
        } else if !is_valid_email(email) {
            fields.entry("email".into()).or_default().push("El email debe ser válido".into());
        }

        if request.password.is_empty() {
            fields.entry("password".into()).or_default().push("La contraseña es requerida".into());
        } else if request.password.chars().count() < 3 {
            fields
                .entry("password".into())
                .or_default()
                .push("La contraseña debe tener al menos 3 caracteres".into());
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::ValidationError {
                message: "Datos de entrada inválidos".to_string(),
                fields,
            })
        }
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AppError> {
        Self::validate(request)?;

        debug!("Relaying login for {}", request.email.trim());
        let reply = self
            .upstream
            .post_json(LOGIN_PATH, &json!({
                "email": request.email.trim(),
                "password": request.password,
            }))
            .await?;

        let token = match normalize::<String>(&reply, &TOKEN_PLAN)? {
            Normalized::Validated(token) => token,
            Normalized::RawFallback { payload, .. } => payload
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| UpstreamError::no_payload(LOGIN.no_payload))?,
        };

        let user = USER_PLAN.extract(&reply.body).map(|(_, user)| user.clone());
        if user.is_none() {
            warn!("Login reply carried no user object");
        }

        let session = Session::new(token.clone()).with_expiry(token_expiry(&token));
        Ok(LoginOutcome { session, user })
    }
}

fn is_valid_email(email: &str) -> bool {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .map(|re| re.is_match(email) && email.len() <= 254)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_valid_credentials_pass() {
        assert!(LoginService::validate(&request("l20030001@celaya.tecnm.mx", "abc")).is_ok());
    }

    #[test]
    fn test_field_errors_are_collected() {
        let result = LoginService::validate(&request("not-an-email", "ab"));
        assert_matches!(result, Err(AppError::ValidationError { fields, .. }) => {
            assert_eq!(fields["email"], vec!["El email debe ser válido".to_string()]);
            assert_eq!(fields["password"], vec!["La contraseña debe tener al menos 3 caracteres".to_string()]);
        });

        let result = LoginService::validate(&request("", ""));
        assert_matches!(result, Err(AppError::ValidationError { fields, .. }) => {
            assert_eq!(fields["email"], vec!["El email es requerido".to_string()]);
            assert_eq!(fields["password"], vec!["La contraseña es requerida".to_string()]);
        });
    }
}
