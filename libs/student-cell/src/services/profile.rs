use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_upstream::client::STUDENT_PATH;
use shared_upstream::coerce::text_value;
use shared_upstream::messages::STUDENT_INFO;
use shared_upstream::{
    normalize, Candidate, ExtractionPlan, Normalized, PayloadShape, UpstreamClient, UpstreamError,
};

use crate::models::{StudentIdentity, StudentInfo};

pub const PROFILE_PLAN: ExtractionPlan = ExtractionPlan::new(
    STUDENT_INFO,
    PayloadShape::Object,
    &[
        Candidate::Path("data"),
        Candidate::Path("message.student"),
        Candidate::Path("message.estudiante"),
        Candidate::Root,
    ],
);

pub struct ProfileService {
    upstream: UpstreamClient,
}

impl ProfileService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }

    pub async fn fetch(&self, session: &Session) -> Result<Normalized<StudentInfo>, AppError> {
        debug!("Fetching student profile");

        let reply = self.upstream.get(STUDENT_PATH, session).await?;
        Ok(normalize::<StudentInfo>(&reply, &PROFILE_PLAN)?)
    }

    /// Control number, name and e-mail, read leniently when the profile
    /// did not validate.
    pub async fn identity(&self, session: &Session) -> Result<StudentIdentity, AppError> {
        let identity = match self.fetch(session).await? {
            Normalized::Validated(info) => Some(StudentIdentity {
                numero_control: info.numero_control,
                persona: info.persona,
                email: info.email,
            }),
            Normalized::RawFallback { payload, .. } => identity_from_value(&payload),
        };

        identity.ok_or_else(|| {
            warn!("Student profile carries no control number");
            UpstreamError::no_payload(STUDENT_INFO.no_payload).into()
        })
    }
}

pub fn identity_from_value(payload: &Value) -> Option<StudentIdentity> {
    let numero_control = payload
        .get("numero_control")
        .and_then(text_value)
        .filter(|nc| !nc.trim().is_empty())?;

    Some(StudentIdentity {
        numero_control,
        persona: payload.get("persona").and_then(text_value).unwrap_or_default(),
        email: payload.get("email").and_then(text_value).unwrap_or_default(),
    })
}
