use http::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use shared_models::upstream::ErrorKind;

use crate::envelope::{interpret_status, upstream_message, ExtractionPlan, PayloadShape};
use crate::error::UpstreamError;

/// A fetched upstream response: transport status plus the decoded body
/// (`Value::Null` when the body was not JSON).
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub status: StatusCode,
    pub body: Value,
}

impl UpstreamReply {
    pub fn new(status: StatusCode, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(StatusCode::OK, body)
    }
}

/// Successful normalization. `RawFallback` means the payload was found but
/// did not pass validation; callers get it anyway and must treat it as
/// best effort.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized<T> {
    Validated(T),
    RawFallback { payload: Value, errors: Vec<String> },
}

impl<T> Normalized<T> {
    pub fn is_validated(&self) -> bool {
        matches!(self, Normalized::Validated(_))
    }

    /// `Some(ValidationFallback)` for best-effort results.
    pub fn warning(&self) -> Option<ErrorKind> {
        match self {
            Normalized::Validated(_) => None,
            Normalized::RawFallback { .. } => Some(ErrorKind::ValidationFallback),
        }
    }

    pub fn validated(self) -> Option<T> {
        match self {
            Normalized::Validated(value) => Some(value),
            Normalized::RawFallback { .. } => None,
        }
    }
}

pub type NormalizedResponse<T> = Result<Normalized<T>, UpstreamError>;

/// Status and transport checks followed by payload extraction.
fn locate<'a>(reply: &'a UpstreamReply, plan: &ExtractionPlan) -> Result<&'a Value, UpstreamError> {
    let resource = plan.messages.resource;

    interpret_status(&reply.body, &plan.messages).inspect_err(|err| {
        warn!("[{}] envelope status rejected: {}", resource, err);
    })?;

    if !reply.status.is_success() {
        warn!("[{}] transport status {}", resource, reply.status);
        let message = upstream_message(&reply.body).unwrap_or(plan.messages.transport_failed);
        return Err(UpstreamError::transport(message));
    }

    match plan.extract(&reply.body) {
        Some((candidate, payload)) => {
            debug!("[{}] payload found at '{}'", resource, candidate);
            Ok(payload)
        }
        None => {
            warn!(
                "[{}] no candidate matched expected {:?} shape (tried {})",
                resource,
                plan.shape,
                plan.candidates.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            );
            Err(UpstreamError::no_payload(plan.messages.no_payload))
        }
    }
}

/// Normalize an envelope into `T`, falling back to the raw payload when it
/// does not validate.
pub fn normalize<T: DeserializeOwned>(reply: &UpstreamReply, plan: &ExtractionPlan) -> NormalizedResponse<T> {
    let payload = locate(reply, plan)?;

    match serde_json::from_value::<T>(payload.clone()) {
        Ok(value) => Ok(Normalized::Validated(value)),
        Err(err) => {
            warn!("[{}] validation failed, returning raw payload: {}", plan.messages.resource, err);
            Ok(Normalized::RawFallback {
                payload: payload.clone(),
                errors: vec![err.to_string()],
            })
        }
    }
}

/// Normalize an array payload item by item. Every item is checked so the
/// error list is complete; any failing item turns the result into a raw
/// fallback that still carries every row. Decoded rows are dropped as soon
/// as the first item fails.
pub fn normalize_list<T: DeserializeOwned>(reply: &UpstreamReply, plan: &ExtractionPlan) -> NormalizedResponse<Vec<T>> {
    debug_assert_eq!(plan.shape, PayloadShape::Array);

    let payload = locate(reply, plan)?;
    let items = payload.as_array().map(Vec::as_slice).unwrap_or_default();

    let mut values = Some(Vec::with_capacity(items.len()));
    let mut errors = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match T::deserialize(item) {
            Ok(value) => {
                if let Some(values) = values.as_mut() {
                    values.push(value);
                }
            }
            Err(err) => {
                values = None;
                errors.push(format!("item {}: {}", index, err));
            }
        }
    }

    if let Some(values) = values {
        debug!("[{}] {} items validated", plan.messages.resource, values.len());
        return Ok(Normalized::Validated(values));
    }

    warn!(
        "[{}] {} of {} items failed validation: {}",
        plan.messages.resource,
        errors.len(),
        items.len(),
        errors.join("; ")
    );

    Ok(Normalized::RawFallback {
        payload: payload.clone(),
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::Candidate;
    use crate::messages::{GRADES, STUDENT_INFO};
    use assert_matches::assert_matches;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Row {
        name: String,
        #[serde(default, deserialize_with = "crate::coerce::fixed_decimal")]
        score: Option<String>,
    }

    const LIST_PLAN: ExtractionPlan = ExtractionPlan::new(
        GRADES,
        PayloadShape::Array,
        &[Candidate::Path("data"), Candidate::Path("message.calificaciones"), Candidate::Root],
    );

    const OBJECT_PLAN: ExtractionPlan = ExtractionPlan::new(
        STUDENT_INFO,
        PayloadShape::Object,
        &[Candidate::Path("data"), Candidate::Path("message.estudiante")],
    );

    #[test]
    fn test_body_status_wins_over_transport_status() {
        let reply = UpstreamReply::new(StatusCode::BAD_GATEWAY, json!({"status": 401}));
        let err = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthExpired);
    }

    #[test]
    fn test_transport_failure_carries_upstream_message() {
        let reply = UpstreamReply::new(StatusCode::SERVICE_UNAVAILABLE, json!({"message": "mantenimiento"}));
        let err = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap_err();
        assert_eq!(err, UpstreamError::transport("mantenimiento"));

        let reply = UpstreamReply::new(StatusCode::SERVICE_UNAVAILABLE, Value::Null);
        let err = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap_err();
        assert_eq!(err.message, GRADES.transport_failed);
    }

    #[test]
    fn test_second_candidate_used_when_first_missing() {
        let reply = UpstreamReply::ok(json!({
            "status": 200,
            "message": {"calificaciones": [{"name": "Cálculo", "score": 85}]}
        }));

        let result = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap();
        assert_eq!(
            result,
            Normalized::Validated(vec![Row { name: "Cálculo".into(), score: Some("85.00".into()) }])
        );
    }

    #[test]
    fn test_no_payload_when_nothing_matches() {
        let reply = UpstreamReply::ok(json!({"data": [1, 2]}));
        let err = normalize::<Value>(&reply, &OBJECT_PLAN).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NoPayload);
        assert_eq!(err.message, STUDENT_INFO.no_payload);
    }

    #[test]
    fn test_unparseable_numbers_become_null_without_dropping_rows() {
        let reply = UpstreamReply::ok(json!({"data": [
            {"name": "A", "score": "90"},
            {"name": "B", "score": "N/A"},
            {"name": "C", "score": 70.5}
        ]}));

        let rows = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap().validated().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].score.as_deref(), Some("90.00"));
        assert_eq!(rows[1].score, None);
        assert_eq!(rows[2].score.as_deref(), Some("70.50"));
    }

    #[test]
    fn test_invalid_item_falls_back_to_raw_with_all_rows() {
        let reply = UpstreamReply::ok(json!({"data": [
            {"name": "A", "score": "90"},
            {"score": "80"},
            {"name": "C"}
        ]}));

        let result = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap();
        assert_eq!(result.warning(), Some(ErrorKind::ValidationFallback));
        assert_matches!(result, Normalized::RawFallback { payload, errors } => {
            assert_eq!(payload.as_array().unwrap().len(), 3);
            assert_eq!(errors.len(), 1);
            assert!(errors[0].starts_with("item 1:"));
        });
    }

    #[test]
    fn test_every_failing_item_is_reported() {
        let reply = UpstreamReply::ok(json!({"data": [
            {"score": "80"},
            {"name": "B", "score": "90"},
            {"name": 7}
        ]}));

        let result = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap();
        assert_matches!(result, Normalized::RawFallback { errors, .. } => {
            assert_eq!(errors.len(), 2);
            assert!(errors[0].starts_with("item 0:"));
            assert!(errors[1].starts_with("item 2:"));
        });
    }

    #[test]
    fn test_empty_array_is_validated() {
        let reply = UpstreamReply::ok(json!({"data": []}));
        let result = normalize_list::<Row>(&reply, &LIST_PLAN).unwrap();
        assert_eq!(result, Normalized::Validated(Vec::new()));
    }

    #[test]
    fn test_object_validation_fallback() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Info {
            numero_control: String,
        }

        let reply = UpstreamReply::ok(json!({"data": {"numero_control": 12345}}));
        let result = normalize::<Info>(&reply, &OBJECT_PLAN).unwrap();
        assert!(!result.is_validated());
        assert_matches!(result, Normalized::RawFallback { payload, .. } => {
            assert_eq!(payload["numero_control"], json!(12345));
        });
    }
}
