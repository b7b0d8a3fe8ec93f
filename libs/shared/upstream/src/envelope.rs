use std::fmt;

use serde_json::Value;

use shared_models::upstream::ErrorKind;

use crate::error::UpstreamError;
use crate::messages::ResourceMessages;

/// The success code the upstream puts in the envelope `status` field.
pub const SUCCESS_STATUS: i64 = 200;

/// Where a payload may live inside an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Candidate {
    /// Dotted path from the envelope root, e.g. `message.calificaciones`.
    Path(&'static str),
    /// The envelope itself.
    Root,
}

impl Candidate {
    pub fn resolve<'a>(&self, envelope: &'a Value) -> Option<&'a Value> {
        match self {
            Candidate::Root => Some(envelope),
            Candidate::Path(path) => path
                .split('.')
                .try_fold(envelope, |value, segment| value.get(segment)),
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Path(path) => f.write_str(path),
            Candidate::Root => f.write_str("$"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    Array,
    Object,
    /// A non-empty string, e.g. a token.
    Text,
}

impl PayloadShape {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            PayloadShape::Array => value.is_array(),
            PayloadShape::Object => value.is_object(),
            PayloadShape::Text => value.as_str().is_some_and(|s| !s.is_empty()),
        }
    }
}

/// Expected shape, ordered candidate locations and messages for one
/// upstream resource.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionPlan {
    pub messages: ResourceMessages,
    pub shape: PayloadShape,
    pub candidates: &'static [Candidate],
}

impl ExtractionPlan {
    pub const fn new(
        messages: ResourceMessages,
        shape: PayloadShape,
        candidates: &'static [Candidate],
    ) -> Self {
        Self {
            messages,
            shape,
            candidates,
        }
    }

    /// First candidate whose value has the expected shape.
    pub fn extract<'a>(&self, envelope: &'a Value) -> Option<(Candidate, &'a Value)> {
        self.candidates.iter().find_map(|candidate| {
            candidate
                .resolve(envelope)
                .filter(|value| self.shape.matches(value))
                .map(|value| (*candidate, value))
        })
    }
}

/// Envelope `status` truncated to an integer, when present as a number or
/// numeric string. Zero counts as absent; fractions and negatives do not.
pub fn envelope_status(envelope: &Value) -> Option<i64> {
    let status = match envelope.get("status")? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    }?;

    (status != 0).then_some(status)
}

/// The upstream's own explanation: a string `message`, else `responseCodeTxt`.
pub fn upstream_message(envelope: &Value) -> Option<&str> {
    ["message", "responseCodeTxt"]
        .iter()
        .filter_map(|key| envelope.get(*key).and_then(Value::as_str))
        .find(|msg| !msg.trim().is_empty())
}

/// Map a non-success envelope status to a typed failure. Runs before any
/// transport-level check.
pub fn interpret_status(envelope: &Value, messages: &ResourceMessages) -> Result<(), UpstreamError> {
    let Some(code) = envelope_status(envelope) else {
        return Ok(());
    };
    if code == SUCCESS_STATUS {
        return Ok(());
    }

    let message = match code {
        401 => messages.auth_expired.to_string(),
        403 => messages.forbidden.to_string(),
        404 => messages.not_found.to_string(),
        c if c >= 500 => messages.server_error.to_string(),
        c => upstream_message(envelope)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Error {}: {}", c, messages.request_failed)),
    };

    let kind = u16::try_from(code)
        .map(ErrorKind::from_status)
        .unwrap_or(ErrorKind::UpstreamError);

    Err(UpstreamError::new(kind, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::GRADES;
    use serde_json::json;

    const GRADES_CANDIDATES: &[Candidate] = &[
        Candidate::Path("data"),
        Candidate::Path("message.calificaciones"),
        Candidate::Path("message.grades"),
        Candidate::Root,
    ];

    #[test]
    fn test_dotted_paths_resolve() {
        let envelope = json!({"message": {"login": {"token": "abc"}}});
        let value = Candidate::Path("message.login.token").resolve(&envelope);
        assert_eq!(value, Some(&json!("abc")));
        assert_eq!(Candidate::Path("message.missing").resolve(&envelope), None);
        assert_eq!(Candidate::Root.resolve(&envelope), Some(&envelope));
    }

    #[test]
    fn test_wrong_kind_candidate_is_skipped() {
        let plan = ExtractionPlan::new(GRADES, PayloadShape::Array, GRADES_CANDIDATES);
        let envelope = json!({
            "data": {"not": "an array"},
            "message": {"calificaciones": [{"periodo": {}}]}
        });

        let (candidate, value) = plan.extract(&envelope).unwrap();
        assert_eq!(candidate, Candidate::Path("message.calificaciones"));
        assert!(value.is_array());
    }

    #[test]
    fn test_null_candidates_do_not_match() {
        let plan = ExtractionPlan::new(GRADES, PayloadShape::Object, &[Candidate::Path("data")]);
        assert!(plan.extract(&json!({"data": null})).is_none());
    }

    #[test]
    fn test_status_precedence() {
        let cases = [
            (401, ErrorKind::AuthExpired, GRADES.auth_expired),
            (403, ErrorKind::Forbidden, GRADES.forbidden),
            (404, ErrorKind::NotFound, GRADES.not_found),
            (500, ErrorKind::UpstreamError, GRADES.server_error),
            (502, ErrorKind::UpstreamError, GRADES.server_error),
        ];

        for (status, kind, message) in cases {
            let err = interpret_status(&json!({"status": status, "message": "ignored"}), &GRADES)
                .unwrap_err();
            assert_eq!(err.kind, kind, "status {}", status);
            assert_eq!(err.message, message);
        }
    }

    #[test]
    fn test_unbucketed_status_uses_upstream_message() {
        let err = interpret_status(
            &json!({"status": 422, "message": {"x": 1}, "responseCodeTxt": "Datos incompletos"}),
            &GRADES,
        )
        .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.message, "Datos incompletos");

        let err = interpret_status(&json!({"status": "418"}), &GRADES).unwrap_err();
        assert_eq!(err.message, "Error 418: No se pudieron obtener las calificaciones.");
    }

    #[test]
    fn test_fractional_and_negative_status_are_errors() {
        let err = interpret_status(&json!({"status": 401.0}), &GRADES).unwrap_err();
        assert_eq!(err.kind, ErrorKind::AuthExpired);

        let err = interpret_status(&json!({"status": "404.7"}), &GRADES).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);

        let err = interpret_status(&json!({"status": -1, "message": "fallo interno"}), &GRADES).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamError);
        assert_eq!(err.message, "fallo interno");

        assert!(interpret_status(&json!({"status": 200.0}), &GRADES).is_ok());
    }

    #[test]
    fn test_success_or_missing_status_passes() {
        assert!(interpret_status(&json!({"status": 200}), &GRADES).is_ok());
        assert!(interpret_status(&json!({"status": 0}), &GRADES).is_ok());
        assert!(interpret_status(&json!({"data": []}), &GRADES).is_ok());
        assert!(interpret_status(&json!({"status": true}), &GRADES).is_ok());
    }
}
