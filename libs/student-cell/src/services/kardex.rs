use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_upstream::client::KARDEX_PATH;
use shared_upstream::coerce::{int_value, kardex_grade_value, text_value};
use shared_upstream::messages::KARDEX;
use shared_upstream::{normalize, Candidate, ExtractionPlan, Normalized, PayloadShape, UpstreamClient, UpstreamError};

use crate::models::{KardexFilter, KardexRecord, KardexSubject, KardexSummary, KardexView, Records};

pub const KARDEX_PLAN: ExtractionPlan = ExtractionPlan::new(
    KARDEX,
    PayloadShape::Object,
    &[Candidate::Path("data")],
);

const PASSING_GRADE: f64 = 70.0;

pub struct KardexService {
    upstream: UpstreamClient,
}

impl KardexService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }

    pub async fn fetch(&self, session: &Session, filter: &KardexFilter) -> Result<Records<KardexView>, AppError> {
        debug!("Fetching kardex");

        let reply = self.upstream.get(KARDEX_PATH, session).await?;

        let (record, validated) = match normalize::<KardexRecord>(&reply, &KARDEX_PLAN)? {
            Normalized::Validated(record) => (record, true),
            Normalized::RawFallback { payload, errors } => {
                warn!("Kardex processed without validation: {}", errors.join("; "));
                let record = record_from_value(&payload)
                    .ok_or_else(|| UpstreamError::no_payload(KARDEX.no_payload))?;
                (record, false)
            }
        };

        let view = build_view(record, filter);
        debug!("{} of {} kardex subjects after filters", view.subjects.len(), view.summary.total);

        Ok(Records { data: view, validated })
    }
}

pub fn build_view(record: KardexRecord, filter: &KardexFilter) -> KardexView {
    let subjects: Vec<KardexSubject> = record
        .kardex
        .into_iter()
        .filter(|subject| filter.matches(subject))
        .collect();

    KardexView {
        summary: summarize(&subjects),
        porcentaje_avance: record.porcentaje_avance,
        subjects,
    }
}

impl KardexFilter {
    pub fn matches(&self, subject: &KardexSubject) -> bool {
        let search = active(&self.search).map(str::to_lowercase);
        let matches_search = search
            .map(|term| subject.nombre_materia.to_lowercase().contains(&term))
            .unwrap_or(true);

        let matches_semestre = active(&self.semestre)
            .map(|semestre| subject.semestre.as_deref() == Some(semestre))
            .unwrap_or(true);

        let matches_estatus = active(&self.estatus)
            .map(|estatus| subject.estatus.as_deref() == Some(estatus))
            .unwrap_or(true);

        matches_search && matches_semestre && matches_estatus
    }
}

// Blank and "all" mean no filter.
fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn numeric_grade(subject: &KardexSubject) -> Option<f64> {
    subject
        .calificacion
        .as_deref()
        .and_then(|grade| grade.parse::<f64>().ok())
}

pub fn summarize(subjects: &[KardexSubject]) -> KardexSummary {
    let grades: Vec<f64> = subjects.iter().filter_map(numeric_grade).collect();

    let promedio = if grades.is_empty() {
        0.0
    } else {
        grades.iter().sum::<f64>() / grades.len() as f64
    };

    let creditos_acumulados = subjects
        .iter()
        .filter(|subject| {
            numeric_grade(subject).is_some_and(|grade| grade >= PASSING_GRADE)
                && !subject
                    .estatus
                    .as_deref()
                    .is_some_and(|estatus| estatus.eq_ignore_ascii_case("reprobada"))
        })
        .map(|subject| subject.creditos.unwrap_or(0))
        .sum();

    KardexSummary {
        promedio: format!("{:.2}", promedio),
        creditos_acumulados,
        materias_aprobadas: grades.iter().filter(|g| **g >= PASSING_GRADE).count(),
        materias_reprobadas: grades.iter().filter(|g| **g < PASSING_GRADE).count(),
        total: subjects.len(),
    }
}

/// Rebuild the record from an unvalidated payload. `None` when there is no
/// `kardex` array to work with.
pub fn record_from_value(payload: &Value) -> Option<KardexRecord> {
    let rows = payload.get("kardex")?.as_array()?;

    let kardex = rows
        .iter()
        .map(|row| KardexSubject {
            clave_materia: text_value(&row["clave_materia"]).unwrap_or_default(),
            nombre_materia: text_value(&row["nombre_materia"]).unwrap_or_default(),
            creditos: int_value(&row["creditos"]),
            calificacion: kardex_grade_value(&row["calificacion"]),
            periodo: text_value(&row["periodo"]),
            semestre: text_value(&row["semestre"]),
            descripcion: text_value(&row["descripcion"]),
            estatus: text_value(&row["estatus"]),
        })
        .collect();

    Some(KardexRecord {
        porcentaje_avance: payload.get("porcentaje_avance").and_then(Value::as_f64),
        kardex,
    })
}
