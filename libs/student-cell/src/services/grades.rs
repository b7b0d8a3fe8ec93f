use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_upstream::client::GRADES_PATH;
use shared_upstream::coerce::{int_value, text_value, to_fixed2};
use shared_upstream::messages::GRADES;
use shared_upstream::{normalize_list, Candidate, ExtractionPlan, Normalized, PayloadShape, UpstreamClient};

use crate::models::{GradePeriod, ProcessedGrade, Records, SubjectGrades};

pub const GRADES_PLAN: ExtractionPlan = ExtractionPlan::new(
    GRADES,
    PayloadShape::Array,
    &[
        Candidate::Path("data"),
        Candidate::Path("message.calificaciones"),
        Candidate::Path("message.grades"),
        Candidate::Path("calificaciones"),
        Candidate::Root,
    ],
);

const PARTIALS: [i64; 4] = [1, 2, 3, 4];

pub struct GradesService {
    upstream: UpstreamClient,
}

impl GradesService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }

    pub async fn fetch(&self, session: &Session) -> Result<Records<Vec<ProcessedGrade>>, AppError> {
        debug!("Fetching grades");

        let reply = self.upstream.get(GRADES_PATH, session).await?;

        let records = match normalize_list::<GradePeriod>(&reply, &GRADES_PLAN)? {
            Normalized::Validated(periods) => Records::validated(flatten_periods(&periods)),
            Normalized::RawFallback { payload, errors } => {
                warn!("Grades processed without validation ({} errors)", errors.len());
                Records::best_effort(flatten_raw(&payload))
            }
        };

        debug!("{} subjects processed", records.data.len());
        Ok(records)
    }
}

pub fn flatten_periods(periods: &[GradePeriod]) -> Vec<ProcessedGrade> {
    periods
        .iter()
        .flat_map(|period| {
            period.materias.iter().map(move |subject| {
                let [parcial1, parcial2, parcial3, parcial4] = PARTIALS.map(|n| partial(subject, n));
                let promedio = average(&[&parcial1, &parcial2, &parcial3, &parcial4]);

                ProcessedGrade {
                    nombre_materia: subject.materia.nombre_materia.clone(),
                    clave_materia: subject.materia.clave_materia.clone(),
                    grupo: subject.materia.letra_grupo.clone(),
                    id_grupo: subject.materia.id_grupo,
                    periodo: period.periodo.clave_periodo.clone(),
                    periodo_descripcion: period.periodo.descripcion_periodo.clone(),
                    anio: period.periodo.anio,
                    parcial1,
                    parcial2,
                    parcial3,
                    parcial4,
                    promedio,
                }
            })
        })
        .collect()
}

fn partial(subject: &SubjectGrades, number: i64) -> Option<String> {
    subject
        .calificaiones
        .iter()
        .find(|p| p.numero_calificacion == Some(number))
        .and_then(|p| p.calificacion.clone())
}

/// Same flattening over the unvalidated payload. Missing text becomes
/// empty, unparseable grades become null, and no row is dropped.
pub fn flatten_raw(payload: &Value) -> Vec<ProcessedGrade> {
    let empty = Vec::new();
    let periods = payload.as_array().unwrap_or(&empty);

    let mut grades = Vec::new();
    for period in periods {
        let info = &period["periodo"];
        let subjects = period["materias"].as_array().unwrap_or(&empty);

        for subject in subjects {
            let materia = &subject["materia"];
            let partials = subject["calificaiones"].as_array().unwrap_or(&empty);
            let [parcial1, parcial2, parcial3, parcial4] = PARTIALS.map(|n| {
                partials
                    .iter()
                    .find(|p| int_value(&p["numero_calificacion"]) == Some(n))
                    .and_then(|p| to_fixed2(&p["calificacion"]))
            });
            let promedio = average(&[&parcial1, &parcial2, &parcial3, &parcial4]);

            grades.push(ProcessedGrade {
                nombre_materia: text_value(&materia["nombre_materia"]).unwrap_or_default(),
                clave_materia: text_value(&materia["clave_materia"]).unwrap_or_default(),
                grupo: text_value(&materia["letra_grupo"]),
                id_grupo: int_value(&materia["id_grupo"]),
                periodo: text_value(&info["clave_periodo"]).unwrap_or_default(),
                periodo_descripcion: text_value(&info["descripcion_periodo"]).unwrap_or_default(),
                anio: int_value(&info["anio"]),
                parcial1,
                parcial2,
                parcial3,
                parcial4,
                promedio,
            });
        }
    }

    grades
}

/// Mean of the partials that are present, two decimals.
fn average(partials: &[&Option<String>]) -> Option<String> {
    let values: Vec<f64> = partials
        .iter()
        .filter_map(|p| p.as_deref())
        .filter_map(|p| p.parse::<f64>().ok())
        .collect();

    if values.is_empty() {
        return None;
    }

    Some(format!("{:.2}", values.iter().sum::<f64>() / values.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_upstream::UpstreamReply;
    use shared_utils::test_utils::MockUpstreamResponses;

    #[test]
    fn test_validated_periods_are_flattened() {
        let reply = UpstreamReply::ok(MockUpstreamResponses::envelope(json!([
            MockUpstreamResponses::grades_period()
        ])));

        let periods = normalize_list::<GradePeriod>(&reply, &GRADES_PLAN)
            .unwrap()
            .validated()
            .unwrap();
        let grades = flatten_periods(&periods);

        assert_eq!(grades.len(), 2);
        let calculo = &grades[0];
        assert_eq!(calculo.clave_materia, "ACF0902");
        assert_eq!(calculo.grupo.as_deref(), Some("A"));
        assert_eq!(calculo.periodo, "20243");
        assert_eq!(calculo.anio, Some(2024));
        assert_eq!(calculo.parcial1.as_deref(), Some("90.00"));
        assert_eq!(calculo.parcial2.as_deref(), Some("80.00"));
        assert_eq!(calculo.parcial3, None);
        assert_eq!(calculo.parcial4, None);
        assert_eq!(calculo.promedio.as_deref(), Some("85.00"));

        let quimica = &grades[1];
        assert_eq!(quimica.parcial1, None);
        assert_eq!(quimica.promedio, None);
    }

    #[test]
    fn test_bad_row_keeps_the_rest() {
        let mut broken = MockUpstreamResponses::grades_period();
        broken["materias"][1]["materia"]["clave_materia"] = json!(null);
        broken["materias"][0]["calificaiones"][0]["calificacion"] = json!("SD");

        let reply = UpstreamReply::ok(MockUpstreamResponses::envelope(json!([broken])));
        let normalized = normalize_list::<GradePeriod>(&reply, &GRADES_PLAN).unwrap();
        assert!(!normalized.is_validated());

        let Normalized::RawFallback { payload, .. } = normalized else {
            panic!("expected raw fallback");
        };
        let grades = flatten_raw(&payload);

        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].parcial1, None);
        assert_eq!(grades[0].parcial2.as_deref(), Some("80.00"));
        assert_eq!(grades[0].promedio.as_deref(), Some("80.00"));
        assert_eq!(grades[1].nombre_materia, "QUIMICA");
        assert_eq!(grades[1].clave_materia, "");
    }

    #[test]
    fn test_second_candidate_used_when_first_missing() {
        let reply = UpstreamReply::ok(json!({
            "status": 200,
            "message": { "calificaciones": [MockUpstreamResponses::grades_period()] }
        }));

        let periods = normalize_list::<GradePeriod>(&reply, &GRADES_PLAN)
            .unwrap()
            .validated()
            .unwrap();
        assert_eq!(periods.len(), 1);
    }

    #[test]
    fn test_average_of_present_partials() {
        let a = Some("90.00".to_string());
        let b = Some("85.50".to_string());
        assert_eq!(average(&[&a, &None, &b, &None]).as_deref(), Some("87.75"));
        assert_eq!(average(&[&None, &None]), None);
    }
}
