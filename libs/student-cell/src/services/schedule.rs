use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_upstream::client::SCHEDULE_PATH;
use shared_upstream::coerce::{int_value, text_value};
use shared_upstream::messages::SCHEDULE;
use shared_upstream::{normalize_list, Candidate, ExtractionPlan, Normalized, PayloadShape, UpstreamClient};

use crate::models::{Period, RawScheduleRow, Records, ScheduleBlock, ScheduleClass, ScheduleView};

pub const SCHEDULE_PLAN: ExtractionPlan = ExtractionPlan::new(
    SCHEDULE,
    PayloadShape::Array,
    &[Candidate::Path("data")],
);

/// Upstream column prefix and the label shown for it.
pub const DAYS: [(&str, &str); 6] = [
    ("lunes", "LUNES"),
    ("martes", "MARTES"),
    ("miercoles", "MIÉRCOLES"),
    ("jueves", "JUEVES"),
    ("viernes", "VIERNES"),
    ("sabado", "SÁBADO"),
];

pub struct ScheduleService {
    upstream: UpstreamClient,
}

impl ScheduleService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            upstream: UpstreamClient::new(config),
        }
    }

    pub async fn fetch(&self, session: &Session) -> Result<Records<ScheduleView>, AppError> {
        debug!("Fetching class schedule");

        let reply = self.upstream.get(SCHEDULE_PATH, session).await?;

        let records = match normalize_list::<ScheduleBlock>(&reply, &SCHEDULE_PLAN)? {
            Normalized::Validated(blocks) => {
                let (periodo, classes) = match blocks.into_iter().next() {
                    Some(block) => (Some(block.periodo), block.horario.iter().flat_map(expand_row).collect()),
                    None => (None, Vec::new()),
                };
                Records::validated(view(periodo, classes))
            }
            Normalized::RawFallback { payload, errors } => {
                warn!("Schedule processed without validation: {}", errors.join("; "));
                let (periodo, classes) = expand_raw(&payload);
                Records::best_effort(view(periodo, classes))
            }
        };

        debug!(
            "{} class sessions across {} subjects",
            records.data.classes.len(),
            records.data.total_materias
        );
        Ok(records)
    }
}

impl RawScheduleRow {
    /// Time range and room for one weekday column.
    fn day(&self, key: &str) -> (Option<&str>, Option<&str>) {
        let (range, room) = match key {
            "lunes" => (&self.lunes, &self.lunes_clave_salon),
            "martes" => (&self.martes, &self.martes_clave_salon),
            "miercoles" => (&self.miercoles, &self.miercoles_clave_salon),
            "jueves" => (&self.jueves, &self.jueves_clave_salon),
            "viernes" => (&self.viernes, &self.viernes_clave_salon),
            "sabado" => (&self.sabado, &self.sabado_clave_salon),
            _ => return (None, None),
        };
        (range.as_deref(), room.as_deref())
    }
}

/// `"07:00 - 09:00"` into start and end. Without a dash the end is empty.
pub fn split_range(range: &str) -> (String, String) {
    match range.split_once('-') {
        Some((start, end)) => (start.trim().to_string(), end.trim().to_string()),
        None => (range.trim().to_string(), String::new()),
    }
}

pub fn expand_row(row: &RawScheduleRow) -> Vec<ScheduleClass> {
    DAYS.iter()
        .filter_map(|(key, label)| {
            let (range, room) = row.day(key);
            let range = range.filter(|r| !r.trim().is_empty())?;
            let (hora_inicio, hora_fin) = split_range(range);

            Some(ScheduleClass {
                id_grupo: row.id_grupo,
                clave_materia: row.clave_materia.clone(),
                nombre_materia: row.nombre_materia.clone(),
                letra_grupo: row.letra_grupo.clone(),
                dia: label.to_string(),
                hora_inicio,
                hora_fin,
                aula: room.map(str::to_string),
                nombre_plan: row.nombre_plan.clone(),
                clave_turno: row.clave_turno.clone(),
                letra_nivel: row.letra_nivel.clone(),
            })
        })
        .collect()
}

/// Expansion over the unvalidated payload: first block only, rows read
/// field by field.
pub fn expand_raw(payload: &Value) -> (Option<Period>, Vec<ScheduleClass>) {
    let Some(block) = payload.as_array().and_then(|blocks| blocks.first()) else {
        return (None, Vec::new());
    };

    let periodo = serde_json::from_value::<Period>(block["periodo"].clone()).ok();
    let empty = Vec::new();
    let rows = block["horario"].as_array().unwrap_or(&empty);

    let mut classes = Vec::new();
    for row in rows {
        for (key, label) in DAYS {
            let Some(range) = row[key].as_str().filter(|r| !r.trim().is_empty()) else {
                continue;
            };
            let (hora_inicio, hora_fin) = split_range(range);

            classes.push(ScheduleClass {
                id_grupo: int_value(&row["id_grupo"]),
                clave_materia: text_value(&row["clave_materia"]).unwrap_or_default(),
                nombre_materia: text_value(&row["nombre_materia"]).unwrap_or_default(),
                letra_grupo: text_value(&row["letra_grupo"]),
                dia: label.to_string(),
                hora_inicio,
                hora_fin,
                aula: text_value(&row[format!("{}_clave_salon", key).as_str()]),
                nombre_plan: text_value(&row["nombre_plan"]),
                clave_turno: text_value(&row["clave_turno"]),
                letra_nivel: text_value(&row["letra_nivel"]),
            });
        }
    }

    (periodo, classes)
}

pub fn view(periodo: Option<Period>, classes: Vec<ScheduleClass>) -> ScheduleView {
    let total_materias = classes
        .iter()
        .map(|class| class.clave_materia.as_str())
        .collect::<BTreeSet<_>>()
        .len();

    let mut sesiones_por_dia = BTreeMap::new();
    for class in &classes {
        *sesiones_por_dia.entry(class.dia.clone()).or_insert(0) += 1;
    }

    ScheduleView {
        classes,
        periodo,
        total_materias,
        sesiones_por_dia,
    }
}
