use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use shared_upstream::coerce::{fixed_decimal, kardex_grade, lenient_int, lenient_text};

/// Service output plus whether it passed validation. `validated == false`
/// means the rows were rebuilt leniently from the raw payload.
#[derive(Debug, Clone)]
pub struct Records<T> {
    pub data: T,
    pub validated: bool,
}

impl<T> Records<T> {
    pub fn validated(data: T) -> Self {
        Self { data, validated: true }
    }

    pub fn best_effort(data: T) -> Self {
        Self { data, validated: false }
    }
}

// ==============================================================================
// STUDENT PROFILE
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentInfo {
    pub numero_control: String,
    pub persona: String,
    pub email: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub semestre: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub num_mat_rep_no_acreditadas: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub creditos_acumulados: Option<String>,
    #[serde(default, deserialize_with = "fixed_decimal")]
    pub promedio_ponderado: Option<String>,
    #[serde(default, deserialize_with = "fixed_decimal")]
    pub promedio_aritmetico: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub materias_cursadas: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub materias_reprobadas: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub materias_aprobadas: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub creditos_complementarios: Option<i64>,
    #[serde(default)]
    pub porcentaje_avance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub num_materias_rep_primera: Option<i64>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub num_materias_rep_segunda: Option<i64>,
    #[serde(default)]
    pub percentaje_avance_cursando: Option<f64>,
    /// Base64 photo, when the upstream includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foto: Option<String>,
}

/// The fields the booking flow needs to upsert a patient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentIdentity {
    pub numero_control: String,
    pub persona: String,
    pub email: String,
}

// ==============================================================================
// GRADES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Period {
    pub clave_periodo: String,
    pub descripcion_periodo: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub anio: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GradePeriod {
    pub periodo: Period,
    pub materias: Vec<SubjectGrades>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectGrades {
    pub materia: SubjectInfo,
    // Upstream spelling.
    #[serde(default)]
    pub calificaiones: Vec<PartialGrade>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubjectInfo {
    pub nombre_materia: String,
    pub clave_materia: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub letra_grupo: Option<String>,
    #[serde(default, deserialize_with = "lenient_int")]
    pub id_grupo: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PartialGrade {
    #[serde(default, deserialize_with = "lenient_int")]
    pub numero_calificacion: Option<i64>,
    #[serde(default, deserialize_with = "fixed_decimal")]
    pub calificacion: Option<String>,
}

/// One subject of one period with its partial grades side by side.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProcessedGrade {
    pub nombre_materia: String,
    pub clave_materia: String,
    pub grupo: Option<String>,
    pub id_grupo: Option<i64>,
    pub periodo: String,
    pub periodo_descripcion: String,
    pub anio: Option<i64>,
    pub parcial1: Option<String>,
    pub parcial2: Option<String>,
    pub parcial3: Option<String>,
    pub parcial4: Option<String>,
    pub promedio: Option<String>,
}

// ==============================================================================
// KARDEX
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct KardexRecord {
    #[serde(default)]
    pub porcentaje_avance: Option<f64>,
    pub kardex: Vec<KardexSubject>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KardexSubject {
    pub clave_materia: String,
    pub nombre_materia: String,
    #[serde(default, deserialize_with = "lenient_int")]
    pub creditos: Option<i64>,
    /// Two-decimal grade, or a literal marker such as `"AC"`.
    #[serde(default, deserialize_with = "kardex_grade")]
    pub calificacion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub periodo: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub semestre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub descripcion: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub estatus: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KardexFilter {
    pub search: Option<String>,
    pub semestre: Option<String>,
    pub estatus: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct KardexSummary {
    pub promedio: String,
    pub creditos_acumulados: i64,
    pub materias_aprobadas: usize,
    pub materias_reprobadas: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct KardexView {
    pub subjects: Vec<KardexSubject>,
    pub porcentaje_avance: Option<f64>,
    pub summary: KardexSummary,
}

// ==============================================================================
// CLASS SCHEDULE
// ==============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleBlock {
    pub periodo: Period,
    pub horario: Vec<RawScheduleRow>,
}

/// One group as the upstream sends it: a column per weekday.
#[derive(Debug, Clone, Deserialize)]
pub struct RawScheduleRow {
    #[serde(default, deserialize_with = "lenient_int")]
    pub id_grupo: Option<i64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub letra_grupo: Option<String>,
    pub nombre_materia: String,
    pub clave_materia: String,
    #[serde(default)]
    pub clave_turno: Option<String>,
    #[serde(default)]
    pub nombre_plan: Option<String>,
    #[serde(default)]
    pub letra_nivel: Option<String>,
    #[serde(default)]
    pub lunes: Option<String>,
    #[serde(default)]
    pub lunes_clave_salon: Option<String>,
    #[serde(default)]
    pub martes: Option<String>,
    #[serde(default)]
    pub martes_clave_salon: Option<String>,
    #[serde(default)]
    pub miercoles: Option<String>,
    #[serde(default)]
    pub miercoles_clave_salon: Option<String>,
    #[serde(default)]
    pub jueves: Option<String>,
    #[serde(default)]
    pub jueves_clave_salon: Option<String>,
    #[serde(default)]
    pub viernes: Option<String>,
    #[serde(default)]
    pub viernes_clave_salon: Option<String>,
    #[serde(default)]
    pub sabado: Option<String>,
    #[serde(default)]
    pub sabado_clave_salon: Option<String>,
}

/// One class session on one weekday.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScheduleClass {
    pub id_grupo: Option<i64>,
    pub clave_materia: String,
    pub nombre_materia: String,
    pub letra_grupo: Option<String>,
    pub dia: String,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub aula: Option<String>,
    pub nombre_plan: Option<String>,
    pub clave_turno: Option<String>,
    pub letra_nivel: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleView {
    pub classes: Vec<ScheduleClass>,
    pub periodo: Option<Period>,
    pub total_materias: usize,
    pub sesiones_por_dia: BTreeMap<String, usize>,
}
