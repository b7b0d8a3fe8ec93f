use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use chrono::{Duration, Utc};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::Session;

pub struct TestConfig {
    pub upstream_api_url: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            upstream_api_url: "http://localhost:4010/api".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Both the upstream API and the store pointed at one mock server.
    pub fn with_mock_server(uri: &str) -> Self {
        Self {
            upstream_api_url: format!("{}/api", uri),
            supabase_url: uri.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            upstream_api_url: self.upstream_api_url.clone(),
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            ..AppConfig::default()
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TokenTestUtils;

impl TokenTestUtils {
    fn encode(claims: Value) -> String {
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let claims_encoded = general_purpose::URL_SAFE_NO_PAD.encode(claims.to_string());
        let signature = general_purpose::URL_SAFE_NO_PAD.encode("not-verified");

        format!("{}.{}.{}", header_encoded, claims_encoded, signature)
    }

    pub fn create_token_expiring_at(exp: i64) -> String {
        Self::encode(json!({
            "sub": 12345,
            "iat": exp - 3600,
            "exp": exp
        }))
    }

    pub fn create_test_token(exp_hours: i64) -> String {
        Self::create_token_expiring_at((Utc::now() + Duration::hours(exp_hours)).timestamp())
    }

    pub fn create_expired_token() -> String {
        Self::create_test_token(-1)
    }

    pub fn create_token_without_expiry() -> String {
        Self::encode(json!({ "sub": "20030001" }))
    }

    pub fn session() -> Session {
        Session::new(Self::create_test_token(1))
    }
}

pub struct MockUpstreamResponses;

impl MockUpstreamResponses {
    pub fn envelope(data: Value) -> Value {
        json!({
            "responseCodeTxt": "OK",
            "status": 200,
            "flag": "success",
            "type": "success",
            "message": "",
            "data": data
        })
    }

    pub fn error_envelope(status: u16, message: &str) -> Value {
        json!({
            "responseCodeTxt": message,
            "status": status,
            "flag": "error",
            "message": message
        })
    }

    pub fn student_info(numero_control: &str) -> Value {
        json!({
            "numero_control": numero_control,
            "persona": "ANA SOFIA LOPEZ GARCIA",
            "email": format!("{}@celaya.tecnm.mx", numero_control),
            "semestre": 5,
            "num_mat_rep_no_acreditadas": "0",
            "creditos_acumulados": "150",
            "promedio_ponderado": "89.456",
            "promedio_aritmetico": 88,
            "materias_cursadas": "30",
            "materias_reprobadas": "1",
            "materias_aprobadas": "29",
            "creditos_complementarios": 5,
            "porcentaje_avance": 58,
            "num_materias_rep_primera": 1,
            "num_materias_rep_segunda": null,
            "percentaje_avance_cursando": 65
        })
    }

    pub fn grades_period() -> Value {
        json!({
            "periodo": {
                "clave_periodo": "20243",
                "anio": 2024,
                "descripcion_periodo": "AGOSTO-DICIEMBRE 2024"
            },
            "materias": [
                {
                    "materia": {
                        "id_grupo": 101,
                        "nombre_materia": "CALCULO INTEGRAL",
                        "clave_materia": "ACF0902",
                        "letra_grupo": "A"
                    },
                    "calificaiones": [
                        { "id_calificacion": 1, "numero_calificacion": 1, "calificacion": "90" },
                        { "id_calificacion": 2, "numero_calificacion": 2, "calificacion": 80 },
                        { "id_calificacion": 3, "numero_calificacion": 3, "calificacion": null }
                    ]
                },
                {
                    "materia": {
                        "id_grupo": 102,
                        "nombre_materia": "QUIMICA",
                        "clave_materia": "AEC1058",
                        "letra_grupo": "B"
                    },
                    "calificaiones": []
                }
            ]
        })
    }

    pub fn kardex() -> Value {
        json!({
            "porcentaje_avance": 58.5,
            "kardex": [
                {
                    "clave_materia": "ACF0901",
                    "nombre_materia": "CALCULO DIFERENCIAL",
                    "creditos": "5",
                    "calificacion": "95",
                    "periodo": "20231",
                    "semestre": 1,
                    "descripcion": "NORMAL / ORDINARIO"
                },
                {
                    "clave_materia": "ACA0907",
                    "nombre_materia": "TALLER DE ETICA",
                    "creditos": 4,
                    "calificacion": "AC",
                    "periodo": "20231",
                    "semestre": "1",
                    "descripcion": "NORMAL / ORDINARIO"
                },
                {
                    "clave_materia": "AEF1052",
                    "nombre_materia": "PROBABILIDAD Y ESTADISTICA",
                    "creditos": 5,
                    "calificacion": 60,
                    "periodo": "20233",
                    "semestre": 2,
                    "descripcion": "REPETICION",
                    "estatus": "REPROBADA"
                }
            ]
        })
    }

    pub fn schedule() -> Value {
        json!([{
            "periodo": {
                "clave_periodo": "20251",
                "anio": 2025,
                "descripcion_periodo": "ENERO-JUNIO 2025"
            },
            "horario": [
                {
                    "id_grupo": 3001,
                    "letra_grupo": "A",
                    "nombre_materia": "BASES DE DATOS",
                    "clave_materia": "AEF1031",
                    "clave_turno": "M",
                    "nombre_plan": "ISIC-2010-224",
                    "letra_nivel": "L",
                    "lunes": "07:00-09:00",
                    "lunes_clave_salon": "F1",
                    "martes": null,
                    "martes_clave_salon": null,
                    "miercoles": "07:00 - 09:00",
                    "miercoles_clave_salon": "F1",
                    "jueves": "",
                    "jueves_clave_salon": null,
                    "viernes": null,
                    "viernes_clave_salon": null,
                    "sabado": null,
                    "sabado_clave_salon": null
                },
                {
                    "id_grupo": 3002,
                    "letra_grupo": "B",
                    "nombre_materia": "REDES",
                    "clave_materia": "SCD1021",
                    "clave_turno": "M",
                    "nombre_plan": "ISIC-2010-224",
                    "letra_nivel": "L",
                    "lunes": "09:00-10:00",
                    "lunes_clave_salon": null,
                    "martes": null,
                    "martes_clave_salon": null,
                    "miercoles": null,
                    "miercoles_clave_salon": null,
                    "jueves": null,
                    "jueves_clave_salon": null,
                    "viernes": "11:00-13:00",
                    "viernes_clave_salon": "LC2",
                    "sabado": null,
                    "sabado_clave_salon": null
                }
            ]
        }])
    }

    pub fn login_success(token: &str) -> Value {
        json!({
            "responseCodeTxt": "OK",
            "status": 200,
            "message": {
                "login": { "token": token }
            }
        })
    }
}

pub struct MockStoreResponses;

impl MockStoreResponses {
    pub fn staff(id: i64, first_name: &str) -> Value {
        json!({
            "id": id,
            "first_name": first_name,
            "last_name": "PEREZ",
            "email": format!("{}@celaya.tecnm.mx", first_name.to_lowercase()),
            "consultation_room_id": 1,
            "consultation_rooms": { "name": "Cubículo 1", "location": "Edificio A" }
        })
    }

    pub fn schedule_window(id: i64, staff_id: i64, day_of_week: i32, start: &str, end: &str) -> Value {
        json!({
            "id": id,
            "staff_id": staff_id,
            "day_of_week": day_of_week,
            "start_time": start,
            "end_time": end,
            "available": true
        })
    }

    pub fn booked(start: &str, end: &str) -> Value {
        json!({ "start_time": start, "end_time": end })
    }

    pub fn patient(id: i64, nu_control: &str) -> Value {
        json!({
            "id": id,
            "first_name": "ANA",
            "last_name": "SOFIA LOPEZ GARCIA",
            "email": format!("{}@celaya.tecnm.mx", nu_control),
            "nu_control": nu_control,
            "assigned_psychologist": 1
        })
    }

    pub fn appointment(id: i64, patient_id: i64, staff_id: i64, status: &str) -> Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "staff_id": staff_id,
            "appointment_date": "2025-03-10",
            "start_time": "10:00:00",
            "end_time": "11:00:00",
            "status": status,
            "consultation_type": "Consulta general",
            "notes": null,
            "created_at": "2025-03-01T12:00:00Z"
        })
    }
}
