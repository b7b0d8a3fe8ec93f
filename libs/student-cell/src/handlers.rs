use std::sync::Arc;

use axum::{
    extract::{Extension, Query, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use shared_models::upstream::ErrorKind;
use shared_upstream::Normalized;

use crate::models::{KardexFilter, Records};
use crate::services::{GradesService, KardexService, ProfileService, ScheduleService};

// Every academic response says whether the data passed validation.
fn envelope<T: Serialize>(data: T, validated: bool, extra: Value) -> Json<Value> {
    let mut body = json!({
        "data": data,
        "validated": validated,
    });
    if !validated {
        body["warning"] = json!(ErrorKind::ValidationFallback);
    }
    if let (Some(fields), Value::Object(extra)) = (body.as_object_mut(), extra) {
        fields.extend(extra);
    }
    Json(body)
}

fn records<T: Serialize>(records: Records<T>) -> Json<Value> {
    envelope(records.data, records.validated, Value::Null)
}

#[axum::debug_handler]
pub async fn get_profile(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let service = ProfileService::new(&config);

    let body = match service.fetch(&session).await? {
        Normalized::Validated(info) => envelope(info, true, Value::Null),
        Normalized::RawFallback { payload, .. } => envelope(payload, false, Value::Null),
    };

    Ok(body)
}

#[axum::debug_handler]
pub async fn get_grades(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let service = GradesService::new(&config);

    Ok(records(service.fetch(&session).await?))
}

#[axum::debug_handler]
pub async fn get_kardex(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    Query(filter): Query<KardexFilter>,
) -> Result<Json<Value>, AppError> {
    let service = KardexService::new(&config);

    Ok(records(service.fetch(&session, &filter).await?))
}

#[axum::debug_handler]
pub async fn get_schedule(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let service = ScheduleService::new(&config);

    let Records { data, validated } = service.fetch(&session).await?;
    let metadata = json!({
        "metadata": {
            "periodo": data.periodo,
            "total_materias": data.total_materias,
            "sesiones_por_dia": data.sesiones_por_dia,
        }
    });

    Ok(envelope(data.classes, validated, metadata))
}
