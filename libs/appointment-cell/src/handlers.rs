use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::auth::Session;
use shared_models::error::AppError;
use student_cell::ProfileService;

use crate::models::{CreateAppointmentRequest, ScheduleQuery, SlotsQuery};
use crate::services::{BookingService, SlotPolicy, StaffService};

// ==============================================================================
// STAFF AND AVAILABILITY
// ==============================================================================

#[axum::debug_handler]
pub async fn list_staff(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let staff = StaffService::new(&config).list_active().await?;

    Ok(Json(json!({
        "staff": staff,
        "total": staff.len(),
    })))
}

#[axum::debug_handler]
pub async fn get_staff_schedule(
    State(config): State<Arc<AppConfig>>,
    Path(staff_id): Path<i64>,
    Query(query): Query<ScheduleQuery>,
) -> Result<Json<Value>, AppError> {
    let windows = StaffService::new(&config)
        .get_schedule(staff_id, query.day_of_week)
        .await?;

    Ok(Json(json!({
        "staff_id": staff_id,
        "day_of_week": query.day_of_week,
        "schedules": windows,
    })))
}

#[axum::debug_handler]
pub async fn get_available_slots(
    State(config): State<Arc<AppConfig>>,
    Path(staff_id): Path<i64>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<Value>, AppError> {
    let policy = SlotPolicy::from_config(&config);
    let slots = StaffService::new(&config)
        .available_slots(staff_id, query.date, &policy)
        .await?;

    Ok(Json(json!({
        "staff_id": staff_id,
        "date": query.date,
        "slots": slots,
    })))
}

// ==============================================================================
// STUDENT APPOINTMENTS
// ==============================================================================

#[axum::debug_handler]
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    BookingService::validate(&request)?;

    let student = ProfileService::new(&config).identity(&session).await?;
    let appointment = BookingService::new(&config).create(&student, request).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "appointment": appointment,
            "message": "Cita agendada exitosamente",
        })),
    ))
}

#[axum::debug_handler]
pub async fn my_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
) -> Result<Json<Value>, AppError> {
    let student = ProfileService::new(&config).identity(&session).await?;
    let appointments = BookingService::new(&config).list_for_student(&student).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len(),
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(session): Extension<Session>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let student = ProfileService::new(&config).identity(&session).await?;
    let appointment = BookingService::new(&config).cancel(&student, appointment_id).await?;

    Ok(Json(json!({
        "appointment": appointment,
        "message": "Cita cancelada exitosamente",
    })))
}
