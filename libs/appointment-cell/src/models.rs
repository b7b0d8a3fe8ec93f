use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use shared_database::SupabaseError;
use shared_models::error::AppError;

/// Store times arrive as `HH:MM:SS` (Postgres `time`); requests and
/// responses use `HH:MM`. Both are accepted on input.
pub mod clock {
    use chrono::{NaiveTime, Timelike};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn parse(raw: &str) -> Option<NaiveTime> {
        let raw = raw.trim();
        NaiveTime::parse_from_str(raw, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
            .ok()
    }

    /// Slots and bookings are matched to the minute.
    pub fn to_minute(time: NaiveTime) -> NaiveTime {
        NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
    }

    pub fn label(time: &NaiveTime) -> String {
        time.format("%H:%M").to_string()
    }

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&label(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid time '{}'", raw)))
    }
}

// ==============================================================================
// STAFF AND SCHEDULES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConsultationRoom {
    pub name: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Staff {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub consultation_room_id: Option<i64>,
    #[serde(default)]
    pub consultation_rooms: Option<ConsultationRoom>,
}

/// Recurring weekly availability of one staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleWindow {
    #[serde(default)]
    pub id: Option<i64>,
    pub staff_id: i64,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: i32,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    #[serde(default = "default_available")]
    pub available: bool,
}

fn default_available() -> bool {
    true
}

/// Time taken by a pending or confirmed appointment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookedInterval {
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
}

/// A bookable unit. Serialized as its `HH:MM` start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeSlot {
    pub start: NaiveTime,
}

impl TimeSlot {
    pub fn new(start: NaiveTime) -> Self {
        Self { start }
    }

    pub fn label(&self) -> String {
        clock::label(&self.start)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl Serialize for TimeSlot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

// ==============================================================================
// APPOINTMENTS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Statuses that keep a slot taken.
    pub const BLOCKING: [AppointmentStatus; 2] = [AppointmentStatus::Pending, AppointmentStatus::Confirmed];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "pending",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::NoShow => "no_show",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentStaff {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub consultation_rooms: Option<ConsultationRoom>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub staff_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(with = "clock")]
    pub start_time: NaiveTime,
    #[serde(with = "clock")]
    pub end_time: NaiveTime,
    pub status: AppointmentStatus,
    pub consultation_type: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff: Option<AppointmentStaff>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub nu_control: String,
    pub assigned_psychologist: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub staff_id: i64,
    pub appointment_date: NaiveDate,
    pub start_time: String,
    pub consultation_type: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleQuery {
    pub day_of_week: i32,
}

#[derive(Debug, Deserialize)]
pub struct SlotsQuery {
    pub date: NaiveDate,
}

// ==============================================================================
// ERRORS
// ==============================================================================

pub const SLOT_TAKEN: &str = "Ya existe una cita en este horario";

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("{0}")]
    ValidationError(String),

    #[error("{}", SLOT_TAKEN)]
    SlotTaken,

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<anyhow::Error> for AppointmentError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<SupabaseError>() {
            Some(SupabaseError::Conflict(_)) => AppointmentError::SlotTaken,
            _ => AppointmentError::DatabaseError(err.to_string()),
        }
    }
}

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound("Cita no encontrada".to_string()),
            AppointmentError::ValidationError(msg) => AppError::BadRequest(msg),
            AppointmentError::SlotTaken => AppError::Conflict(SLOT_TAKEN.to_string()),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_times_accept_both_formats() {
        let window: ScheduleWindow = serde_json::from_value(json!({
            "staff_id": 1,
            "day_of_week": 1,
            "start_time": "07:00:00",
            "end_time": "09:30"
        }))
        .unwrap();

        assert_eq!(window.start_time, NaiveTime::from_hms_opt(7, 0, 0).unwrap());
        assert_eq!(window.end_time, NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(window.available);
        assert_eq!(serde_json::to_value(&window).unwrap()["start_time"], "07:00");
    }

    #[test]
    fn test_slot_serializes_as_label() {
        let slot = TimeSlot::new(NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(serde_json::to_value(slot).unwrap(), json!("08:00"));
    }

    #[test]
    fn test_conflict_maps_to_slot_taken() {
        let err: AppointmentError = anyhow::Error::new(SupabaseError::Conflict("duplicate key".into())).into();
        assert!(matches!(err, AppointmentError::SlotTaken));

        let app: AppError = err.into();
        assert!(matches!(app, AppError::Conflict(msg) if msg == SLOT_TAKEN));
    }

    #[test]
    fn test_blocking_statuses() {
        assert!(AppointmentStatus::BLOCKING.contains(&AppointmentStatus::Pending));
        assert!(AppointmentStatus::BLOCKING.contains(&AppointmentStatus::Confirmed));
        assert!(!AppointmentStatus::BLOCKING.contains(&AppointmentStatus::Cancelled));
        assert_eq!(
            serde_json::to_value(AppointmentStatus::NoShow).unwrap(),
            json!("no_show")
        );
    }
}
