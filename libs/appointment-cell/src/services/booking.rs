use chrono::NaiveTime;
use regex::Regex;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::SupabaseClient;
use student_cell::StudentIdentity;

use crate::models::{clock, Appointment, AppointmentError, AppointmentStatus, CreateAppointmentRequest};
use crate::services::availability::SlotPolicy;
use crate::services::patient::PatientService;

pub const DEFAULT_CONSULTATION_TYPE: &str = "Consulta general";

const APPOINTMENT_SELECT: &str = "*,staff(first_name,last_name,consultation_rooms(name,location))";

pub struct BookingService {
    supabase: SupabaseClient,
    patients: PatientService,
    policy: SlotPolicy,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            patients: PatientService::new(config),
            policy: SlotPolicy::from_config(config),
        }
    }

    /// Checks the request shape and returns the parsed start time.
    pub fn validate(request: &CreateAppointmentRequest) -> Result<NaiveTime, AppointmentError> {
        if request.staff_id <= 0 {
            return Err(AppointmentError::ValidationError("Debe seleccionar un psicólogo".to_string()));
        }

        let start_time = request.start_time.trim();
        if start_time.is_empty() {
            return Err(AppointmentError::ValidationError("La hora de inicio es requerida".to_string()));
        }

        let well_formed = Regex::new(r"^([01]\d|2[0-3]):[0-5]\d(:[0-5]\d)?$")
            .map(|re| re.is_match(start_time))
            .unwrap_or(false);

        well_formed
            .then(|| clock::parse(start_time))
            .flatten()
            .map(clock::to_minute)
            .ok_or_else(|| AppointmentError::ValidationError("La hora de inicio debe tener formato HH:MM".to_string()))
    }

    /// Upsert the student as a patient and book a pending appointment
    /// lasting one slot.
    pub async fn create(
        &self,
        student: &StudentIdentity,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        let start_time = Self::validate(&request)?;

        let (end_time, wrapped) = start_time.overflowing_add_signed(self.policy.slot);
        if wrapped != 0 {
            return Err(AppointmentError::ValidationError(
                "La cita debe terminar el mismo día".to_string(),
            ));
        }

        let patient = self.patients.upsert(student, request.staff_id).await?;

        let consultation_type = request
            .consultation_type
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CONSULTATION_TYPE.to_string());

        let body = json!({
            "patient_id": patient.id,
            "staff_id": request.staff_id,
            "appointment_date": request.appointment_date.format("%Y-%m-%d").to_string(),
            "start_time": start_time.format("%H:%M:%S").to_string(),
            "end_time": end_time.format("%H:%M:%S").to_string(),
            "status": AppointmentStatus::Pending,
            "consultation_type": consultation_type,
            "notes": request.notes,
        });

        let created: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &format!("/rest/v1/appointments?select={}", APPOINTMENT_SELECT),
                Some(body),
                Some(SupabaseClient::return_representation()),
            )
            .await
            .map_err(|e| {
                let err = AppointmentError::from(e);
                if matches!(err, AppointmentError::SlotTaken) {
                    warn!(
                        "Slot {} {} already booked for staff {}",
                        request.appointment_date,
                        clock::label(&start_time),
                        request.staff_id
                    );
                }
                err
            })?;

        let appointment = created
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("Appointment insert returned no rows".to_string()))?;

        info!("Appointment {} booked for patient {}", appointment.id, patient.id);
        Ok(appointment)
    }

    /// The student's appointments, newest date first. Empty when the student
    /// never booked.
    pub async fn list_for_student(&self, student: &StudentIdentity) -> Result<Vec<Appointment>, AppointmentError> {
        let Some(patient) = self.patients.find_by_control(&student.numero_control).await? else {
            debug!("No patient record for {}", student.numero_control);
            return Ok(Vec::new());
        };

        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&select={}&order=appointment_date.desc",
            patient.id, APPOINTMENT_SELECT
        );

        let appointments: Vec<Appointment> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(appointments)
    }

    /// Cancel one of the student's own appointments.
    pub async fn cancel(&self, student: &StudentIdentity, appointment_id: i64) -> Result<Appointment, AppointmentError> {
        let patient = self
            .patients
            .find_by_control(&student.numero_control)
            .await?
            .ok_or(AppointmentError::NotFound)?;

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&patient_id=eq.{}",
            appointment_id, patient.id
        );

        let updated: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "status": AppointmentStatus::Cancelled })),
                Some(SupabaseClient::return_representation()),
            )
            .await?;

        let appointment = updated.into_iter().next().ok_or(AppointmentError::NotFound)?;

        info!("Appointment {} cancelled", appointment.id);
        Ok(appointment)
    }
}
