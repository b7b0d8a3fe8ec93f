use chrono::NaiveDate;
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::SupabaseClient;

use crate::models::{AppointmentError, AppointmentStatus, BookedInterval, ScheduleWindow, Staff, TimeSlot};
use crate::services::availability::{compute_free_slots, weekday_index, SlotPolicy};

pub struct StaffService {
    supabase: SupabaseClient,
}

impl StaffService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Active staff with their consultation room, by first name.
    pub async fn list_active(&self) -> Result<Vec<Staff>, AppointmentError> {
        debug!("Fetching active staff");

        let path = "/rest/v1/staff?active=eq.true\
            &select=id,first_name,last_name,email,consultation_room_id,consultation_rooms(name,location)\
            &order=first_name.asc";

        let staff: Vec<Staff> = self.supabase.request(Method::GET, path, None).await?;
        Ok(staff)
    }

    /// Available windows of one weekday.
    pub async fn get_schedule(&self, staff_id: i64, day_of_week: i32) -> Result<Vec<ScheduleWindow>, AppointmentError> {
        if !(0..=6).contains(&day_of_week) {
            return Err(AppointmentError::ValidationError(
                "El día de la semana debe estar entre 0 (domingo) y 6 (sábado)".to_string(),
            ));
        }

        let path = format!(
            "/rest/v1/schedules?staff_id=eq.{}&day_of_week=eq.{}&available=eq.true&order=start_time.asc",
            staff_id, day_of_week
        );

        let windows: Vec<ScheduleWindow> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(windows)
    }

    /// Pending and confirmed bookings on one date.
    pub async fn get_booked(&self, staff_id: i64, date: NaiveDate) -> Result<Vec<BookedInterval>, AppointmentError> {
        let statuses = AppointmentStatus::BLOCKING
            .iter()
            .map(AppointmentStatus::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let path = format!(
            "/rest/v1/appointments?staff_id=eq.{}&appointment_date=eq.{}&status=in.({})&select=start_time,end_time",
            staff_id,
            date.format("%Y-%m-%d"),
            statuses
        );

        let booked: Vec<BookedInterval> = self.supabase.request(Method::GET, &path, None).await?;
        Ok(booked)
    }

    pub async fn available_slots(
        &self,
        staff_id: i64,
        date: NaiveDate,
        policy: &SlotPolicy,
    ) -> Result<Vec<TimeSlot>, AppointmentError> {
        let day_of_week = weekday_index(date);
        debug!("Computing slots for staff {} on {} (day {})", staff_id, date, day_of_week);

        let windows = self.get_schedule(staff_id, day_of_week).await?;
        if windows.is_empty() {
            return Ok(Vec::new());
        }

        let booked = self.get_booked(staff_id, date).await?;
        let slots = compute_free_slots(&windows, &booked, policy);

        debug!(
            "{} free slots from {} windows and {} bookings",
            slots.len(),
            windows.len(),
            booked.len()
        );
        Ok(slots)
    }
}
