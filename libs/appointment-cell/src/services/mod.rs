pub mod availability;
pub mod booking;
pub mod patient;
pub mod staff;

pub use availability::{compute_free_slots, weekday_index, ConflictRule, SlotPolicy};
pub use booking::BookingService;
pub use patient::PatientService;
pub use staff::StaffService;
