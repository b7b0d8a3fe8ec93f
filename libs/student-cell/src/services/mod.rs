pub mod grades;
pub mod kardex;
pub mod profile;
pub mod schedule;

pub use grades::GradesService;
pub use kardex::KardexService;
pub use profile::ProfileService;
pub use schedule::ScheduleService;
