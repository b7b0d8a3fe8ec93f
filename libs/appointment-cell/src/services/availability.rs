//! Free-slot computation for one staff member on one date.
//!
//! Pure functions over already-fetched windows and bookings: no I/O, no
//! shared state, same output for the same input. The store's uniqueness
//! constraint stays authoritative; these slots are advisory.

use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use tracing::warn;

use shared_config::AppConfig;

use crate::models::{clock, BookedInterval, ScheduleWindow, TimeSlot};

pub const DEFAULT_SLOT_MINUTES: i64 = 60;

/// When a booking takes a generated slot away.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictRule {
    /// The booking starts at the slot start, compared to the minute. A
    /// booking that falls between slot boundaries blocks nothing.
    #[default]
    ExactStart,
    /// Any overlap between the slot and the booking.
    Overlap,
}

impl ConflictRule {
    pub fn blocks(&self, slot_start: NaiveTime, slot_end: NaiveTime, booked: &BookedInterval) -> bool {
        match self {
            ConflictRule::ExactStart => clock::to_minute(slot_start) == clock::to_minute(booked.start_time),
            ConflictRule::Overlap => slot_start < booked.end_time && booked.start_time < slot_end,
        }
    }
}

impl FromStr for ConflictRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact_start" | "exact" => Ok(ConflictRule::ExactStart),
            "overlap" => Ok(ConflictRule::Overlap),
            other => Err(format!("unknown slot conflict rule '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotPolicy {
    pub slot: Duration,
    pub conflict: ConflictRule,
    /// Collapse equal starts produced by overlapping windows.
    pub deduplicate: bool,
}

impl Default for SlotPolicy {
    fn default() -> Self {
        Self {
            slot: Duration::minutes(DEFAULT_SLOT_MINUTES),
            conflict: ConflictRule::ExactStart,
            deduplicate: false,
        }
    }
}

impl SlotPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        let defaults = Self::default();

        let slot = if config.slot_minutes > 0 {
            Duration::minutes(config.slot_minutes)
        } else {
            warn!("SLOT_MINUTES must be positive, using {}", DEFAULT_SLOT_MINUTES);
            defaults.slot
        };

        let conflict = config.slot_conflict_rule.parse().unwrap_or_else(|e| {
            warn!("{}, using exact_start", e);
            defaults.conflict
        });

        Self {
            slot,
            conflict,
            deduplicate: config.slot_deduplicate,
        }
    }
}

/// 0 = Sunday .. 6 = Saturday, the convention of `schedules.day_of_week`.
pub fn weekday_index(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// Walk every window in `policy.slot` steps, drop the slots a booking
/// blocks, and return the rest ordered by start. Overlapping windows yield
/// repeated starts unless `policy.deduplicate` is set.
pub fn compute_free_slots(
    windows: &[ScheduleWindow],
    booked: &[BookedInterval],
    policy: &SlotPolicy,
) -> Vec<TimeSlot> {
    if policy.slot <= Duration::zero() {
        return Vec::new();
    }

    let mut slots = Vec::new();

    for window in windows {
        let mut start = window.start_time;

        while start < window.end_time {
            let (next, wrapped) = start.overflowing_add_signed(policy.slot);
            // A slot running past midnight ends with its window.
            let end = if wrapped != 0 { window.end_time } else { next };

            let taken = booked
                .iter()
                .any(|interval| policy.conflict.blocks(start, end, interval));
            if !taken {
                slots.push(TimeSlot::new(start));
            }

            if wrapped != 0 {
                break;
            }
            start = next;
        }
    }

    slots.sort();
    if policy.deduplicate {
        slots.dedup();
    }

    slots
}
