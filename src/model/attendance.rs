use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One attendance record for a user on a calendar day.
///
/// `(user_id, day)` is the natural key: the store never holds two entries
/// for the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceEntry {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-01-02", value_type = String, format = "date")]
    pub day: NaiveDate,

    #[schema(example = "09:00:00", value_type = Option<String>, nullable = true)]
    pub clock_in: Option<NaiveTime>,

    #[schema(example = "17:30:00", value_type = Option<String>, nullable = true)]
    pub clock_out: Option<NaiveTime>,
}

/// Where a `(user, day)` pair sits in the clock-in/clock-out lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    NoEntry,
    Open,
    Closed,
}

impl EntryState {
    pub fn of(entry: Option<&AttendanceEntry>) -> Self {
        match entry {
            None => EntryState::NoEntry,
            Some(e) if e.clock_out.is_some() => EntryState::Closed,
            Some(_) => EntryState::Open,
        }
    }
}

impl AttendanceEntry {
    pub fn state(&self) -> EntryState {
        EntryState::of(Some(self))
    }

    /// Clocked in and not yet clocked out.
    pub fn is_open(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_none()
    }
}

/// Insert payload for a fresh clock-in.
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub user_id: u64,
    pub day: NaiveDate,
    pub clock_in: NaiveTime,
}
