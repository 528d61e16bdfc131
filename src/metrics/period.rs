use chrono::{NaiveDate, TimeDelta};

use crate::error::AttendanceError;

pub const MAX_PERIOD_DAYS: i64 = 365;
pub const DEFAULT_TEAM_PERIOD_DAYS: i64 = 30;

/// A validated window length, `1..=365` days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period(i64);

impl Period {
    pub fn new(days: i64) -> Result<Self, AttendanceError> {
        if days <= 0 {
            return Err(AttendanceError::validation(
                "Period needs to be a positive integer.",
            ));
        }
        if days > MAX_PERIOD_DAYS {
            return Err(AttendanceError::validation(format!(
                "Period too long, max is {MAX_PERIOD_DAYS} days."
            )));
        }
        Ok(Period(days))
    }

    pub fn days(self) -> i64 {
        self.0
    }

    /// The `days`-long window ending on `today`, inclusive.
    pub fn ending_on(self, today: NaiveDate) -> DayRange {
        DayRange {
            start: today - TimeDelta::days(self.0 - 1),
            end: today,
        }
    }
}

/// Inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DayRange {
    /// The equal-length range right before this one.
    pub fn preceding(self) -> DayRange {
        let len = (self.end - self.start).num_days();
        let end = self.start - TimeDelta::days(1);
        DayRange {
            start: end - TimeDelta::days(len),
            end,
        }
    }

    pub fn days(self) -> impl Iterator<Item = NaiveDate> {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    pub fn contains(self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}
