use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Source of the local wall-clock time. "Today" is always derived from it.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }

    /// Current time of day, truncated to whole seconds.
    fn time_of_day(&self) -> NaiveTime {
        let t = self.now().time();
        t.with_nanosecond(0).unwrap_or(t)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock stopped at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}
