use chrono::{NaiveDate, NaiveTime, TimeDelta};

use crate::model::attendance::AttendanceEntry;

/// Elapsed seconds of a single shift.
///
/// A missing clock-in or clock-out yields 0. A clock-out earlier than the
/// clock-in is a shift that crossed midnight.
pub fn shift_seconds(day: NaiveDate, clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> i64 {
    let (Some(clock_in), Some(clock_out)) = (clock_in, clock_out) else {
        return 0;
    };

    let start = day.and_time(clock_in);
    let mut end = day.and_time(clock_out);
    if end < start {
        end += TimeDelta::days(1);
    }

    (end - start).num_seconds()
}

pub fn entry_seconds(entry: &AttendanceEntry) -> i64 {
    shift_seconds(entry.day, entry.clock_in, entry.clock_out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 2).unwrap()
    }

    #[test]
    fn regular_shift() {
        assert_eq!(shift_seconds(day(), t(9, 0), t(17, 0)), 8 * 3600);
    }

    #[test]
    fn overnight_shift_wraps_past_midnight() {
        assert_eq!(shift_seconds(day(), t(22, 0), t(2, 0)), 14_400);
        // (24h - 23:30) + 00:15
        assert_eq!(shift_seconds(day(), t(23, 30), t(0, 15)), 45 * 60);
    }

    #[test]
    fn incomplete_shift_counts_nothing() {
        assert_eq!(shift_seconds(day(), t(9, 0), None), 0);
        assert_eq!(shift_seconds(day(), None, t(9, 0)), 0);
        assert_eq!(shift_seconds(day(), None, None), 0);
    }

    #[test]
    fn equal_times_are_zero_not_a_full_day() {
        assert_eq!(shift_seconds(day(), t(9, 0), t(9, 0)), 0);
    }
}
