use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::duration::entry_seconds;
use crate::model::attendance::AttendanceEntry;

/// Totals over a collection of entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregate {
    pub total_seconds: i64,
    /// Days whose summed duration is strictly positive.
    pub worked_days: u32,
    pub daily: BTreeMap<NaiveDate, i64>,
}

impl Aggregate {
    pub fn seconds_on(&self, day: NaiveDate) -> i64 {
        self.daily.get(&day).copied().unwrap_or(0)
    }
}

pub fn aggregate<'a, I>(entries: I) -> Aggregate
where
    I: IntoIterator<Item = &'a AttendanceEntry>,
{
    let mut daily: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    for entry in entries {
        *daily.entry(entry.day).or_default() += entry_seconds(entry);
    }

    let total_seconds = daily.values().sum();
    let worked_days = daily.values().filter(|&&secs| secs > 0).count() as u32;

    Aggregate {
        total_seconds,
        worked_days,
        daily,
    }
}
