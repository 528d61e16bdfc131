pub const DAYS_PER_WEEK: f64 = 7.0;
pub const DEFAULT_DAILY_WORK_HOURS: f64 = 7.0;

/// Contractual hours expected over `period_days`, pro rata of a week.
///
/// `None` when there is no usable contract or the period is empty.
pub fn expected_hours(hour_contract: Option<i32>, period_days: i64) -> Option<f64> {
    let weekly = hour_contract.filter(|&h| h > 0)?;
    if period_days <= 0 {
        return None;
    }

    Some(f64::from(weekly) * (period_days as f64 / DAYS_PER_WEEK))
}

/// Working days implied by `expected_hours`, at seven hours a day.
///
/// Rounds half up and stays within `[1, period_days]`.
pub fn expected_work_days(expected_hours: Option<f64>, period_days: i64) -> Option<i64> {
    let hours = expected_hours.filter(|&h| h > 0.0)?;
    if period_days <= 0 {
        return None;
    }

    let days = (hours / DEFAULT_DAILY_WORK_HOURS).round() as i64;
    Some(days.max(1).min(period_days))
}
