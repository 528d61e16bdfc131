use super::expectation::{expected_hours, expected_work_days};

/// Presence score in `0..=100` for one member over `period_days`.
///
/// Days present are compared with the contract's expected working days,
/// or with the raw period length when there is no contract.
pub fn presence_score(hour_contract: Option<i32>, period_days: i64, days_present: u32) -> u8 {
    let denominator = expected_work_days(expected_hours(hour_contract, period_days), period_days)
        .unwrap_or(period_days);
    if denominator <= 0 {
        return 0;
    }

    let ratio = (f64::from(days_present) / denominator as f64).clamp(0.0, 1.0);
    (ratio * 100.0).round() as u8
}

/// Percentage of expected attendance achieved, clamped to `[0, 100]`.
///
/// With an expectation in seconds the actual seconds are compared against
/// it, otherwise worked days against the period length.
pub fn presence_rate(
    expected_seconds: Option<f64>,
    actual_seconds: i64,
    worked_days: u32,
    period_days: i64,
) -> f64 {
    match expected_seconds {
        Some(expected) if expected > 0.0 => capped_ratio(actual_seconds as f64 / expected) * 100.0,
        _ if period_days > 0 => capped_ratio(f64::from(worked_days) / period_days as f64) * 100.0,
        _ => 0.0,
    }
}

pub fn capped_ratio(ratio: f64) -> f64 {
    ratio.clamp(0.0, 1.0)
}
