//! Pure temporal aggregation: shift durations, per-day totals, contractual
//! expectations and presence scoring. Nothing here touches the store.

pub mod aggregate;
pub mod duration;
pub mod expectation;
pub mod period;
pub mod presence;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

/// Rounds to two decimals for presentation.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn hours(seconds: i64) -> f64 {
    seconds as f64 / SECONDS_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_to_two_decimals() {
        assert_eq!(round2(1.234_9), 1.23);
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.0), 0.0);
        assert_eq!(round2(hours(5400)), 1.5);
    }
}
