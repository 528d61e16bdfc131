use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, instrument};
use utoipa::ToSchema;

use super::AttendanceService;
use crate::auth::capability::Capabilities;
use crate::clock::Clock;
use crate::error::AttendanceError;
use crate::metrics::{
    SECONDS_PER_HOUR,
    aggregate::{Aggregate, aggregate},
    expectation::{expected_hours, expected_work_days},
    hours,
    period::Period,
    presence::{capped_ratio, presence_rate},
    round2,
};
use crate::store::AttendanceStore;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DailyTotal {
    #[schema(example = "2026-01-02", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 27000.0)]
    pub total_seconds: f64,
    #[schema(example = 7.5)]
    pub total_hours: f64,
}

/// Workload metrics of one user over the last `period` days, compared with
/// the equal-length window right before it.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct KpiReport {
    pub total_seconds: f64,
    pub total_hours: f64,
    pub average_hours_per_day: f64,
    pub average_hours_per_workday: f64,
    /// 0 to 100.
    pub presence_rate: f64,
    /// Contract-relative when a contract exists, literal day count otherwise.
    pub worked_days: i64,
    /// Working days expected over the period (the period itself without a contract).
    pub period_days: i64,
    pub has_contract: bool,
    pub previous_total_seconds: f64,
    pub previous_total_hours: f64,
    pub previous_presence_rate: f64,
    pub previous_average_hours_per_workday: f64,
    /// One row per day of the current window, oldest first.
    pub daily_totals: Vec<DailyTotal>,
}

fn average_per_workday(agg: &Aggregate) -> f64 {
    if agg.worked_days == 0 {
        0.0
    } else {
        hours(agg.total_seconds) / f64::from(agg.worked_days)
    }
}

impl<S: AttendanceStore, C: Clock> AttendanceService<S, C> {
    /// Computes the KPI report for `target_user_id`, or for the caller when
    /// no target is given.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), target_user_id = ?target_user_id, period = period))]
    pub async fn compute_kpis(
        &self,
        caller: &impl Capabilities,
        target_user_id: Option<u64>,
        period: i64,
    ) -> Result<KpiReport, AttendanceError> {
        let period = Period::new(period)?;
        let target_user_id = match target_user_id {
            Some(id) => id,
            None => caller.require_auth()?,
        };
        let target = self
            .store
            .find_user(target_user_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found("Requested user does not exist."))?;

        let days = period.days();
        let expected_hours = expected_hours(target.hour_contract, days);
        let expected_work_days = expected_work_days(expected_hours, days).unwrap_or(days);
        let expected_seconds = expected_hours
            .map(|h| h * SECONDS_PER_HOUR)
            .filter(|&s| s > 0.0);
        let has_contract = expected_seconds.is_some();

        let current_range = period.ending_on(self.clock.today());
        let previous_range = current_range.preceding();

        let current = aggregate(
            &self
                .store
                .entries_between(&[target.id], current_range)
                .await?,
        );
        let previous = aggregate(
            &self
                .store
                .entries_between(&[target.id], previous_range)
                .await?,
        );
        debug!(
            current_seconds = current.total_seconds,
            previous_seconds = previous.total_seconds,
            has_contract,
            "Aggregated attendance windows"
        );

        let worked_days = match expected_seconds {
            Some(expected) => {
                let ratio = capped_ratio(current.total_seconds as f64 / expected);
                ((expected_work_days as f64 * ratio).ceil() as i64).clamp(0, expected_work_days)
            }
            None => i64::from(current.worked_days),
        };

        let daily_totals = current_range
            .days()
            .map(|day| {
                let secs = current.seconds_on(day);
                DailyTotal {
                    day,
                    total_seconds: round2(secs as f64),
                    total_hours: round2(hours(secs)),
                }
            })
            .collect();

        Ok(KpiReport {
            total_seconds: round2(current.total_seconds as f64),
            total_hours: round2(hours(current.total_seconds)),
            average_hours_per_day: round2(hours(current.total_seconds) / days as f64),
            average_hours_per_workday: round2(average_per_workday(&current)),
            presence_rate: round2(presence_rate(
                expected_seconds,
                current.total_seconds,
                current.worked_days,
                days,
            )),
            worked_days,
            period_days: expected_work_days,
            has_contract,
            previous_total_seconds: round2(previous.total_seconds as f64),
            previous_total_hours: round2(hours(previous.total_seconds)),
            previous_presence_rate: round2(presence_rate(
                expected_seconds,
                previous.total_seconds,
                previous.worked_days,
                days,
            )),
            previous_average_hours_per_workday: round2(average_per_workday(&previous)),
            daily_totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::capability::Anonymous;
    use crate::service::fixtures::*;
    use testresult::TestResult;

    #[actix_web::test]
    async fn period_bounds_are_validated_first() {
        let svc = service();

        for bad in [0, -1, 366, 400] {
            let result = svc.compute_kpis(&Anonymous, Some(BOB), bad).await;
            assert!(matches!(result, Err(AttendanceError::Validation(_))), "period {bad}");
        }

        let Err(AttendanceError::Validation(msg)) = svc.compute_kpis(&caller(BOB), None, 400).await
        else {
            panic!("period 400 must fail validation");
        };
        assert!(msg.to_lowercase().contains("period too long"));
    }

    #[actix_web::test]
    async fn defaulted_target_requires_authentication() {
        let svc = service();

        let result = svc.compute_kpis(&Anonymous, None, 7).await;

        assert!(matches!(result, Err(AttendanceError::Unauthenticated)));
    }

    #[actix_web::test]
    async fn unknown_target_is_not_found() {
        let svc = service();

        let result = svc.compute_kpis(&caller(BOB), Some(4242), 7).await;

        assert!(matches!(result, Err(AttendanceError::NotFound(_))));
    }

    #[actix_web::test]
    async fn contract_relative_metrics() -> TestResult {
        let svc = service();
        // 35h contract over 14 days: 70 expected hours, 10 expected days.
        // Current window: five 7h shifts, one of them overnight.
        for offset in [0, -1, -2, -3] {
            seed_shift(&svc, BOB, day(offset), hm(9, 0), Some(hm(16, 0))).await;
        }
        seed_shift(&svc, BOB, day(-5), hm(22, 0), Some(hm(5, 0))).await;
        // Previous window: a single 14h day.
        seed_shift(&svc, BOB, day(-14), hm(6, 0), Some(hm(20, 0))).await;
        // outside both windows
        seed_shift(&svc, BOB, day(-28), hm(6, 0), Some(hm(20, 0))).await;

        let report = svc.compute_kpis(&caller(BOB), None, 14).await?;

        assert!(report.has_contract);
        assert_eq!(report.total_seconds, 35.0 * 3600.0);
        assert_eq!(report.total_hours, 35.0);
        assert_eq!(report.average_hours_per_day, 2.5);
        assert_eq!(report.average_hours_per_workday, 7.0);
        assert_eq!(report.presence_rate, 50.0);
        assert_eq!(report.period_days, 10);
        assert_eq!(report.worked_days, 5);
        assert_eq!(report.previous_total_hours, 14.0);
        assert_eq!(report.previous_presence_rate, 20.0);
        assert_eq!(report.previous_average_hours_per_workday, 14.0);
        Ok(())
    }

    #[actix_web::test]
    async fn displayed_worked_days_round_up_and_rate_is_capped() -> TestResult {
        let svc = service();
        // 35h over 7 days: 5 expected days. 12h worked is 34.3% -> ceil(1.71) = 2 days.
        seed_shift(&svc, BOB, day(-1), hm(8, 0), Some(hm(20, 0))).await;

        let report = svc.compute_kpis(&caller(ZOE_ADMIN), Some(BOB), 7).await?;
        assert_eq!(report.worked_days, 2);
        assert_eq!(report.presence_rate, 34.29);

        // heavy overtime never exceeds 100% nor the expected day count
        for offset in [0, -2, -3, -4, -5, -6] {
            seed_shift(&svc, BOB, day(offset), hm(6, 0), Some(hm(22, 0))).await;
        }
        let report = svc.compute_kpis(&caller(BOB), Some(BOB), 7).await?;
        assert_eq!(report.presence_rate, 100.0);
        assert_eq!(report.worked_days, 5);
        Ok(())
    }

    #[actix_web::test]
    async fn without_contract_days_are_counted() -> TestResult {
        let svc = service();
        seed_shift(&svc, CARL, day(0), hm(9, 0), Some(hm(10, 0))).await;
        seed_shift(&svc, CARL, day(-1), hm(9, 0), Some(hm(12, 0))).await;
        // open shift: no duration, no worked day
        seed_shift(&svc, CARL, day(-2), hm(9, 0), None).await;
        seed_shift(&svc, CARL, day(-4), hm(9, 0), Some(hm(11, 0))).await;

        let report = svc.compute_kpis(&Anonymous, Some(CARL), 4).await?;

        assert!(!report.has_contract);
        assert_eq!(report.period_days, 4);
        assert_eq!(report.worked_days, 2);
        assert_eq!(report.presence_rate, 50.0);
        assert_eq!(report.previous_presence_rate, 25.0);
        assert_eq!(report.previous_total_seconds, 7200.0);
        Ok(())
    }

    #[actix_web::test]
    async fn daily_totals_cover_every_day_of_the_window() -> TestResult {
        let svc = service();
        seed_shift(&svc, CARL, day(-2), hm(9, 0), Some(hm(10, 30))).await;

        let report = svc.compute_kpis(&caller(CARL), None, 5).await?;

        let days: Vec<NaiveDate> = report.daily_totals.iter().map(|d| d.day).collect();
        assert_eq!(days, (-4..=0).map(day).collect::<Vec<_>>());
        assert_eq!(report.daily_totals[2].total_seconds, 5400.0);
        assert_eq!(report.daily_totals[2].total_hours, 1.5);
        assert!(report.daily_totals.iter().filter(|d| d.day != day(-2)).all(|d| d.total_seconds == 0.0));
        Ok(())
    }
}
