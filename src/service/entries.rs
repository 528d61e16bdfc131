use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::AttendanceService;
use crate::auth::capability::Capabilities;
use crate::clock::Clock;
use crate::error::{AttendanceError, StoreError};
use crate::metrics::{duration::entry_seconds, hours, period::DayRange, round2};
use crate::model::attendance::{AttendanceEntry, EntryState, NewEntry};
use crate::store::AttendanceStore;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TimesheetRow {
    #[serde(flatten)]
    pub entry: AttendanceEntry,
    #[schema(example = 28800)]
    pub total_seconds: i64,
    #[schema(example = 8.0)]
    pub total_hours: f64,
}

/// Entries of one user over a day range, with per-shift and overall totals.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Timesheet {
    pub user_id: u64,
    #[schema(value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub end_date: NaiveDate,
    pub rows: Vec<TimesheetRow>,
    pub total_seconds: i64,
    pub total_hours: f64,
}

fn may_act_for(caller: &impl Capabilities, target_user_id: u64) -> bool {
    caller.user_id() == Some(target_user_id) || caller.is_admin()
}

impl<S: AttendanceStore, C: Clock> AttendanceService<S, C> {
    /// Opens today's shift for `target_user_id`.
    ///
    /// Allowed for the user themselves or an administrator acting as proxy.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), target_user_id = %target_user_id))]
    pub async fn clock_in(
        &self,
        caller: &impl Capabilities,
        target_user_id: u64,
        day: Option<NaiveDate>,
    ) -> Result<AttendanceEntry, AttendanceError> {
        caller.require_auth()?;
        if !may_act_for(caller, target_user_id) {
            warn!("Clock-in refused for another user");
            return Err(AttendanceError::forbidden(
                "You are not allowed to clock in for this user.",
            ));
        }

        let today = self.clock.today();
        if day.is_some_and(|d| d != today) {
            return Err(AttendanceError::validation(
                "Clock-in is only possible for the current day.",
            ));
        }

        self.load_user(target_user_id).await?;

        let existing = self.store.find_entry(target_user_id, today).await?;
        if EntryState::of(existing.as_ref()) != EntryState::NoEntry {
            return Err(AttendanceError::validation(
                "This user already clocked in today.",
            ));
        }

        let entry = self
            .store
            .insert_entry(NewEntry {
                user_id: target_user_id,
                day: today,
                clock_in: self.clock.time_of_day(),
            })
            .await
            .map_err(|e| match e {
                // lost a race against a concurrent clock-in
                StoreError::Duplicate => {
                    AttendanceError::validation("This user already clocked in today.")
                }
                other => other.into(),
            })?;

        info!(entry_id = entry.id, "Clocked in");
        Ok(entry)
    }

    /// Closes today's open shift for `target_user_id`.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), target_user_id = %target_user_id))]
    pub async fn clock_out(
        &self,
        caller: &impl Capabilities,
        target_user_id: u64,
    ) -> Result<AttendanceEntry, AttendanceError> {
        caller.require_auth()?;
        if !may_act_for(caller, target_user_id) {
            warn!("Clock-out refused for another user");
            return Err(AttendanceError::forbidden(
                "You are not allowed to clock out for this user.",
            ));
        }

        let today = self.clock.today();
        let existing = self.store.find_entry(target_user_id, today).await?;
        let mut entry = match EntryState::of(existing.as_ref()) {
            EntryState::NoEntry => {
                return Err(AttendanceError::validation(
                    "You have to clock in before clocking out.",
                ));
            }
            EntryState::Closed => {
                return Err(AttendanceError::validation(
                    "You already clocked out today.",
                ));
            }
            EntryState::Open => existing.ok_or(StoreError::Missing)?,
        };

        entry.clock_out = Some(self.clock.time_of_day());
        self.store.update_entry(&entry).await?;

        info!(entry_id = entry.id, "Clocked out");
        Ok(entry)
    }

    /// Administrative overwrite of an existing entry, open or closed.
    ///
    /// Only the supplied times change. Managers may edit their own team's
    /// entries but never an administrator's.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), target_user_id = %target_user_id, day = ?day))]
    pub async fn modify_entry(
        &self,
        caller: &impl Capabilities,
        target_user_id: u64,
        day: Option<NaiveDate>,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
    ) -> Result<AttendanceEntry, AttendanceError> {
        caller.require_auth()?;
        if !(caller.is_admin() || caller.manages_any_team()) {
            warn!("Entry modification refused");
            return Err(AttendanceError::forbidden(
                "Not authorized to modify clock entries.",
            ));
        }

        const OUTSIDE_TEAM: &str = "Not authorized to modify clock entry for this user. You are not admin or manager of the user's team.";
        let target = self.target_user(caller, target_user_id, OUTSIDE_TEAM).await?;
        let day = day.ok_or_else(|| {
            AttendanceError::validation("Day is required to modify clock entry.")
        })?;

        if !caller.supervises(target.team_id) {
            warn!("Entry modification refused outside the managed team");
            return Err(AttendanceError::forbidden(OUTSIDE_TEAM));
        }
        if target.is_admin && !caller.is_admin() {
            return Err(AttendanceError::forbidden(
                "Managers cannot modify admin clock entry.",
            ));
        }

        let mut entry = self
            .store
            .find_entry(target_user_id, day)
            .await?
            .ok_or_else(|| {
                AttendanceError::not_found(format!(
                    "No time clock entry for user {target_user_id} on {day}."
                ))
            })?;

        if let Some(t) = clock_in {
            entry.clock_in = Some(t);
        }
        if let Some(t) = clock_out {
            entry.clock_out = Some(t);
        }
        if entry.clock_out.is_some() && entry.clock_in.is_none() {
            return Err(AttendanceError::validation(
                "A clock-out needs a clock-in on the same entry.",
            ));
        }

        self.store.update_entry(&entry).await?;

        info!(entry_id = entry.id, "Clock entry modified");
        Ok(entry)
    }

    /// Today's entry for `target_user_id`, if any.
    pub async fn current_entry(
        &self,
        caller: &impl Capabilities,
        target_user_id: u64,
    ) -> Result<Option<AttendanceEntry>, AttendanceError> {
        self.viewable_user(caller, target_user_id).await?;
        Ok(self
            .store
            .find_entry(target_user_id, self.clock.today())
            .await?)
    }

    /// Entries between `start` and `end` inclusive, both defaulting to today.
    /// The target defaults to the caller.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), target_user_id = ?target_user_id))]
    pub async fn timesheet(
        &self,
        caller: &impl Capabilities,
        target_user_id: Option<u64>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Result<Timesheet, AttendanceError> {
        let caller_id = caller.require_auth()?;
        let target = self
            .viewable_user(caller, target_user_id.unwrap_or(caller_id))
            .await?;

        let today = self.clock.today();
        let range = DayRange {
            start: start.unwrap_or(today),
            end: end.unwrap_or(today),
        };
        if range.start > range.end {
            return Err(AttendanceError::validation(
                "start_date must be <= end_date.",
            ));
        }

        let entries = self.store.entries_between(&[target.id], range).await?;

        let rows: Vec<TimesheetRow> = entries
            .into_iter()
            .map(|entry| {
                let secs = entry_seconds(&entry);
                TimesheetRow {
                    entry,
                    total_seconds: secs,
                    total_hours: round2(hours(secs)),
                }
            })
            .collect();
        let total_seconds = rows.iter().map(|r| r.total_seconds).sum();

        Ok(Timesheet {
            user_id: target.id,
            start_date: range.start,
            end_date: range.end,
            rows,
            total_seconds,
            total_hours: round2(hours(total_seconds)),
        })
    }
}
