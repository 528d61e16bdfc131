use chrono::{NaiveDate, NaiveTime};
use tracing::{info, instrument, warn};

use super::AttendanceService;
use crate::auth::capability::Capabilities;
use crate::clock::Clock;
use crate::error::{AttendanceError, StoreError};
use crate::model::attendance::AttendanceEntry;
use crate::model::correction::{CorrectionRequest, NewCorrectionRequest};
use crate::store::AttendanceStore;

/// Outcome of resolving a correction request. The request is gone either way.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Applied { entry: AttendanceEntry },
    Rejected,
}

impl Resolution {
    pub fn message(&self) -> &'static str {
        match self {
            Resolution::Applied { .. } => "Change request accepted and applied.",
            Resolution::Rejected => "Change request rejected and deleted.",
        }
    }
}

/// Unknown id, or resolved by another reviewer since it was read.
fn request_not_found() -> AttendanceError {
    AttendanceError::not_found("Correction request not found.")
}

impl<S: AttendanceStore, C: Clock> AttendanceService<S, C> {
    /// Files a correction for one of the caller's own entries.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), day = %day))]
    pub async fn create_correction_request(
        &self,
        caller: &impl Capabilities,
        day: NaiveDate,
        new_clock_in: Option<NaiveTime>,
        new_clock_out: Option<NaiveTime>,
        description: Option<String>,
    ) -> Result<CorrectionRequest, AttendanceError> {
        let caller_id = caller.require_auth()?;
        let profile = self.load_user(caller_id).await?;
        if profile.team_id.is_none() {
            return Err(AttendanceError::forbidden(
                "User does not belong to any team.",
            ));
        }

        if self.store.find_entry(caller_id, day).await?.is_none() {
            return Err(AttendanceError::not_found(format!(
                "No time clock entry for user {caller_id} on {day}."
            )));
        }

        let (Some(new_clock_in), Some(new_clock_out)) = (new_clock_in, new_clock_out) else {
            return Err(AttendanceError::validation(
                "Both new_clock_in and new_clock_out are required.",
            ));
        };

        let request = self
            .store
            .insert_request(NewCorrectionRequest {
                user_id: caller_id,
                day,
                new_clock_in,
                new_clock_out,
                description: description
                    .map(|d| d.trim().to_string())
                    .filter(|d| !d.is_empty()),
                created_at: self.clock.now(),
            })
            .await?;

        info!(request_id = request.id, "Correction request created");
        Ok(request)
    }

    /// Approves (applies) or rejects a pending correction request.
    ///
    /// The reviewer must be an administrator or the manager of the
    /// requester's team; managers cannot resolve their own requests.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), request_id = %request_id, approved = approved))]
    pub async fn resolve_correction_request(
        &self,
        caller: &impl Capabilities,
        request_id: u64,
        approved: bool,
    ) -> Result<Resolution, AttendanceError> {
        let caller_id = caller.require_auth()?;
        if !(caller.is_admin() || caller.manages_any_team()) {
            warn!("Correction review refused");
            return Err(AttendanceError::forbidden(
                "Not authorized to review correction requests.",
            ));
        }

        let request = self
            .store
            .find_request(request_id)
            .await?
            .ok_or_else(request_not_found)?;

        let requester = self.load_user(request.user_id).await?;
        if !caller.supervises(requester.team_id) {
            warn!("Correction review refused outside the managed team");
            return Err(AttendanceError::forbidden(
                "Not authorized to accept this request.",
            ));
        }
        if request.user_id == caller_id && !caller.is_admin() {
            return Err(AttendanceError::forbidden(
                "You cannot resolve your own correction request.",
            ));
        }

        let resolution = if approved {
            if self
                .store
                .find_entry(request.user_id, request.day)
                .await?
                .is_none()
            {
                return Err(AttendanceError::not_found(format!(
                    "No time clock entry for user {} on {}.",
                    request.user_id, request.day
                )));
            }
            let entry = self
                .store
                .apply_request(&request)
                .await
                .map_err(|e| match e {
                    StoreError::Missing => request_not_found(),
                    other => other.into(),
                })?;
            Resolution::Applied { entry }
        } else {
            if !self.store.delete_request(request.id).await? {
                return Err(request_not_found());
            }
            Resolution::Rejected
        };

        info!(outcome = resolution.message(), "Correction request resolved");
        Ok(resolution)
    }

    /// Requests visible to the caller, newest first: everything for an
    /// administrator, the managed team's plus their own for a manager, and
    /// only their own otherwise.
    pub async fn list_correction_requests(
        &self,
        caller: &impl Capabilities,
    ) -> Result<Vec<CorrectionRequest>, AttendanceError> {
        let caller_id = caller.require_auth()?;
        if caller.is_admin() {
            return Ok(self.store.list_requests(None).await?);
        }

        let mut user_ids = vec![caller_id];
        if let Some(team_id) = caller.managed_team() {
            user_ids.extend(
                self.store
                    .team_members(team_id)
                    .await?
                    .into_iter()
                    .map(|u| u.id)
                    .filter(|&id| id != caller_id),
            );
        }

        Ok(self.store.list_requests(Some(&user_ids)).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::capability::Anonymous;
    use crate::model::attendance::NewEntry;
    use crate::service::fixtures::*;
    use testresult::TestResult;

    async fn bob_request(svc: &TestService) -> CorrectionRequest {
        seed_shift(svc, BOB, day(-1), hm(9, 0), Some(hm(17, 0))).await;
        svc.create_correction_request(
            &caller(BOB),
            day(-1),
            Some(hm(8, 0)),
            Some(hm(16, 30)),
            Some("  Badge reader was down ".into()),
        )
        .await
        .unwrap()
    }

    #[actix_web::test]
    async fn creating_a_request_leaves_the_entry_alone() -> TestResult {
        let svc = service();
        let request = bob_request(&svc).await;

        assert_eq!(request.user_id, BOB);
        assert_eq!(request.description.as_deref(), Some("Badge reader was down"));
        assert_eq!(request.created_at, now());
        let entry = svc.store().find_entry(BOB, day(-1)).await?.unwrap();
        assert_eq!(entry.clock_in, Some(hm(9, 0)));
        Ok(())
    }

    #[actix_web::test]
    async fn create_guards() {
        let svc = service();
        seed_shift(&svc, DAN_NO_TEAM, day(-1), hm(9, 0), Some(hm(17, 0))).await;

        let anonymous = svc
            .create_correction_request(&Anonymous, day(-1), Some(hm(8, 0)), Some(hm(9, 0)), None)
            .await;
        assert!(matches!(anonymous, Err(AttendanceError::Unauthenticated)));

        let no_team = svc
            .create_correction_request(&caller(DAN_NO_TEAM), day(-1), Some(hm(8, 0)), Some(hm(9, 0)), None)
            .await;
        assert!(matches!(no_team, Err(AttendanceError::Forbidden(_))));

        let no_entry = svc
            .create_correction_request(&caller(BOB), day(-4), Some(hm(8, 0)), Some(hm(9, 0)), None)
            .await;
        assert!(matches!(no_entry, Err(AttendanceError::NotFound(_))));

        seed_shift(&svc, BOB, day(-1), hm(9, 0), None).await;
        let missing_time = svc
            .create_correction_request(&caller(BOB), day(-1), Some(hm(8, 0)), None, None)
            .await;
        assert!(matches!(missing_time, Err(AttendanceError::Validation(_))));
        assert_eq!(svc.store().request_count(), 0);
    }

    #[actix_web::test]
    async fn approval_applies_and_removes_the_request() -> TestResult {
        let svc = service();
        let request = bob_request(&svc).await;

        let resolution = svc
            .resolve_correction_request(&caller(ANNA_MANAGER), request.id, true)
            .await?;

        let entry = svc.store().find_entry(BOB, day(-1)).await?.unwrap();
        assert_eq!(resolution, Resolution::Applied { entry: entry.clone() });
        assert_eq!(entry.clock_in, Some(hm(8, 0)));
        assert_eq!(entry.clock_out, Some(hm(16, 30)));
        assert!(svc.store().find_request(request.id).await?.is_none());
        Ok(())
    }

    #[actix_web::test]
    async fn rejection_discards_without_touching_the_entry() -> TestResult {
        let svc = service();
        let request = bob_request(&svc).await;

        let resolution = svc
            .resolve_correction_request(&caller(ZOE_ADMIN), request.id, false)
            .await?;

        assert_eq!(resolution, Resolution::Rejected);
        assert_eq!(resolution.message(), "Change request rejected and deleted.");
        let entry = svc.store().find_entry(BOB, day(-1)).await?.unwrap();
        assert_eq!(entry.clock_in, Some(hm(9, 0)));
        assert_eq!(entry.clock_out, Some(hm(17, 0)));
        assert_eq!(svc.store().request_count(), 0);
        Ok(())
    }

    #[actix_web::test]
    async fn reviewers_are_limited_to_their_team() -> TestResult {
        let svc = service();
        let request = bob_request(&svc).await;

        let peer = svc
            .resolve_correction_request(&caller(CARL), request.id, true)
            .await;
        assert!(matches!(peer, Err(AttendanceError::Forbidden(_))));

        let other_manager = svc
            .resolve_correction_request(&caller(EVE_MANAGER), request.id, true)
            .await;
        assert!(matches!(other_manager, Err(AttendanceError::Forbidden(_))));

        // nothing changed
        assert_eq!(svc.store().request_count(), 1);

        let missing = svc
            .resolve_correction_request(&caller(ZOE_ADMIN), 999, true)
            .await;
        assert!(matches!(missing, Err(AttendanceError::NotFound(_))));
        Ok(())
    }

    #[actix_web::test]
    async fn approving_after_a_concurrent_rejection_changes_nothing() -> TestResult {
        let svc = stale_service(false);
        let original = svc
            .store()
            .inner
            .insert_entry(NewEntry {
                user_id: BOB,
                day: day(-1),
                clock_in: hm(9, 0),
            })
            .await?;
        let request = svc
            .create_correction_request(&caller(BOB), day(-1), Some(hm(6, 0)), Some(hm(23, 0)), None)
            .await?;
        // the approving reviewer read the request before it was rejected
        svc.store().freeze_requests().await;

        let rejected = svc
            .resolve_correction_request(&caller(ZOE_ADMIN), request.id, false)
            .await?;
        assert_eq!(rejected, Resolution::Rejected);

        let late_approval = svc
            .resolve_correction_request(&caller(ANNA_MANAGER), request.id, true)
            .await;
        assert!(matches!(late_approval, Err(AttendanceError::NotFound(_))));
        assert_eq!(svc.store().inner.find_entry(BOB, day(-1)).await?, Some(original));

        let late_rejection = svc
            .resolve_correction_request(&caller(ANNA_MANAGER), request.id, false)
            .await;
        assert!(matches!(late_rejection, Err(AttendanceError::NotFound(_))));
        Ok(())
    }

    #[actix_web::test]
    async fn managers_cannot_approve_their_own_request() -> TestResult {
        let svc = service();
        // Eve manages team B and is listed in it
        seed_shift(&svc, EVE_MANAGER, day(-1), hm(9, 0), Some(hm(17, 0))).await;
        let request = svc
            .create_correction_request(&caller(EVE_MANAGER), day(-1), Some(hm(7, 0)), Some(hm(17, 0)), None)
            .await?;

        let own = svc
            .resolve_correction_request(&caller(EVE_MANAGER), request.id, true)
            .await;
        assert!(matches!(own, Err(AttendanceError::Forbidden(_))));

        let by_admin = svc
            .resolve_correction_request(&caller(ZOE_ADMIN), request.id, true)
            .await?;
        assert!(matches!(by_admin, Resolution::Applied { .. }));
        Ok(())
    }

    #[actix_web::test]
    async fn listing_follows_visibility() -> TestResult {
        let svc = service();
        bob_request(&svc).await;
        seed_shift(&svc, FINN, day(-1), hm(9, 0), Some(hm(17, 0))).await;
        svc.create_correction_request(&caller(FINN), day(-1), Some(hm(8, 0)), Some(hm(17, 0)), None)
            .await?;

        assert_eq!(svc.list_correction_requests(&caller(ZOE_ADMIN)).await?.len(), 2);

        let anna = svc.list_correction_requests(&caller(ANNA_MANAGER)).await?;
        assert_eq!(anna.iter().map(|r| r.user_id).collect::<Vec<_>>(), vec![BOB]);

        let eve = svc.list_correction_requests(&caller(EVE_MANAGER)).await?;
        assert_eq!(eve.iter().map(|r| r.user_id).collect::<Vec<_>>(), vec![FINN]);

        assert!(svc.list_correction_requests(&caller(CARL)).await?.is_empty());
        Ok(())
    }
}
