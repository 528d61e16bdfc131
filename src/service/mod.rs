//! The operations the transport layer calls. Every operation receives the
//! caller explicitly and reads "now" from the service's [`Clock`].

pub mod correction;
pub mod entries;
pub mod kpi;
pub mod team;

use crate::auth::capability::Capabilities;
use crate::clock::{Clock, SystemClock};
use crate::error::AttendanceError;
use crate::model::user::UserProfile;
use crate::store::AttendanceStore;

#[derive(Debug)]
pub struct AttendanceService<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S> AttendanceService<S, SystemClock> {
    pub fn with_system_clock(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S, C> AttendanceService<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: AttendanceStore, C: Clock> AttendanceService<S, C> {
    async fn load_user(&self, user_id: u64) -> Result<UserProfile, AttendanceError> {
        self.store
            .find_user(user_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found("User not found."))
    }

    /// Loads a user the caller wants to act on. Only administrators (and
    /// the user themselves) learn that an id is unknown; anyone else gets
    /// the same `denied` error as for an existing user they may not touch.
    async fn target_user(
        &self,
        caller: &impl Capabilities,
        user_id: u64,
        denied: &str,
    ) -> Result<UserProfile, AttendanceError> {
        match self.store.find_user(user_id).await? {
            Some(user) => Ok(user),
            None if caller.is_admin() || caller.user_id() == Some(user_id) => {
                Err(AttendanceError::not_found("User not found."))
            }
            None => Err(AttendanceError::forbidden(denied)),
        }
    }

    /// Resolves a user whose attendance the caller wants to read: self, an
    /// administrator, or the manager of the user's team.
    async fn viewable_user(
        &self,
        caller: &impl Capabilities,
        target_user_id: u64,
    ) -> Result<UserProfile, AttendanceError> {
        const DENIED: &str = "Not authorized to view attendance for this user.";

        let caller_id = caller.require_auth()?;
        let is_self = caller_id == target_user_id;
        if !(is_self || caller.is_admin() || caller.manages_any_team()) {
            return Err(AttendanceError::forbidden(DENIED));
        }

        let target = self.target_user(caller, target_user_id, DENIED).await?;
        if !(is_self || caller.supervises(target.team_id)) {
            return Err(AttendanceError::forbidden(DENIED));
        }
        Ok(target)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Mutex;

    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    use super::AttendanceService;
    use crate::auth::auth::AuthUser;
    use crate::clock::FixedClock;
    use crate::error::StoreError;
    use crate::metrics::period::DayRange;
    use crate::model::attendance::{AttendanceEntry, NewEntry};
    use crate::model::correction::{CorrectionRequest, NewCorrectionRequest};
    use crate::model::{role::Role, team::Team, user::UserProfile};
    use crate::store::{AttendanceStore, InMemoryStore};

    pub const ANNA_MANAGER: u64 = 1;
    pub const BOB: u64 = 2;
    pub const CARL: u64 = 3;
    pub const DAN_NO_TEAM: u64 = 4;
    pub const EVE_MANAGER: u64 = 5;
    pub const FINN: u64 = 6;
    pub const ZOE_ADMIN: u64 = 9;
    pub const TEAM_A: u64 = 10;
    pub const TEAM_B: u64 = 20;

    pub type TestService = AttendanceService<InMemoryStore, FixedClock>;

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    pub fn now() -> NaiveDateTime {
        today().and_hms_opt(14, 0, 0).unwrap()
    }

    pub fn day(offset_from_today: i64) -> NaiveDate {
        today() + chrono::TimeDelta::days(offset_from_today)
    }

    pub fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn user(
        id: u64,
        first_name: &str,
        last_name: &str,
        hour_contract: Option<i32>,
        team_id: Option<u64>,
        team_managed_id: Option<u64>,
    ) -> UserProfile {
        UserProfile {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            hour_contract,
            team_id,
            team_managed_id,
            is_admin: false,
        }
    }

    /// Team A: Anna manages without being listed, Bob and Carl are members.
    /// Team B: Eve manages and is listed, Finn is a member.
    /// Dan has no team, Zoe is an administrator.
    pub fn seeded_store() -> InMemoryStore {
        let store = InMemoryStore::new();
        store.put_team(Team {
            id: TEAM_A,
            description: Some("Back office".into()),
        });
        store.put_team(Team {
            id: TEAM_B,
            description: None,
        });

        store.put_user(user(ANNA_MANAGER, "anna", "Smith", Some(35), None, Some(TEAM_A)));
        store.put_user(user(BOB, "Bob", "Jones", Some(35), Some(TEAM_A), None));
        store.put_user(user(CARL, "Carl", "Adams", None, Some(TEAM_A), None));
        store.put_user(user(DAN_NO_TEAM, "Dan", "Brown", Some(35), None, None));
        store.put_user(user(EVE_MANAGER, "Eve", "Stone", None, Some(TEAM_B), Some(TEAM_B)));
        store.put_user(user(FINN, "Finn", "Lake", Some(35), Some(TEAM_B), None));
        store.put_user(UserProfile {
            is_admin: true,
            ..user(ZOE_ADMIN, "Zoe", "Root", None, None, None)
        });

        store
    }

    pub fn service() -> TestService {
        AttendanceService::new(seeded_store(), FixedClock(now()))
    }

    pub fn stale_service(hide_entries: bool) -> AttendanceService<StaleStore, FixedClock> {
        let store = StaleStore {
            inner: seeded_store(),
            hide_entries,
            frozen_requests: Mutex::new(None),
        };
        AttendanceService::new(store, FixedClock(now()))
    }

    /// Store whose reads can lag behind its writes, the way a second
    /// request handler sees the database between its read and its write.
    pub struct StaleStore {
        pub inner: InMemoryStore,
        /// `find_entry` reports nothing, as before a concurrent insert.
        hide_entries: bool,
        /// Once set, `find_request` answers from this snapshot.
        frozen_requests: Mutex<Option<Vec<CorrectionRequest>>>,
    }

    impl StaleStore {
        pub async fn freeze_requests(&self) {
            let snapshot = self.inner.list_requests(None).await.unwrap();
            *self.frozen_requests.lock().unwrap() = Some(snapshot);
        }
    }

    impl AttendanceStore for StaleStore {
        async fn find_user(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError> {
            self.inner.find_user(user_id).await
        }

        async fn find_team(&self, team_id: u64) -> Result<Option<Team>, StoreError> {
            self.inner.find_team(team_id).await
        }

        async fn team_members(&self, team_id: u64) -> Result<Vec<UserProfile>, StoreError> {
            self.inner.team_members(team_id).await
        }

        async fn team_manager(&self, team_id: u64) -> Result<Option<UserProfile>, StoreError> {
            self.inner.team_manager(team_id).await
        }

        async fn set_team_manager(&self, team_id: u64, user_id: u64) -> Result<(), StoreError> {
            self.inner.set_team_manager(team_id, user_id).await
        }

        async fn assign_team(&self, user_id: u64, team_id: u64) -> Result<(), StoreError> {
            self.inner.assign_team(user_id, team_id).await
        }

        async fn find_entry(
            &self,
            user_id: u64,
            day: NaiveDate,
        ) -> Result<Option<AttendanceEntry>, StoreError> {
            if self.hide_entries {
                return Ok(None);
            }
            self.inner.find_entry(user_id, day).await
        }

        async fn entries_between(
            &self,
            user_ids: &[u64],
            range: DayRange,
        ) -> Result<Vec<AttendanceEntry>, StoreError> {
            self.inner.entries_between(user_ids, range).await
        }

        async fn insert_entry(&self, entry: NewEntry) -> Result<AttendanceEntry, StoreError> {
            self.inner.insert_entry(entry).await
        }

        async fn update_entry(&self, entry: &AttendanceEntry) -> Result<(), StoreError> {
            self.inner.update_entry(entry).await
        }

        async fn insert_request(
            &self,
            request: NewCorrectionRequest,
        ) -> Result<CorrectionRequest, StoreError> {
            self.inner.insert_request(request).await
        }

        async fn find_request(
            &self,
            request_id: u64,
        ) -> Result<Option<CorrectionRequest>, StoreError> {
            let frozen = self.frozen_requests.lock().unwrap().clone();
            match frozen {
                Some(snapshot) => Ok(snapshot.into_iter().find(|r| r.id == request_id)),
                None => self.inner.find_request(request_id).await,
            }
        }

        async fn list_requests(
            &self,
            user_ids: Option<&[u64]>,
        ) -> Result<Vec<CorrectionRequest>, StoreError> {
            self.inner.list_requests(user_ids).await
        }

        async fn delete_request(&self, request_id: u64) -> Result<bool, StoreError> {
            self.inner.delete_request(request_id).await
        }

        async fn apply_request(
            &self,
            request: &CorrectionRequest,
        ) -> Result<AttendanceEntry, StoreError> {
            self.inner.apply_request(request).await
        }
    }

    /// Stores a shift directly, bypassing the clock-in rules.
    pub async fn seed_shift(
        svc: &TestService,
        user_id: u64,
        day: NaiveDate,
        clock_in: NaiveTime,
        clock_out: Option<NaiveTime>,
    ) -> AttendanceEntry {
        let mut entry = svc
            .store()
            .insert_entry(NewEntry {
                user_id,
                day,
                clock_in,
            })
            .await
            .unwrap();
        if clock_out.is_some() {
            entry.clock_out = clock_out;
            svc.store().update_entry(&entry).await.unwrap();
        }
        entry
    }

    pub fn caller(user_id: u64) -> AuthUser {
        let (role, team_managed_id) = match user_id {
            ZOE_ADMIN => (Role::Admin, None),
            ANNA_MANAGER => (Role::Employee, Some(TEAM_A)),
            EVE_MANAGER => (Role::Employee, Some(TEAM_B)),
            _ => (Role::Employee, None),
        };
        AuthUser {
            user_id,
            username: format!("user{user_id}@example.com"),
            role,
            team_managed_id,
        }
    }
}
