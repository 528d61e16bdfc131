use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDate;

use super::AttendanceStore;
use crate::error::StoreError;
use crate::metrics::period::DayRange;
use crate::model::{
    attendance::{AttendanceEntry, NewEntry},
    correction::{CorrectionRequest, NewCorrectionRequest},
    team::Team,
    user::UserProfile,
};

#[derive(Debug, Default)]
struct Inner {
    users: BTreeMap<u64, UserProfile>,
    teams: BTreeMap<u64, Team>,
    entries: BTreeMap<u64, AttendanceEntry>,
    requests: BTreeMap<u64, CorrectionRequest>,
    last_entry_id: u64,
    last_request_id: u64,
}

impl Inner {
    fn entry_for(&self, user_id: u64, day: NaiveDate) -> Option<&AttendanceEntry> {
        self.entries
            .values()
            .find(|e| e.user_id == user_id && e.day == day)
    }
}

/// Store kept entirely in process memory.
///
/// Every method takes the lock once, so each call is atomic with respect to
/// the others.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn put_user(&self, user: UserProfile) {
        self.write().users.insert(user.id, user);
    }

    pub fn put_team(&self, team: Team) {
        self.write().teams.insert(team.id, team);
    }

    pub fn entry_count(&self) -> usize {
        self.read().entries.len()
    }

    pub fn request_count(&self) -> usize {
        self.read().requests.len()
    }
}

impl AttendanceStore for InMemoryStore {
    async fn find_user(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.read().users.get(&user_id).cloned())
    }

    async fn find_team(&self, team_id: u64) -> Result<Option<Team>, StoreError> {
        Ok(self.read().teams.get(&team_id).cloned())
    }

    async fn team_members(&self, team_id: u64) -> Result<Vec<UserProfile>, StoreError> {
        Ok(self
            .read()
            .users
            .values()
            .filter(|u| u.team_id == Some(team_id))
            .cloned()
            .collect())
    }

    async fn team_manager(&self, team_id: u64) -> Result<Option<UserProfile>, StoreError> {
        Ok(self
            .read()
            .users
            .values()
            .find(|u| u.team_managed_id == Some(team_id))
            .cloned())
    }

    async fn set_team_manager(&self, team_id: u64, user_id: u64) -> Result<(), StoreError> {
        let mut inner = self.write();
        if !inner.users.contains_key(&user_id) {
            return Err(StoreError::Missing);
        }
        for user in inner.users.values_mut() {
            if user.team_managed_id == Some(team_id) {
                user.team_managed_id = None;
            }
        }
        if let Some(user) = inner.users.get_mut(&user_id) {
            user.team_managed_id = Some(team_id);
        }
        Ok(())
    }

    async fn assign_team(&self, user_id: u64, team_id: u64) -> Result<(), StoreError> {
        let mut inner = self.write();
        let user = inner.users.get_mut(&user_id).ok_or(StoreError::Missing)?;
        user.team_id = Some(team_id);
        Ok(())
    }

    async fn find_entry(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        Ok(self.read().entry_for(user_id, day).cloned())
    }

    async fn entries_between(
        &self,
        user_ids: &[u64],
        range: DayRange,
    ) -> Result<Vec<AttendanceEntry>, StoreError> {
        let mut entries: Vec<AttendanceEntry> = self
            .read()
            .entries
            .values()
            .filter(|e| user_ids.contains(&e.user_id) && range.contains(e.day))
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.day, e.clock_in));
        Ok(entries)
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<AttendanceEntry, StoreError> {
        let mut inner = self.write();
        if inner.entry_for(entry.user_id, entry.day).is_some() {
            return Err(StoreError::Duplicate);
        }

        inner.last_entry_id += 1;
        let created = AttendanceEntry {
            id: inner.last_entry_id,
            user_id: entry.user_id,
            day: entry.day,
            clock_in: Some(entry.clock_in),
            clock_out: None,
        };
        inner.entries.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update_entry(&self, entry: &AttendanceEntry) -> Result<(), StoreError> {
        let mut inner = self.write();
        let stored = inner.entries.get_mut(&entry.id).ok_or(StoreError::Missing)?;
        stored.clock_in = entry.clock_in;
        stored.clock_out = entry.clock_out;
        Ok(())
    }

    async fn insert_request(
        &self,
        request: NewCorrectionRequest,
    ) -> Result<CorrectionRequest, StoreError> {
        let mut inner = self.write();
        inner.last_request_id += 1;
        let created = CorrectionRequest {
            id: inner.last_request_id,
            user_id: request.user_id,
            day: request.day,
            new_clock_in: request.new_clock_in,
            new_clock_out: request.new_clock_out,
            description: request.description,
            created_at: request.created_at,
        };
        inner.requests.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_request(
        &self,
        request_id: u64,
    ) -> Result<Option<CorrectionRequest>, StoreError> {
        Ok(self.read().requests.get(&request_id).cloned())
    }

    async fn list_requests(
        &self,
        user_ids: Option<&[u64]>,
    ) -> Result<Vec<CorrectionRequest>, StoreError> {
        let mut requests: Vec<CorrectionRequest> = self
            .read()
            .requests
            .values()
            .filter(|r| user_ids.is_none_or(|ids| ids.contains(&r.user_id)))
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    async fn delete_request(&self, request_id: u64) -> Result<bool, StoreError> {
        Ok(self.write().requests.remove(&request_id).is_some())
    }

    async fn apply_request(
        &self,
        request: &CorrectionRequest,
    ) -> Result<AttendanceEntry, StoreError> {
        let mut inner = self.write();
        if !inner.requests.contains_key(&request.id) {
            return Err(StoreError::Missing);
        }
        let entry_id = inner
            .entry_for(request.user_id, request.day)
            .map(|e| e.id)
            .ok_or(StoreError::Missing)?;

        // both rows checked, nothing below can fail
        inner.requests.remove(&request.id);
        let entry = inner.entries.get_mut(&entry_id).ok_or(StoreError::Missing)?;
        entry.clock_in = Some(request.new_clock_in);
        entry.clock_out = Some(request.new_clock_out);
        Ok(entry.clone())
    }
}
