//! Persistence collaborator for entries, correction requests, users and teams.
//!
//! The core only talks to [`AttendanceStore`]; implementations must enforce
//! `(user, day)` uniqueness atomically on insert and report a violation as
//! [`StoreError::Duplicate`].

pub mod memory;
pub mod mysql;

use chrono::NaiveDate;

use crate::error::StoreError;
use crate::metrics::period::DayRange;
use crate::model::{
    attendance::{AttendanceEntry, NewEntry},
    correction::{CorrectionRequest, NewCorrectionRequest},
    team::Team,
    user::UserProfile,
};

pub use memory::InMemoryStore;
pub use mysql::MySqlStore;

pub trait AttendanceStore {
    async fn find_user(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError>;

    async fn find_team(&self, team_id: u64) -> Result<Option<Team>, StoreError>;

    /// Users listed as members of the team. Does not add the manager.
    async fn team_members(&self, team_id: u64) -> Result<Vec<UserProfile>, StoreError>;

    async fn team_manager(&self, team_id: u64) -> Result<Option<UserProfile>, StoreError>;

    /// Makes `user_id` the only manager of `team_id`.
    async fn set_team_manager(&self, team_id: u64, user_id: u64) -> Result<(), StoreError>;

    async fn assign_team(&self, user_id: u64, team_id: u64) -> Result<(), StoreError>;

    async fn find_entry(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceEntry>, StoreError>;

    /// Entries of any of `user_ids` within `range`, ordered by day then clock-in.
    async fn entries_between(
        &self,
        user_ids: &[u64],
        range: DayRange,
    ) -> Result<Vec<AttendanceEntry>, StoreError>;

    async fn insert_entry(&self, entry: NewEntry) -> Result<AttendanceEntry, StoreError>;

    async fn update_entry(&self, entry: &AttendanceEntry) -> Result<(), StoreError>;

    async fn insert_request(
        &self,
        request: NewCorrectionRequest,
    ) -> Result<CorrectionRequest, StoreError>;

    async fn find_request(&self, request_id: u64)
    -> Result<Option<CorrectionRequest>, StoreError>;

    /// Newest first. `None` lists every request.
    async fn list_requests(
        &self,
        user_ids: Option<&[u64]>,
    ) -> Result<Vec<CorrectionRequest>, StoreError>;

    /// Returns whether a request was removed.
    async fn delete_request(&self, request_id: u64) -> Result<bool, StoreError>;

    /// Overwrites the referenced entry with the proposed times and deletes
    /// the request, as one unit. Fails with [`StoreError::Missing`], changing
    /// nothing, when the request was already resolved or the entry is gone.
    async fn apply_request(
        &self,
        request: &CorrectionRequest,
    ) -> Result<AttendanceEntry, StoreError>;
}
