use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use super::AttendanceService;
use crate::auth::capability::Capabilities;
use crate::clock::Clock;
use crate::error::AttendanceError;
use crate::metrics::{
    period::{DEFAULT_TEAM_PERIOD_DAYS, Period},
    presence::presence_score,
};
use crate::model::{
    team::{Team, TeamSummary},
    user::UserProfile,
};
use crate::store::AttendanceStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema, strum_macros::Display)]
pub enum MemberStatus {
    Manager,
    Member,
}

/// Presence of one team member as of today.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MemberSnapshot {
    #[schema(example = 2)]
    pub id: u64,
    #[schema(example = "Bob")]
    pub first_name: String,
    #[schema(example = "Jones")]
    pub last_name: String,
    pub status: MemberStatus,
    /// Clocked in today and not yet clocked out.
    #[schema(example = true)]
    pub presence: bool,
    #[schema(example = 80)]
    pub score: u8,
}

impl<S: AttendanceStore, C: Clock> AttendanceService<S, C> {
    /// The team `user` manages, else the team they belong to.
    async fn team_of(&self, user: &UserProfile) -> Result<Option<Team>, AttendanceError> {
        match user.team_managed_id.or(user.team_id) {
            Some(team_id) => Ok(self.store.find_team(team_id).await?),
            None => Ok(None),
        }
    }

    /// Listed members plus the manager, each once, ordered by name.
    async fn roster(
        &self,
        team_id: u64,
    ) -> Result<(Vec<UserProfile>, Option<u64>), AttendanceError> {
        let manager = self.store.team_manager(team_id).await?;
        let manager_id = manager.as_ref().map(|m| m.id);

        let mut unique: BTreeMap<u64, UserProfile> = self
            .store
            .team_members(team_id)
            .await?
            .into_iter()
            .map(|u| (u.id, u))
            .collect();
        if let Some(manager) = manager {
            unique.entry(manager.id).or_insert(manager);
        }

        let mut members: Vec<UserProfile> = unique.into_values().collect();
        members.sort_by_cached_key(UserProfile::sort_key);
        Ok((members, manager_id))
    }

    async fn team_summary(&self, team: Team) -> Result<TeamSummary, AttendanceError> {
        let manager_id = self.store.team_manager(team.id).await?.map(|m| m.id);
        let nr_members = self.store.team_members(team.id).await?.len() as u64;
        Ok(TeamSummary {
            team,
            manager_id,
            nr_members,
        })
    }

    async fn load_team(&self, team_id: u64) -> Result<Team, AttendanceError> {
        self.store
            .find_team(team_id)
            .await?
            .ok_or_else(|| AttendanceError::not_found("Team not found."))
    }

    /// Presence snapshot of the caller's team over `period` days (30 by
    /// default). A caller without a team gets an empty list.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), period = ?period))]
    pub async fn team_presence_snapshot(
        &self,
        caller: &impl Capabilities,
        period: Option<i64>,
    ) -> Result<Vec<MemberSnapshot>, AttendanceError> {
        let caller_id = caller.require_auth()?;
        let period = Period::new(period.unwrap_or(DEFAULT_TEAM_PERIOD_DAYS))?;

        let profile = self.load_user(caller_id).await?;
        let Some(team) = self.team_of(&profile).await? else {
            return Ok(Vec::new());
        };

        let (members, manager_id) = self.roster(team.id).await?;
        if members.is_empty() {
            return Ok(Vec::new());
        }

        let today = self.clock.today();
        let member_ids: Vec<u64> = members.iter().map(|m| m.id).collect();
        let entries = self
            .store
            .entries_between(&member_ids, period.ending_on(today))
            .await?;

        let present_today: HashSet<u64> = entries
            .iter()
            .filter(|e| e.day == today && e.is_open())
            .map(|e| e.user_id)
            .collect();

        let mut days_present: HashMap<u64, u32> = HashMap::new();
        let distinct_days: HashSet<_> = entries
            .iter()
            .filter(|e| e.clock_in.is_some())
            .map(|e| (e.user_id, e.day))
            .collect();
        for (user_id, _) in distinct_days {
            *days_present.entry(user_id).or_default() += 1;
        }

        Ok(members
            .into_iter()
            .map(|member| {
                let manages = manager_id == Some(member.id)
                    || member.team_managed_id == Some(team.id);
                MemberSnapshot {
                    score: presence_score(
                        member.hour_contract,
                        period.days(),
                        days_present.get(&member.id).copied().unwrap_or(0),
                    ),
                    presence: present_today.contains(&member.id),
                    status: if manages {
                        MemberStatus::Manager
                    } else {
                        MemberStatus::Member
                    },
                    id: member.id,
                    first_name: member.first_name,
                    last_name: member.last_name,
                }
            })
            .collect())
    }

    /// Makes `user_id` the manager of `team_id`, replacing any previous one.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), team_id = %team_id, user_id = %user_id))]
    pub async fn set_team_manager(
        &self,
        caller: &impl Capabilities,
        team_id: u64,
        user_id: u64,
    ) -> Result<TeamSummary, AttendanceError> {
        caller.require_auth()?;
        if !caller.is_admin() {
            warn!("Manager assignment refused");
            return Err(AttendanceError::forbidden(
                "Only administrators can assign team managers.",
            ));
        }

        let team = self.load_team(team_id).await?;
        self.load_user(user_id).await?;
        self.store.set_team_manager(team_id, user_id).await?;

        info!("Team manager assigned");
        self.team_summary(team).await
    }

    /// Moves `user_id` into `team_id`. Administrators may move anyone; a
    /// team's manager may move non-admin users into their own team.
    #[instrument(skip_all, fields(caller_id = ?caller.user_id(), team_id = %team_id, user_id = %user_id))]
    pub async fn add_user_to_team(
        &self,
        caller: &impl Capabilities,
        user_id: u64,
        team_id: u64,
    ) -> Result<TeamSummary, AttendanceError> {
        const DENIED: &str = "Not authorized to add users to this team.";

        caller.require_auth()?;
        if !caller.supervises(Some(team_id)) {
            warn!("Team assignment refused");
            return Err(AttendanceError::forbidden(DENIED));
        }

        let team = self.load_team(team_id).await?;
        let user = self.target_user(caller, user_id, DENIED).await?;
        if user.is_admin && !caller.is_admin() {
            return Err(AttendanceError::forbidden(
                "Managers cannot modify admin users.",
            ));
        }

        self.store.assign_team(user_id, team_id).await?;

        info!("User added to team");
        self.team_summary(team).await
    }
}
