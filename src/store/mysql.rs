use chrono::NaiveDate;
use sqlx::MySqlPool;

use super::AttendanceStore;
use crate::error::StoreError;
use crate::metrics::period::DayRange;
use crate::model::{
    attendance::{AttendanceEntry, NewEntry},
    correction::{CorrectionRequest, NewCorrectionRequest},
    team::Team,
    user::UserProfile,
};

const USER_COLUMNS: &str =
    "id, first_name, last_name, hour_contract, team_id, team_managed_id, is_admin";
const ENTRY_COLUMNS: &str = "id, user_id, day, clock_in, clock_out";
const REQUEST_COLUMNS: &str =
    "id, user_id, day, new_clock_in, new_clock_out, description, created_at";

/// [`AttendanceStore`] over the MySQL schema in `db/schema.sql`.
///
/// The unique key on `time_clock (user_id, day)` is what turns a racing
/// second clock-in into [`StoreError::Duplicate`].
#[derive(Debug, Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

impl AttendanceStore for MySqlStore {
    async fn find_user(&self, user_id: u64) -> Result<Option<UserProfile>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn find_team(&self, team_id: u64) -> Result<Option<Team>, StoreError> {
        sqlx::query_as::<_, Team>("SELECT id, description FROM teams WHERE id = ?")
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn team_members(&self, team_id: u64) -> Result<Vec<UserProfile>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE team_id = ? ORDER BY id");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(team_id)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn team_manager(&self, team_id: u64) -> Result<Option<UserProfile>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE team_managed_id = ? LIMIT 1");
        sqlx::query_as::<_, UserProfile>(&sql)
            .bind(team_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn set_team_manager(&self, team_id: u64, user_id: u64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        sqlx::query("UPDATE users SET team_managed_id = NULL WHERE team_managed_id = ?")
            .bind(team_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        let result = sqlx::query("UPDATE users SET team_managed_id = ? WHERE id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls it back
            return Err(StoreError::Missing);
        }

        tx.commit().await.map_err(StoreError::from_sqlx)
    }

    async fn assign_team(&self, user_id: u64, team_id: u64) -> Result<(), StoreError> {
        sqlx::query("UPDATE users SET team_id = ? WHERE id = ?")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn find_entry(
        &self,
        user_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceEntry>, StoreError> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM time_clock WHERE user_id = ? AND day = ?");
        sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(user_id)
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn entries_between(
        &self,
        user_ids: &[u64],
        range: DayRange,
    ) -> Result<Vec<AttendanceEntry>, StoreError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT {ENTRY_COLUMNS}
            FROM time_clock
            WHERE user_id IN ({})
            AND day BETWEEN ? AND ?
            ORDER BY day, clock_in
            "#,
            placeholders(user_ids.len())
        );

        let mut query = sqlx::query_as::<_, AttendanceEntry>(&sql);
        for id in user_ids {
            query = query.bind(*id);
        }

        query
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn insert_entry(&self, entry: NewEntry) -> Result<AttendanceEntry, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO time_clock (user_id, day, clock_in, clock_out)
            VALUES (?, ?, ?, NULL)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.day)
        .bind(entry.clock_in)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(AttendanceEntry {
            id: result.last_insert_id(),
            user_id: entry.user_id,
            day: entry.day,
            clock_in: Some(entry.clock_in),
            clock_out: None,
        })
    }

    async fn update_entry(&self, entry: &AttendanceEntry) -> Result<(), StoreError> {
        sqlx::query("UPDATE time_clock SET clock_in = ?, clock_out = ? WHERE id = ?")
            .bind(entry.clock_in)
            .bind(entry.clock_out)
            .bind(entry.id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(())
    }

    async fn insert_request(
        &self,
        request: NewCorrectionRequest,
    ) -> Result<CorrectionRequest, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO correction_requests
                (user_id, day, new_clock_in, new_clock_out, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.user_id)
        .bind(request.day)
        .bind(request.new_clock_in)
        .bind(request.new_clock_out)
        .bind(request.description.as_deref())
        .bind(request.created_at)
        .execute(&self.pool)
        .await
        .map_err(StoreError::from_sqlx)?;

        Ok(CorrectionRequest {
            id: result.last_insert_id(),
            user_id: request.user_id,
            day: request.day,
            new_clock_in: request.new_clock_in,
            new_clock_out: request.new_clock_out,
            description: request.description,
            created_at: request.created_at,
        })
    }

    async fn find_request(
        &self,
        request_id: u64,
    ) -> Result<Option<CorrectionRequest>, StoreError> {
        let sql = format!("SELECT {REQUEST_COLUMNS} FROM correction_requests WHERE id = ?");
        sqlx::query_as::<_, CorrectionRequest>(&sql)
            .bind(request_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn list_requests(
        &self,
        user_ids: Option<&[u64]>,
    ) -> Result<Vec<CorrectionRequest>, StoreError> {
        let where_sql = match user_ids {
            None => String::new(),
            Some([]) => return Ok(Vec::new()),
            Some(ids) => format!("WHERE user_id IN ({})", placeholders(ids.len())),
        };

        let sql = format!(
            "SELECT {REQUEST_COLUMNS} FROM correction_requests {where_sql} ORDER BY created_at DESC, id DESC"
        );

        let mut query = sqlx::query_as::<_, CorrectionRequest>(&sql);
        for id in user_ids.unwrap_or_default() {
            query = query.bind(*id);
        }

        query
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)
    }

    async fn delete_request(&self, request_id: u64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM correction_requests WHERE id = ?")
            .bind(request_id)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from_sqlx)?;
        Ok(result.rows_affected() > 0)
    }

    async fn apply_request(
        &self,
        request: &CorrectionRequest,
    ) -> Result<AttendanceEntry, StoreError> {
        let mut tx = self.pool.begin().await.map_err(StoreError::from_sqlx)?;

        // Claim the request first: a concurrent reject or approve that got
        // there before us leaves nothing to delete.
        let claimed = sqlx::query("DELETE FROM correction_requests WHERE id = ?")
            .bind(request.id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;
        if claimed.rows_affected() == 0 {
            return Err(StoreError::Missing);
        }

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM time_clock WHERE user_id = ? AND day = ? FOR UPDATE"
        );
        let mut entry = sqlx::query_as::<_, AttendanceEntry>(&sql)
            .bind(request.user_id)
            .bind(request.day)
            .fetch_optional(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?
            .ok_or(StoreError::Missing)?;

        entry.clock_in = Some(request.new_clock_in);
        entry.clock_out = Some(request.new_clock_out);

        sqlx::query("UPDATE time_clock SET clock_in = ?, clock_out = ? WHERE id = ?")
            .bind(entry.clock_in)
            .bind(entry.clock_out)
            .bind(entry.id)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::from_sqlx)?;

        tx.commit().await.map_err(StoreError::from_sqlx)?;
        Ok(entry)
    }
}
