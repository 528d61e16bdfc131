use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A proposed edit to an existing attendance entry, waiting for a reviewer.
///
/// Resolution always deletes the request; approval also overwrites the
/// referenced entry with `new_clock_in` / `new_clock_out`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct CorrectionRequest {
    #[schema(example = 3)]
    pub id: u64,

    #[schema(example = 42)]
    pub user_id: u64,

    #[schema(example = "2026-01-02", value_type = String, format = "date")]
    pub day: NaiveDate,

    #[schema(example = "08:30:00", value_type = String)]
    pub new_clock_in: NaiveTime,

    #[schema(example = "17:00:00", value_type = String)]
    pub new_clock_out: NaiveTime,

    #[schema(example = "Forgot to clock in at arrival", nullable = true)]
    pub description: Option<String>,

    #[schema(example = "2026-01-03T10:15:00", value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCorrectionRequest {
    pub user_id: u64,
    pub day: NaiveDate,
    pub new_clock_in: NaiveTime,
    pub new_clock_out: NaiveTime,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
}
