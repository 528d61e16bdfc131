use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Read-only view of a user as consumed by the KPI and team computations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserProfile {
    #[schema(example = 42)]
    pub id: u64,

    #[schema(example = "Anna")]
    pub first_name: String,

    #[schema(example = "Smith")]
    pub last_name: String,

    /// Contractual hours per week. `None` switches scoring to raw day counts.
    #[schema(example = 35, nullable = true)]
    pub hour_contract: Option<i32>,

    #[schema(example = 10, nullable = true)]
    pub team_id: Option<u64>,

    #[schema(nullable = true)]
    pub team_managed_id: Option<u64>,

    #[schema(example = false)]
    pub is_admin: bool,
}

impl UserProfile {
    /// Case-insensitive `(first name, last name)` ordering key.
    pub fn sort_key(&self) -> (String, String) {
        (self.first_name.to_lowercase(), self.last_name.to_lowercase())
    }
}
