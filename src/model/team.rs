use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Team {
    #[schema(example = 10)]
    pub id: u64,

    #[schema(example = "Back office", nullable = true)]
    pub description: Option<String>,
}

/// A team together with its derived membership figures.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeamSummary {
    #[serde(flatten)]
    pub team: Team,

    #[schema(example = 5, nullable = true)]
    pub manager_id: Option<u64>,

    /// Listed members; the manager is only counted when also listed.
    #[schema(example = 4)]
    pub nr_members: u64,
}
