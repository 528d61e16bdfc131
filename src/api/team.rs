use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::Service;
use crate::auth::auth::AuthUser;
use crate::model::team::TeamSummary;
use crate::service::team::MemberSnapshot;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PresenceQuery {
    /// Defaults to 30 days
    #[schema(example = 30)]
    pub period: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
pub struct TeamUser {
    #[schema(example = 42)]
    pub user_id: u64,
}

/// Presence of every member of the caller's team
#[utoipa::path(
    get,
    path = "/api/teams/presence",
    params(PresenceQuery),
    responses(
        (status = 200, description = "One snapshot per member, ordered by name", body = [MemberSnapshot]),
        (status = 400, description = "Invalid period"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn team_presence(
    auth: AuthUser,
    service: web::Data<Service>,
    query: web::Query<PresenceQuery>,
) -> actix_web::Result<impl Responder> {
    let snapshot = service.team_presence_snapshot(&auth, query.period).await?;
    Ok(HttpResponse::Ok().json(snapshot))
}

#[utoipa::path(
    put,
    path = "/api/teams/{id}/manager",
    params(
        ("id" = u64, Path, description = "Team id")
    ),
    request_body(content = TeamUser, content_type = "application/json"),
    responses(
        (status = 200, description = "Manager replaced", body = TeamSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "Team or user not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn set_manager(
    auth: AuthUser,
    service: web::Data<Service>,
    path: web::Path<u64>,
    body: web::Json<TeamUser>,
) -> actix_web::Result<impl Responder> {
    let team = service
        .set_team_manager(&auth, path.into_inner(), body.user_id)
        .await?;
    Ok(HttpResponse::Ok().json(team))
}

#[utoipa::path(
    post,
    path = "/api/teams/{id}/members",
    params(
        ("id" = u64, Path, description = "Team id")
    ),
    request_body(content = TeamUser, content_type = "application/json"),
    responses(
        (status = 200, description = "User moved into the team", body = TeamSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not an admin or this team's manager"),
        (status = 404, description = "Team or user not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Team"
)]
pub async fn add_member(
    auth: AuthUser,
    service: web::Data<Service>,
    path: web::Path<u64>,
    body: web::Json<TeamUser>,
) -> actix_web::Result<impl Responder> {
    let team = service
        .add_user_to_team(&auth, body.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(team))
}
