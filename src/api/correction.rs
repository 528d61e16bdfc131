use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use super::Service;
use crate::auth::auth::AuthUser;
use crate::model::correction::CorrectionRequest;
use crate::service::correction::Resolution;

#[derive(Deserialize, ToSchema)]
pub struct CreateCorrection {
    #[schema(example = "2026-01-02", format = "date", value_type = String)]
    pub day: NaiveDate,
    #[schema(example = "08:00:00", value_type = Option<String>)]
    pub new_clock_in: Option<NaiveTime>,
    #[schema(example = "16:30:00", value_type = Option<String>)]
    pub new_clock_out: Option<NaiveTime>,
    #[schema(example = "Badge reader was down")]
    pub description: Option<String>,
}

/// File a correction for one of the caller's own entries
#[utoipa::path(
    post,
    path = "/api/corrections",
    request_body(
        content = CreateCorrection,
        description = "Replacement times for an existing entry",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Request created", body = CorrectionRequest),
        (status = 400, description = "Both times are required"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "User does not belong to any team"),
        (status = 404, description = "No entry for that day"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn create_correction(
    auth: AuthUser,
    service: web::Data<Service>,
    body: web::Json<CreateCorrection>,
) -> actix_web::Result<impl Responder> {
    let body = body.into_inner();
    let request = service
        .create_correction_request(
            &auth,
            body.day,
            body.new_clock_in,
            body.new_clock_out,
            body.description,
        )
        .await?;
    Ok(HttpResponse::Created().json(request))
}

/// Pending requests visible to the caller, newest first
#[utoipa::path(
    get,
    path = "/api/corrections",
    responses(
        (status = 200, description = "Pending requests", body = [CorrectionRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn list_corrections(
    auth: AuthUser,
    service: web::Data<Service>,
) -> actix_web::Result<impl Responder> {
    let requests = service.list_correction_requests(&auth).await?;
    Ok(HttpResponse::Ok().json(requests))
}

fn resolution_body(resolution: Resolution) -> HttpResponse {
    match &resolution {
        Resolution::Applied { entry } => HttpResponse::Ok().json(json!({
            "message": resolution.message(),
            "entry": entry,
        })),
        Resolution::Rejected => HttpResponse::Ok().json(json!({
            "message": resolution.message(),
        })),
    }
}

#[utoipa::path(
    put,
    path = "/api/corrections/{id}/approve",
    params(
        ("id" = u64, Path, description = "Correction request id")
    ),
    responses(
        (status = 200, description = "Applied to the entry", body = Object, example = json!({
            "message": "Change request accepted and applied.",
            "entry": {"id": 7, "user_id": 42, "day": "2026-01-02", "clock_in": "08:00:00", "clock_out": "16:30:00"}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the requester's administrator or manager"),
        (status = 404, description = "Request or entry not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn approve_correction(
    auth: AuthUser,
    service: web::Data<Service>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let resolution = service
        .resolve_correction_request(&auth, path.into_inner(), true)
        .await?;
    Ok(resolution_body(resolution))
}

#[utoipa::path(
    put,
    path = "/api/corrections/{id}/reject",
    params(
        ("id" = u64, Path, description = "Correction request id")
    ),
    responses(
        (status = 200, description = "Request discarded", body = Object, example = json!({
            "message": "Change request rejected and deleted."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not the requester's administrator or manager"),
        (status = 404, description = "Request not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Correction"
)]
pub async fn reject_correction(
    auth: AuthUser,
    service: web::Data<Service>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let resolution = service
        .resolve_correction_request(&auth, path.into_inner(), false)
        .await?;
    Ok(resolution_body(resolution))
}
