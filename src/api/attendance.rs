use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::Service;
use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceEntry;
use crate::service::entries::Timesheet;

#[derive(Deserialize, ToSchema, Default)]
pub struct ClockRequest {
    /// Defaults to the caller
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    /// Must be today when given
    #[schema(example = "2026-01-02", format = "date", value_type = Option<String>)]
    pub day: Option<NaiveDate>,
}

#[derive(Deserialize, ToSchema)]
pub struct ModifyEntryRequest {
    #[schema(example = 42)]
    pub user_id: u64,
    /// Day of the entry to edit
    #[schema(example = "2026-01-02", format = "date", value_type = Option<String>)]
    pub day: Option<NaiveDate>,
    #[schema(example = "08:30:00", value_type = Option<String>)]
    pub clock_in: Option<NaiveTime>,
    #[schema(example = "17:00:00", value_type = Option<String>)]
    pub clock_out: Option<NaiveTime>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EntryQuery {
    /// Defaults to the caller
    #[schema(example = 42)]
    pub user_id: Option<u64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TimesheetQuery {
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    #[schema(example = "2026-01-01", format = "date", value_type = Option<String>)]
    pub start: Option<NaiveDate>,
    #[schema(example = "2026-01-31", format = "date", value_type = Option<String>)]
    pub end: Option<NaiveDate>,
}

/// Clock-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-in",
    request_body(content = ClockRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Shift opened", body = AttendanceEntry),
        (status = 400, description = "Already clocked in today", body = Object, example = json!({
            "message": "This user already clocked in today."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_in(
    auth: AuthUser,
    service: web::Data<Service>,
    body: Option<web::Json<ClockRequest>>,
) -> actix_web::Result<impl Responder> {
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    let entry = service
        .clock_in(&auth, body.user_id.unwrap_or(auth.user_id), body.day)
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// Clock-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/clock-out",
    request_body(content = ClockRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Shift closed", body = AttendanceEntry),
        (status = 400, description = "No open shift today", body = Object, example = json!({
            "message": "You have to clock in before clocking out."
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn clock_out(
    auth: AuthUser,
    service: web::Data<Service>,
    body: Option<web::Json<ClockRequest>>,
) -> actix_web::Result<impl Responder> {
    let target = body
        .and_then(|b| b.into_inner().user_id)
        .unwrap_or(auth.user_id);
    let entry = service.clock_out(&auth, target).await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// Direct entry edit by an administrator or the user's team manager
#[utoipa::path(
    put,
    path = "/api/attendance/entries",
    request_body(content = ModifyEntryRequest, content_type = "application/json"),
    responses(
        (status = 200, description = "Entry updated", body = AttendanceEntry),
        (status = 400, description = "Invalid times"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No entry for that day"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn modify_entry(
    auth: AuthUser,
    service: web::Data<Service>,
    body: web::Json<ModifyEntryRequest>,
) -> actix_web::Result<impl Responder> {
    let body = body.into_inner();
    let entry = service
        .modify_entry(&auth, body.user_id, body.day, body.clock_in, body.clock_out)
        .await?;
    Ok(HttpResponse::Ok().json(entry))
}

/// Today's entry, `null` when the user has not clocked in
#[utoipa::path(
    get,
    path = "/api/attendance/current",
    params(EntryQuery),
    responses(
        (status = 200, description = "Today's entry or null", body = AttendanceEntry),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn current_entry(
    auth: AuthUser,
    service: web::Data<Service>,
    query: web::Query<EntryQuery>,
) -> actix_web::Result<impl Responder> {
    let target = query.user_id.unwrap_or(auth.user_id);
    let entry = service.current_entry(&auth, target).await?;
    Ok(HttpResponse::Ok().json(entry))
}

#[utoipa::path(
    get,
    path = "/api/attendance/timesheet",
    params(TimesheetQuery),
    responses(
        (status = 200, description = "Entries with durations", body = Timesheet),
        (status = 400, description = "start is after end"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn timesheet(
    auth: AuthUser,
    service: web::Data<Service>,
    query: web::Query<TimesheetQuery>,
) -> actix_web::Result<impl Responder> {
    let query = query.into_inner();
    let sheet = service
        .timesheet(&auth, query.user_id, query.start, query.end)
        .await?;
    Ok(HttpResponse::Ok().json(sheet))
}
