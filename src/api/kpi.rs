use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use super::Service;
use crate::auth::auth::MaybeAuthUser;
use crate::service::kpi::KpiReport;

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct KpiQuery {
    /// Defaults to the caller, which then requires a token
    #[schema(example = 42)]
    pub user_id: Option<u64>,
    /// Window length in days, 1 to 365
    #[schema(example = 30)]
    pub period: i64,
}

/// Workload KPIs over the last `period` days
#[utoipa::path(
    get,
    path = "/api/kpis",
    params(KpiQuery),
    responses(
        (status = 200, description = "KPI report", body = KpiReport),
        (status = 400, description = "Invalid period", body = Object, example = json!({
            "message": "Period too long, max is 365 days."
        })),
        (status = 401, description = "Invalid token, or neither a user nor a token given"),
        (status = 404, description = "Requested user does not exist"),
        (status = 500, description = "Internal server error")
    ),
    security(
        (),
        ("bearer_auth" = [])
    ),
    tag = "Kpi"
)]
pub async fn get_kpis(
    auth: MaybeAuthUser,
    service: web::Data<Service>,
    query: web::Query<KpiQuery>,
) -> actix_web::Result<impl Responder> {
    let report = service
        .compute_kpis(&auth, query.user_id, query.period)
        .await?;
    Ok(HttpResponse::Ok().json(report))
}
