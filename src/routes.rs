use crate::{
    api::{attendance, correction, kpi, team},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::web;
use tracing::warn;

/// Per-IP limiter allowing `requests_per_min` requests, refilled evenly.
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);
    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_else(|| {
            warn!(requests_per_min, "Rejected limiter settings, using defaults");
            Default::default()
        });
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    // Identity comes from the AuthUser extractor on each handler; the KPI
    // route also serves anonymous callers.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(build_limiter(config.rate_protected_per_min))
            .service(
                web::scope("/attendance")
                    // /attendance/clock-in
                    .service(web::resource("/clock-in").route(web::post().to(attendance::clock_in)))
                    // /attendance/clock-out
                    .service(
                        web::resource("/clock-out").route(web::post().to(attendance::clock_out)),
                    )
                    // /attendance/entries
                    .service(
                        web::resource("/entries").route(web::put().to(attendance::modify_entry)),
                    )
                    // /attendance/current
                    .service(
                        web::resource("/current").route(web::get().to(attendance::current_entry)),
                    )
                    // /attendance/timesheet
                    .service(
                        web::resource("/timesheet").route(web::get().to(attendance::timesheet)),
                    ),
            )
            .service(
                web::scope("/corrections")
                    // /corrections
                    .service(
                        web::resource("")
                            .route(web::get().to(correction::list_corrections))
                            .route(web::post().to(correction::create_correction)),
                    )
                    // /corrections/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(correction::approve_correction)),
                    )
                    // /corrections/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(correction::reject_correction)),
                    ),
            )
            .service(web::resource("/kpis").route(web::get().to(kpi::get_kpis)))
            .service(
                web::scope("/teams")
                    // /teams/presence
                    .service(web::resource("/presence").route(web::get().to(team::team_presence)))
                    // /teams/{id}/manager
                    .service(web::resource("/{id}/manager").route(web::put().to(team::set_manager)))
                    // /teams/{id}/members
                    .service(
                        web::resource("/{id}/members").route(web::post().to(team::add_member)),
                    ),
            ),
    );
}
