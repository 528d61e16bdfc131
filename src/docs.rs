use crate::api::attendance::{ClockRequest, EntryQuery, ModifyEntryRequest, TimesheetQuery};
use crate::api::correction::CreateCorrection;
use crate::api::kpi::KpiQuery;
use crate::api::team::{PresenceQuery, TeamUser};
use crate::model::{
    attendance::AttendanceEntry, correction::CorrectionRequest, team::Team, team::TeamSummary,
};
use crate::service::{
    entries::{Timesheet, TimesheetRow},
    kpi::{DailyTotal, KpiReport},
    team::{MemberSnapshot, MemberStatus},
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Timeclock API",
        version = "1.0.0",
        description = r#"
## Employee time clock

Daily clock-in/clock-out tracking with a manager-reviewed correction workflow
and workload reporting.

### Key Features
- **Attendance**: open and close the day's shift, timesheets, direct edits by managers
- **Corrections**: employees request changed times, managers or admins apply or reject them
- **KPIs**: hours, presence rate and worked days over a window, compared with the previous one
- **Teams**: presence snapshot of the caller's team, manager and member assignment

### Security
Endpoints expect a **JWT Bearer** access token. `GET /kpis` also answers
anonymous callers when an explicit `user_id` is given.
"#,
    ),
    paths(
        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::modify_entry,
        crate::api::attendance::current_entry,
        crate::api::attendance::timesheet,

        crate::api::correction::create_correction,
        crate::api::correction::list_corrections,
        crate::api::correction::approve_correction,
        crate::api::correction::reject_correction,

        crate::api::kpi::get_kpis,

        crate::api::team::team_presence,
        crate::api::team::set_manager,
        crate::api::team::add_member
    ),
    components(
        schemas(
            AttendanceEntry,
            ClockRequest,
            ModifyEntryRequest,
            EntryQuery,
            TimesheetQuery,
            Timesheet,
            TimesheetRow,
            CorrectionRequest,
            CreateCorrection,
            KpiQuery,
            KpiReport,
            DailyTotal,
            PresenceQuery,
            MemberSnapshot,
            MemberStatus,
            TeamUser,
            Team,
            TeamSummary
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Attendance", description = "Clock-in/out and entry APIs"),
        (name = "Correction", description = "Correction request workflow"),
        (name = "Kpi", description = "Workload metrics"),
        (name = "Team", description = "Team presence and membership"),
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_with_bearer_scheme() {
        let doc = ApiDoc::openapi();

        for path in [
            "/api/attendance/clock-in",
            "/api/attendance/timesheet",
            "/api/corrections/{id}/approve",
            "/api/kpis",
            "/api/teams/{id}/members",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
        assert!(components.schemas.contains_key("KpiReport"));
    }
}
