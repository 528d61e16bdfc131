pub mod attendance;
pub mod correction;
pub mod kpi;
pub mod team;

use crate::service::AttendanceService;
use crate::store::MySqlStore;

/// The service instance shared by every handler through `web::Data`.
pub type Service = AttendanceService<MySqlStore>;
