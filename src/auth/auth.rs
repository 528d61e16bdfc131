use crate::auth::capability::{Anonymous, Capabilities};
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpRequest,
    dev::Payload,
    error::{ErrorInternalServerError, ErrorUnauthorized},
    http::header::AUTHORIZATION,
    web::Data,
};
use futures::future::{Ready, ready};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user manages a team
    pub team_managed_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthUser, actix_web::Error> {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or_else(|| ErrorUnauthorized("Missing token"))?;

    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| ErrorInternalServerError("Config missing"))?;

    // refresh tokens fail here: only `Access` decodes as a token type
    let claims = verify_token(token, &config.jwt_secret).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ErrorUnauthorized("Invalid token")
    })?;

    let role = Role::from_id(claims.role).ok_or_else(|| ErrorUnauthorized("Invalid role"))?;

    Ok(AuthUser {
        user_id: claims.user_id,
        username: claims.sub,
        role,
        team_managed_id: claims.team_managed_id,
    })
}

/// Identity for routes that also serve anonymous callers. A request
/// without an `Authorization` header is anonymous; one whose header does
/// not verify is rejected like on any other route.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequest for MaybeAuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        if !req.headers().contains_key(AUTHORIZATION) {
            return ready(Ok(MaybeAuthUser(None)));
        }
        ready(authenticate(req).map(|user| MaybeAuthUser(Some(user))))
    }
}

impl MaybeAuthUser {
    fn caller(&self) -> &dyn Capabilities {
        match &self.0 {
            Some(user) => user,
            None => &Anonymous,
        }
    }
}

impl Capabilities for MaybeAuthUser {
    fn user_id(&self) -> Option<u64> {
        self.caller().user_id()
    }

    fn is_admin(&self) -> bool {
        self.caller().is_admin()
    }

    fn managed_team(&self) -> Option<u64> {
        self.caller().managed_team()
    }
}

impl Capabilities for AuthUser {
    fn user_id(&self) -> Option<u64> {
        Some(self.user_id)
    }

    fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    fn managed_team(&self) -> Option<u64> {
        self.team_managed_id
    }
}
