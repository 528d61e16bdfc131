use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8, // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user manages a team
    #[serde(default)]
    pub team_managed_id: Option<u64>,
}

/// Only access tokens are accepted, so any other `token_type` (such as an
/// upstream issuer's refresh tokens) fails to decode.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
}
