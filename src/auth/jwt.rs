//! HS256 access tokens. Issuing is left to whichever identity service sits
//! in front of the API; this crate only needs to mint tokens in tests and
//! tooling, and to verify them on every request.

use chrono::{TimeDelta, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Result};
use uuid::Uuid;

use super::auth::AuthUser;
use crate::models::{Claims, TokenType};

pub fn issue_access_token(user: &AuthUser, secret: &str, ttl: TimeDelta) -> Result<String> {
    let claims = Claims {
        user_id: user.user_id,
        sub: user.username.clone(),
        role: user.role as u8,
        exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        jti: Uuid::new_v4().to_string(),
        token_type: TokenType::Access,
        team_managed_id: user.team_managed_id,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Checks signature and expiry; the token type is left to the caller.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}
