//! Claims carried inside the signed bearer token.
//!
//! The token is a bearer credential only; its claims mirror the session row
//! that is the actual revocation authority.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AuthError};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    /// Subject: the account id, as a string per JWT convention
    pub sub: String,
    /// Account handle, for display and cross-checks
    pub username: String,
    /// Unique token id; makes every issued token distinct
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a freshly issued token, expiring `ttl_seconds`
    /// from now. The `jti` is a new UUID v4, so two logins for the same
    /// account never produce equal tokens.
    pub fn new(user_id: i32, username: String, ttl_seconds: i64) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            username,
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + ttl_seconds,
        }
    }

    /// Extract the account id from the subject claim.
    ///
    /// A non-numeric subject means the token was not produced by this
    /// codec, which is a rejection, not an internal error.
    pub fn user_id(&self) -> Result<i32, AppError> {
        self.sub
            .parse::<i32>()
            .map_err(|_| AppError::Auth(AuthError::TokenInvalid))
    }
}
