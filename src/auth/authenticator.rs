//! The authentication decision procedure.
//!
//! Reconciles two trust models: the token's signature ("trust the
//! signature") and the session store ("trust the store"). A token is
//! accepted only when both agree and the owning account is still enabled.
//! Every rejection collapses to one of two caller-visible outcomes:
//! no credential supplied, or credential rejected.

use chrono::Utc;
use sqlx::PgPool;

use crate::auth::session::{delete_session_by_token, find_session_by_token};
use crate::auth::token::TokenCodec;
use crate::error::{AppError, AuthError};

/// The identity produced by a successful authentication. Carries the
/// presented token so logout can target exactly this session.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: i32,
    pub username: String,
    pub token: String,
}

/// Authenticate a presented bearer token, or the absence of one.
///
/// Checks in order, short-circuiting on the first failure:
/// 1. a token must be present;
/// 2. its signature and encoded expiry must verify;
/// 3. a session row must exist for the exact token string;
/// 4. the row must belong to the token's account and still be live, with
///    an expiry equal to the one encoded in the token — any divergence is
///    treated as a dead session, deleted, and rejected (fail closed);
/// 5. the account must exist and not be disabled.
///
/// Only store failures propagate as errors in their own right; every
/// expected rejection is `TokenMissing` or `TokenInvalid`.
pub async fn authenticate(
    pool: &PgPool,
    codec: &TokenCodec,
    bearer: Option<&str>,
) -> Result<CurrentUser, AppError> {
    let token = bearer.ok_or(AuthError::TokenMissing)?;

    let claims = codec.verify(token).map_err(|e| {
        tracing::warn!(reason = ?e, "token failed signature-level verification");
        AuthError::TokenInvalid
    })?;

    let session = find_session_by_token(pool, token)
        .await?
        .ok_or(AuthError::TokenInvalid)?;

    let token_user_id = claims.user_id()?;
    let now = Utc::now();

    // A row owned by a different account, already past its recorded expiry,
    // or disagreeing with the token about when it expires is dead. Delete it
    // and reject.
    if session.user_id != token_user_id
        || session.expires_at <= now
        || session.expires_at.timestamp() != claims.exp
    {
        tracing::warn!(
            session_id = session.id,
            session_user_id = session.user_id,
            token_user_id = token_user_id,
            "stale or mismatched session; deleting"
        );
        delete_session_by_token(pool, token).await?;
        return Err(AuthError::TokenInvalid.into());
    }

    let user = sqlx::query_as::<_, (String, bool)>(
        "SELECT username, disabled FROM users WHERE id = $1",
    )
    .bind(token_user_id)
    .fetch_optional(pool)
    .await?;

    match user {
        Some((username, false)) => Ok(CurrentUser {
            user_id: token_user_id,
            username,
            token: token.to_string(),
        }),
        Some((_, true)) => {
            tracing::warn!(user_id = token_user_id, "token presented for disabled account");
            Err(AuthError::TokenInvalid.into())
        }
        None => {
            tracing::warn!(user_id = token_user_id, "token presented for missing account");
            Err(AuthError::TokenInvalid.into())
        }
    }
}
