//! Server-side session records.
//!
//! A session row makes an otherwise stateless bearer token revocable: the
//! store, not the token, is the source of truth for whether a credential is
//! still live. Rows whose expiry has passed are logically dead and are
//! removed lazily, either when authentication trips over them or during the
//! owning account's next login.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::auth::token::TokenCodec;
use crate::error::{AppError, DatabaseError};

/// One live authentication grant. An account may own any number of
/// concurrent sessions (multi-device login).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub id: i32,
    pub user_id: i32,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Insert a new session row.
///
/// The token column is unique; a duplicate token surfaces as a conflict
/// rather than being assumed impossible, even though UUID `jti` values make
/// it practically unreachable.
pub async fn create_session(
    pool: &PgPool,
    user_id: i32,
    token: &str,
    expires_at: DateTime<Utc>,
) -> Result<Session, AppError> {
    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (user_id, token, expires_at)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, token, expires_at, created_at
        "#,
    )
    .bind(user_id)
    .bind(token)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.code().as_deref() == Some("23505") {
                return AppError::Database(DatabaseError::Duplicate(
                    "session token already exists".to_string(),
                ));
            }
        }
        e.into()
    })
}

/// Look up a session by the exact token string. Liveness is the caller's
/// decision; this only reports presence.
pub async fn find_session_by_token(
    pool: &PgPool,
    token: &str,
) -> Result<Option<Session>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT id, user_id, token, expires_at, created_at
        FROM sessions
        WHERE token = $1
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Remove the session matching the token. Idempotent: deleting a token that
/// has no row is not an error.
pub async fn delete_session_by_token(pool: &PgPool, token: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM sessions WHERE token = $1")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete all of an account's sessions whose expiry is at or before `now`.
///
/// Called opportunistically at login, so the cleanup cost rides on an
/// operation the user is already paying for. Racing logins for the same
/// account delete disjoint-or-overlapping sets of dead rows; deleting an
/// already-deleted row is a no-op.
pub async fn delete_expired_sessions_for_user(
    pool: &PgPool,
    user_id: i32,
    now: DateTime<Utc>,
) -> Result<u64, AppError> {
    let result = sqlx::query("DELETE FROM sessions WHERE user_id = $1 AND expires_at <= $2")
        .bind(user_id)
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Start a session for an account that has already been authenticated.
///
/// Cleans up the account's expired sessions, issues a token, and persists a
/// session row whose expiry is taken verbatim from the token's encoded
/// claims. The session expiry is never recomputed independently; the row
/// and the token must agree by construction.
pub async fn start_session(
    pool: &PgPool,
    codec: &TokenCodec,
    user_id: i32,
    username: &str,
) -> Result<String, AppError> {
    let reaped = delete_expired_sessions_for_user(pool, user_id, Utc::now()).await?;
    if reaped > 0 {
        tracing::debug!(user_id = user_id, reaped = reaped, "deleted expired sessions at login");
    }

    let issued = codec.issue(user_id, username)?;

    let expires_at = DateTime::<Utc>::from_timestamp(issued.claims.exp, 0)
        .ok_or_else(|| AppError::Internal("token expiry out of range".to_string()))?;

    create_session(pool, user_id, &issued.token, expires_at).await?;

    tracing::info!(user_id = user_id, "session created");

    Ok(issued.token)
}

/// End exactly one session: the one belonging to the presented token.
/// Other concurrent sessions for the same account stay valid.
pub async fn end_session(pool: &PgPool, token: &str) -> Result<(), AppError> {
    delete_session_by_token(pool, token).await
}
