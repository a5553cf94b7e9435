//! Login and logout.
//!
//! Login verifies credentials, then opens a session: expired sessions for
//! the account are reaped, a token is issued, and a session row mirroring
//! the token's expiry is persisted. Logout ends exactly the session that
//! authenticated the request.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{end_session, start_session, verify_password, CurrentUser, TokenCodec};
use crate::error::{AppError, AuthError, ValidationError};

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub name: String,
}

/// POST /api/login
///
/// # Security Notes
/// Unknown username, wrong password and disabled account all produce the
/// same 401 response, so callers cannot enumerate accounts or probe their
/// status.
pub async fn login(
    form: web::Json<LoginRequest>,
    pool: web::Data<PgPool>,
    codec: web::Data<TokenCodec>,
) -> Result<HttpResponse, AppError> {
    if form.username.trim().is_empty() || form.password.is_empty() {
        return Err(AppError::Validation(ValidationError::InvalidFormat(
            "username and password are required".to_string(),
        )));
    }

    let user = sqlx::query_as::<_, (i32, String, String, String, bool)>(
        "SELECT id, username, name, password_hash, disabled FROM users WHERE username = $1",
    )
    .bind(&form.username)
    .fetch_optional(pool.get_ref())
    .await?;

    let (user_id, username, name, password_hash, disabled) =
        user.ok_or(AuthError::LoginFailed)?;

    if disabled {
        tracing::warn!(user_id = user_id, "login attempt for disabled account");
        return Err(AuthError::LoginFailed.into());
    }

    if !verify_password(&form.password, &password_hash)? {
        return Err(AuthError::LoginFailed.into());
    }

    let token = start_session(pool.get_ref(), codec.get_ref(), user_id, &username).await?;

    tracing::info!(user_id = user_id, "user logged in");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        username,
        name,
    }))
}

/// DELETE /api/logout
///
/// Requires a valid bearer token; the identity is resolved by the auth
/// middleware before this handler runs. Deletes only the presented
/// session, leaving the account's other sessions valid.
pub async fn logout(
    user: web::ReqData<CurrentUser>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    end_session(pool.get_ref(), &user.token).await?;

    tracing::info!(user_id = user.user_id, "user logged out");

    Ok(HttpResponse::NoContent().finish())
}
