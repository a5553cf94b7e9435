//! Unified error handling.
//!
//! Expected rejections flow through `AppError` as values; handlers never
//! panic or use exceptions-as-control-flow for "not found"/"invalid"
//! conditions. The boundary maps every variant to a fixed status plus a
//! single-field `{"error": "..."}` payload, so internal distinctions
//! (malformed vs. expired vs. revoked token, unknown user vs. wrong
//! password) are never leaked to the client.

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use std::error::Error as StdError;
use std::fmt;

/// Validation errors for input data
#[derive(Debug, Clone)]
pub enum ValidationError {
    EmptyField(String),
    TooShort(String, usize),
    TooLong(String, usize),
    InvalidFormat(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyField(field) => write!(f, "{} cannot be empty", field),
            ValidationError::TooShort(field, min) => {
                write!(f, "{} is too short (minimum {} characters)", field, min)
            }
            ValidationError::TooLong(field, max) => {
                write!(f, "{} is too long (maximum {} characters)", field, max)
            }
            ValidationError::InvalidFormat(msg) => write!(f, "{}", msg),
        }
    }
}

impl StdError for ValidationError {}

/// Database operation errors
#[derive(Debug)]
pub enum DatabaseError {
    /// Unique constraint violation; the message names the duplicate resource.
    Duplicate(String),
    NotFound(String),
    ConnectionPool(String),
    UnexpectedError(String),
}

impl fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatabaseError::Duplicate(msg) => write!(f, "{}", msg),
            DatabaseError::NotFound(msg) => write!(f, "{} not found", msg),
            DatabaseError::ConnectionPool(msg) => write!(f, "database connection error: {}", msg),
            DatabaseError::UnexpectedError(msg) => write!(f, "database error: {}", msg),
        }
    }
}

impl StdError for DatabaseError {}

/// Authentication rejections.
///
/// `LoginFailed` deliberately covers unknown username, wrong password and
/// disabled account, so callers cannot enumerate accounts. `TokenInvalid`
/// likewise covers malformed signature, expired signature, unknown or
/// revoked session and disabled account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    LoginFailed,
    TokenMissing,
    TokenInvalid,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::LoginFailed => write!(f, "invalid username or password"),
            AuthError::TokenMissing => write!(f, "token missing"),
            AuthError::TokenInvalid => write!(f, "token invalid"),
        }
    }
}

impl StdError for AuthError {}

/// Central error type that all application errors map to
#[derive(Debug)]
pub enum AppError {
    Validation(ValidationError),
    Database(DatabaseError),
    Auth(AuthError),
    Forbidden,
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "{}", e),
            AppError::Database(e) => write!(f, "{}", e),
            AppError::Auth(e) => write!(f, "{}", e),
            AppError::Forbidden => write!(f, "forbidden"),
            AppError::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl StdError for AppError {}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        AppError::Database(err)
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Auth(err)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => {
                AppError::Database(DatabaseError::NotFound("record".to_string()))
            }
            sqlx::Error::Database(db_err) => {
                // 23505 = Postgres unique_violation
                if db_err.code().as_deref() == Some("23505") {
                    AppError::Database(DatabaseError::Duplicate("resource already exists".to_string()))
                } else {
                    AppError::Database(DatabaseError::UnexpectedError(db_err.to_string()))
                }
            }
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AppError::Database(DatabaseError::ConnectionPool(err.to_string()))
            }
            _ => AppError::Database(DatabaseError::UnexpectedError(err.to_string())),
        }
    }
}

/// Single-field error payload, matching every error response of the API.
#[derive(Debug, serde::Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl AppError {
    /// Message shown to the client. Unexpected failures collapse to a
    /// generic message; details stay in the logs.
    fn client_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Database(DatabaseError::Duplicate(msg)) => msg.clone(),
            AppError::Database(DatabaseError::NotFound(what)) => format!("{} not found", what),
            AppError::Database(_) => "internal server error".to_string(),
            AppError::Auth(e) => e.to_string(),
            AppError::Forbidden => "forbidden".to_string(),
            AppError::Internal(_) => "internal server error".to_string(),
        }
    }

    fn log(&self) {
        match self {
            AppError::Validation(e) => {
                tracing::warn!(error = %e, "validation error");
            }
            AppError::Database(DatabaseError::Duplicate(_)) => {
                tracing::warn!(error = %self, "duplicate entry attempt");
            }
            AppError::Database(DatabaseError::NotFound(_)) => {
                tracing::debug!(error = %self, "resource not found");
            }
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
            }
            AppError::Auth(e) => {
                tracing::warn!(error = %e, "authentication rejected");
            }
            AppError::Forbidden => {
                tracing::warn!("forbidden access attempt");
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(e) => match e {
                DatabaseError::Duplicate(_) => StatusCode::CONFLICT,
                DatabaseError::NotFound(_) => StatusCode::NOT_FOUND,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Auth(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        self.log();
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.client_message(),
        })
    }
}

/// Shorthand for "not found" rejections, e.g. `not_found("blog")`.
#[inline]
pub fn not_found(what: &str) -> AppError {
    AppError::Database(DatabaseError::NotFound(what.to_string()))
}
