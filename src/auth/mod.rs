//! Authentication and session lifecycle.
//!
//! Signed bearer tokens layered over revocable server-side sessions:
//! the token codec proves who issued a credential, the session store
//! decides whether it is still live, and the authenticator combines both
//! with an account-status check.

mod authenticator;
mod claims;
mod password;
mod session;
mod token;

pub use authenticator::authenticate;
pub use authenticator::CurrentUser;
pub use claims::Claims;
pub use password::hash_password;
pub use password::verify_password;
pub use session::delete_expired_sessions_for_user;
pub use session::delete_session_by_token;
pub use session::end_session;
pub use session::find_session_by_token;
pub use session::start_session;
pub use session::Session;
pub use token::TokenCodec;
pub use token::TokenError;
pub use token::TOKEN_TTL_SECONDS;
