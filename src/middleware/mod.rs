//! HTTP middleware.

mod bearer_auth;

pub use bearer_auth::bearer_token;
pub use bearer_auth::RequireAuth;
