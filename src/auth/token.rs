//! Token codec: issues and verifies the signed bearer credential.
//!
//! The codec is stateless apart from the signing secret. Cryptographic
//! validity is necessary but not sufficient: the authenticator still
//! consults the session store before trusting a verified token.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::AppError;

/// Fixed time-to-live of an issued token: one hour.
pub const TOKEN_TTL_SECONDS: i64 = 3600;

/// Signature-level rejection. The authenticator collapses both variants
/// into a single caller-visible outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Unparsable structure or signature mismatch
    Malformed,
    /// Valid signature, expiry in the past
    Expired,
}

/// A freshly issued token together with its decoded claims, so callers can
/// persist the session expiry exactly as encoded instead of recomputing it.
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

#[derive(Clone)]
pub struct TokenCodec {
    secret: String,
}

impl TokenCodec {
    pub fn new(settings: &AuthSettings) -> Self {
        Self {
            secret: settings.secret.clone(),
        }
    }

    /// Issue a signed token for an account, expiring [`TOKEN_TTL_SECONDS`]
    /// from now.
    ///
    /// Fails only if encoding itself fails, which indicates a
    /// misconfigured process rather than a bad request.
    pub fn issue(&self, user_id: i32, username: &str) -> Result<IssuedToken, AppError> {
        let claims = Claims::new(user_id, username.to_string(), TOKEN_TTL_SECONDS);

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("token generation failed: {}", e)))?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, returning the decoded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_codec() -> TokenCodec {
        TokenCodec::new(&AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
        })
    }

    #[test]
    fn issue_and_verify_round_trip() {
        let codec = test_codec();

        let issued = codec.issue(42, "alice").expect("failed to issue token");
        let claims = codec.verify(&issued.token).expect("failed to verify token");

        assert_eq!(claims.sub, "42");
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.jti, issued.claims.jti);
        assert_eq!(claims.exp, issued.claims.exp);
    }

    #[test]
    fn issued_expiry_is_one_hour_out() {
        let codec = test_codec();
        let before = chrono::Utc::now().timestamp();
        let issued = codec.issue(1, "alice").expect("failed to issue token");

        assert!(issued.claims.exp >= before + TOKEN_TTL_SECONDS);
        assert!(issued.claims.exp <= chrono::Utc::now().timestamp() + TOKEN_TTL_SECONDS);
    }

    #[test]
    fn garbage_is_malformed() {
        let codec = test_codec();
        assert_eq!(codec.verify("invalid.token.here"), Err(TokenError::Malformed));
    }

    #[test]
    fn tampered_token_is_malformed() {
        let codec = test_codec();
        let issued = codec.issue(1, "alice").expect("failed to issue token");

        let tampered = format!("{}X", issued.token);
        assert_eq!(codec.verify(&tampered), Err(TokenError::Malformed));
    }

    #[test]
    fn wrong_secret_is_malformed() {
        let codec = test_codec();
        let other = TokenCodec::new(&AuthSettings {
            secret: "a-completely-different-secret-of-decent-size".to_string(),
        });

        let issued = codec.issue(1, "alice").expect("failed to issue token");
        assert_eq!(other.verify(&issued.token), Err(TokenError::Malformed));
    }

    #[test]
    fn expired_token_is_expired() {
        let codec = test_codec();

        // Hand-craft claims well past the validation leeway.
        let mut claims = Claims::new(1, "alice".to_string(), TOKEN_TTL_SECONDS);
        claims.iat -= 7200;
        claims.exp = claims.iat + TOKEN_TTL_SECONDS / 2;

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret("test-secret-key-at-least-32-characters-long".as_bytes()),
        )
        .expect("failed to encode test token");

        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }
}
