//! JWT bearer tokens.
//!
//! Tokens carry the authenticated identity `(user_id, login, is_moderator)`
//! so the API layer can resolve a caller without a database round-trip.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user ID.
    pub user_id: String,
    /// Authenticated user login.
    pub login: String,
    /// Whether the user is a moderator.
    pub is_moderator: bool,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
}

/// HS256 JWT issuing and validation.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a new token service from an HMAC secret.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a token for the given identity.
    pub fn generate(&self, user_id: &str, login: &str, is_moderator: bool) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            login: login.to_string(),
            is_moderator,
            exp: (now + Duration::seconds(self.ttl_secs)).timestamp(),
            iat: now.timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims.
    ///
    /// Expired or tampered tokens fail with [`AppError::Unauthorized`].
    pub fn validate(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);

        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", 3600)
    }

    #[test]
    fn test_claims_round_trip() {
        let svc = service();
        let token = svc.generate("user1", "alice", true).unwrap();
        let claims = svc.validate(&token).unwrap();

        assert_eq!(claims.user_id, "user1");
        assert_eq!(claims.login, "alice");
        assert!(claims.is_moderator);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let svc = service();
        let token = svc.generate("user1", "alice", false).unwrap();

        let mut tampered = token.clone();
        tampered.push('x');
        assert!(matches!(
            svc.validate(&tampered),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().generate("user1", "alice", false).unwrap();
        let other = TokenService::new("other-secret", 3600);

        assert!(matches!(other.validate(&token), Err(AppError::Unauthorized)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = TokenService::new("test-secret", -10);
        let token = svc.generate("user1", "alice", false).unwrap();

        assert!(matches!(svc.validate(&token), Err(AppError::Unauthorized)));
    }
}
