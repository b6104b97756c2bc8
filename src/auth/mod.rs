use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SecurityConfig;

// Ten years; keeps chrono arithmetic in range for absurd configuration values.
const MAX_EXPIRY_HOURS: i64 = 24 * 365 * 10;

/// Bearer token claims. `sub` carries the username the token was issued to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl Claims {
    pub fn new(username: impl Into<String>, issuer: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: username.into(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            iss: issuer,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT secret not configured")]
    InvalidSecret,

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),
}

/// Signing and verification settings shared by the middleware and the CLI.
#[derive(Debug, Clone)]
pub struct JwtSettings {
    secret: String,
    issuer: Option<String>,
    expiry_hours: u64,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, issuer: Option<String>, expiry_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            issuer,
            expiry_hours,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.secret.is_empty()
    }

    /// Issue a token for `username` valid for `expiry_hours`.
    pub fn issue_token(&self, username: &str) -> Result<String, JwtError> {
        let hours = i64::try_from(self.expiry_hours)
            .unwrap_or(MAX_EXPIRY_HOURS)
            .min(MAX_EXPIRY_HOURS);
        let ttl = Duration::hours(hours);
        self.encode_claims(&Claims::new(username, self.issuer.clone(), ttl))
    }

    pub fn encode_claims(&self, claims: &Claims) -> Result<String, JwtError> {
        if !self.is_configured() {
            return Err(JwtError::InvalidSecret);
        }

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::new(Algorithm::HS256), claims, &encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Validate signature, expiry and (when configured) issuer.
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        if !self.is_configured() {
            return Err(JwtError::InvalidSecret);
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

        if token_data.claims.sub.trim().is_empty() {
            return Err(JwtError::InvalidToken("missing subject".to_string()));
        }

        Ok(token_data.claims)
    }
}

impl From<&SecurityConfig> for JwtSettings {
    fn from(security: &SecurityConfig) -> Self {
        Self::new(
            security.jwt_secret.clone(),
            security.jwt_issuer.clone(),
            security.jwt_expiry_hours,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> JwtSettings {
        JwtSettings::new("unit-test-secret", None, 1)
    }

    #[test]
    fn issued_token_verifies() {
        let jwt = settings();
        let token = jwt.issue_token("admin").unwrap();
        let claims = jwt.verify(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = JwtSettings::new("another-secret", None, 1)
            .issue_token("admin")
            .unwrap();
        assert!(matches!(settings().verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let jwt = settings();
        let claims = Claims::new("admin", None, Duration::hours(-2));
        let token = jwt.encode_claims(&claims).unwrap();
        assert!(matches!(jwt.verify(&token), Err(JwtError::InvalidToken(_))));
    }

    #[test]
    fn empty_secret_is_refused() {
        let jwt = JwtSettings::new("", None, 1);
        assert!(matches!(jwt.issue_token("admin"), Err(JwtError::InvalidSecret)));
        assert!(matches!(jwt.verify("abc"), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn issuer_must_match_when_configured() {
        let issuing = JwtSettings::new("unit-test-secret", Some("someone-else".to_string()), 1);
        let verifying = JwtSettings::new("unit-test-secret", Some("todo-api".to_string()), 1);
        let token = issuing.issue_token("admin").unwrap();
        assert!(verifying.verify(&token).is_err());

        let token = verifying.issue_token("admin").unwrap();
        assert_eq!(verifying.verify(&token).unwrap().iss.as_deref(), Some("todo-api"));
    }
}
