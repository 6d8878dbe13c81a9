//! Signed identity tokens
//!
//! Stateless HS256 tokens carrying subject, email and role. Validity is
//! purely a function of signature and time window at validation time;
//! nothing is persisted server-side. Every token gets a unique `jti` so
//! a revocation list can be bolted on later without changing the token
//! shape.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::SecuritySettings;
use crate::domain::{DomainError, DomainResult, UserRole};

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expiration_minutes: i64,
}

impl From<&SecuritySettings> for TokenConfig {
    fn from(security: &SecuritySettings) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            issuer: security.jwt_issuer.clone(),
            audience: security.jwt_audience.clone(),
            expiration_minutes: security.jwt_expiration_minutes,
        }
    }
}

/// Claims carried by every issued token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    /// Role name as of issuance; authorization re-reads the live role
    pub role: String,
    /// Unique token id, reserved for a future revocation list
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

/// Encoder/decoder for identity tokens.
///
/// Construction performs the fail-fast configuration check; a process
/// with an unset secret, issuer or audience never gets a codec.
pub struct TokenCodec {
    issuer: String,
    audience: String,
    expiration_minutes: i64,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: TokenConfig) -> DomainResult<Self> {
        if config.secret.is_empty() {
            return Err(DomainError::Configuration(
                "JWT secret is not configured".to_string(),
            ));
        }
        if config.issuer.is_empty() {
            return Err(DomainError::Configuration(
                "JWT issuer is not configured".to_string(),
            ));
        }
        if config.audience.is_empty() {
            return Err(DomainError::Configuration(
                "JWT audience is not configured".to_string(),
            ));
        }
        if config.expiration_minutes <= 0 {
            return Err(DomainError::Configuration(
                "JWT expiration must be positive".to_string(),
            ));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        // Zero clock-skew tolerance
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer,
            audience: config.audience,
            expiration_minutes: config.expiration_minutes,
            validation,
        })
    }

    pub fn expiration_minutes(&self) -> i64 {
        self.expiration_minutes
    }

    /// Issue a token for an authenticated user.
    pub fn issue(&self, user_id: &str, email: &str, role: UserRole) -> DomainResult<String> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            role: role.as_str().to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.expiration_minutes)).timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::validation(format!("Failed to create token: {e}")))
    }

    /// Verify signature, issuer, audience and time window. Malformed
    /// input is simply `false`; callers never learn the failure kind.
    pub fn validate(&self, token: &str) -> bool {
        match self.decode(token) {
            Ok(claims) => claims.iat <= Utc::now().timestamp(),
            Err(_) => false,
        }
    }

    /// Subject id of an already-validated token.
    pub fn subject(&self, token: &str) -> DomainResult<String> {
        self.decode(token)
            .map(|claims| claims.sub)
            .map_err(|_| DomainError::Unauthorized("Invalid token".to_string()))
    }

    /// Role claim of an already-validated token.
    pub fn role(&self, token: &str) -> DomainResult<UserRole> {
        let claims = self
            .decode(token)
            .map_err(|_| DomainError::Unauthorized("Invalid token".to_string()))?;
        UserRole::parse(&claims.role)
            .ok_or_else(|| DomainError::Unauthorized("Invalid token".to_string()))
    }

    fn decode(&self, token: &str) -> Result<TokenClaims, jsonwebtoken::errors::Error> {
        decode::<TokenClaims>(token, &self.decoding_key, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(TokenConfig {
            secret: "unit-test-secret".to_string(),
            issuer: "hipp-identity".to_string(),
            audience: "hipp-clients".to_string(),
            expiration_minutes: 30,
        })
        .unwrap()
    }

    #[test]
    fn issue_and_extract_round_trip() {
        let codec = codec();
        let token = codec
            .issue("user-123", "alice@example.com", UserRole::Menaxher)
            .unwrap();

        assert!(codec.validate(&token));
        assert_eq!(codec.subject(&token).unwrap(), "user-123");
        assert_eq!(codec.role(&token).unwrap(), UserRole::Menaxher);
    }

    #[test]
    fn each_token_gets_a_fresh_jti() {
        let codec = codec();
        let a = codec.issue("u", "u@example.com", UserRole::Admin).unwrap();
        let b = codec.issue("u", "u@example.com", UserRole::Admin).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_and_tampered_tokens_fail_closed() {
        let codec = codec();
        assert!(!codec.validate(""));
        assert!(!codec.validate("not-a-token"));

        let token = codec.issue("u", "u@example.com", UserRole::Shofer).unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(!codec.validate(&tampered));
    }

    #[test]
    fn expired_token_fails_even_with_valid_signature() {
        let codec = codec();
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "user-123".to_string(),
            email: "alice@example.com".to_string(),
            role: "Menaxher".to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: (now - Duration::minutes(10)).timestamp(),
            exp: (now - Duration::minutes(5)).timestamp(),
            iss: "hipp-identity".to_string(),
            aud: "hipp-clients".to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret("unit-test-secret".as_bytes()),
        )
        .unwrap();

        assert!(!codec.validate(&token));
    }

    #[test]
    fn wrong_secret_or_audience_is_rejected() {
        let codec = codec();
        let other = TokenCodec::new(TokenConfig {
            secret: "a-different-secret".to_string(),
            issuer: "hipp-identity".to_string(),
            audience: "hipp-clients".to_string(),
            expiration_minutes: 30,
        })
        .unwrap();
        let foreign_audience = TokenCodec::new(TokenConfig {
            secret: "unit-test-secret".to_string(),
            issuer: "hipp-identity".to_string(),
            audience: "someone-else".to_string(),
            expiration_minutes: 30,
        })
        .unwrap();

        let token = other.issue("u", "u@example.com", UserRole::Admin).unwrap();
        assert!(!codec.validate(&token));

        let token = foreign_audience
            .issue("u", "u@example.com", UserRole::Admin)
            .unwrap();
        assert!(!codec.validate(&token));
    }

    #[test]
    fn missing_configuration_fails_construction() {
        let result = TokenCodec::new(TokenConfig {
            secret: String::new(),
            issuer: "hipp-identity".to_string(),
            audience: "hipp-clients".to_string(),
            expiration_minutes: 30,
        });
        assert!(matches!(result, Err(DomainError::Configuration(_))));

        let result = TokenCodec::new(TokenConfig {
            secret: "secret".to_string(),
            issuer: String::new(),
            audience: "hipp-clients".to_string(),
            expiration_minutes: 30,
        });
        assert!(matches!(result, Err(DomainError::Configuration(_))));
    }
}
