use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::ApiError;

/// Kind of credential a token payload represents.
///
/// Access tokens are short-lived bearer credentials and are never persisted;
/// refresh tokens are long-lived, single-use under rotation, and every issued
/// one has a ledger row keyed by its `jti`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenType::Access => f.write_str("access"),
            TokenType::Refresh => f.write_str("refresh"),
        }
    }
}

/// Signed token payload. Exists only inside the token string; the ledger
/// persists refresh `jti`s separately.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Unique token id; for refresh tokens this is the ledger primary key
    pub jti: String,
    /// Subject (owning user's email)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub typ: TokenType,
    /// Client-supplied device/session identifier
    pub device_id: String,
}

/// Encodes and decodes signed, time-bound tokens.
///
/// Constructed once from [`Config`] and shared; signing and verification are
/// pure computation with no I/O.
#[derive(Clone)]
pub struct JwtCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl JwtCodec {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let algorithm: Algorithm = config
            .jwt_algorithm
            .parse()
            .map_err(|_| ApiError::Internal(format!("Unknown JWT algorithm: {}", config.jwt_algorithm)))?;

        // Keys are derived from the shared secret, which only works for the
        // HMAC family; asymmetric schemes would need key files.
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(ApiError::Internal(format!(
                "Unsupported JWT algorithm for a shared secret: {}",
                config.jwt_algorithm
            )));
        }

        Ok(JwtCodec {
            encoding: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            algorithm,
            access_ttl: Duration::minutes(config.access_token_expiry_minutes),
            refresh_ttl: Duration::days(config.refresh_token_expiry_days),
        })
    }

    /// Mint a fresh payload: `iat = now`, `exp = now + ttl(token_type)`,
    /// random unique `jti`.
    pub fn create_claims(&self, sub: &str, device_id: &str, token_type: TokenType) -> TokenClaims {
        let now = Utc::now();
        let ttl = match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
        };

        TokenClaims {
            jti: Uuid::new_v4().to_string(),
            sub: sub.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            typ: token_type,
            device_id: device_id.to_string(),
        }
    }

    /// Produce the signed token string for a payload.
    pub fn encode(&self, claims: &TokenClaims) -> Result<String, ApiError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("Failed to create token: {}", e)))
    }

    /// Verify and decode a token string.
    ///
    /// The signature is verified unconditionally; `exp` is checked only when
    /// `verify_exp` is true — callers state the policy per call site.
    pub fn decode(&self, token: &str, verify_exp: bool) -> Result<TokenClaims, ApiError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = verify_exp;
        validation.leeway = 0;

        let data = decode::<TokenClaims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::TokenExpired,
                _ => ApiError::InvalidToken,
            }
        })?;

        Ok(data.claims)
    }
}
