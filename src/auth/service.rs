use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};

use crate::auth::csrf::constant_time_eq;
use crate::auth::jwt::{JwtCodec, TokenClaims, TokenType};
use crate::auth::ledger::{self, RevokeFilter, TokenRecord};
use crate::auth::password::verify_password;
use crate::error::ApiError;
use crate::models::user::{self, Entity as User};

/// An issued access/refresh token pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Coordinates login, refresh and logout: owns token-pair issuance and the
/// rotation policy over the token ledger.
///
/// Conceptual states per (subject, device_id) pair:
/// NoSession → Active → Revoked.
#[derive(Clone)]
pub struct AuthService {
    db: DatabaseConnection,
    codec: JwtCodec,
}

impl AuthService {
    pub fn new(db: DatabaseConnection, codec: JwtCodec) -> Self {
        AuthService { db, codec }
    }

    /// Authenticate and issue a fresh token pair for the device.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        device_id: &str,
    ) -> Result<TokenPair, ApiError> {
        let db_user = self.authenticate(username, password).await?;
        self.issue_pair(&db_user.email, device_id).await
    }

    /// Exchange a refresh token for a new pair (one-time-use rotation).
    pub async fn refresh(&self, refresh_token: &str, device_id: &str) -> Result<TokenPair, ApiError> {
        let claims = self.verify_token_and_type(refresh_token, TokenType::Refresh, true)?;

        // Three-way revocation check: an unknown jti is an invalid token,
        // not a live one.
        match ledger::is_revoked(&self.db, &claims.jti).await? {
            None => return Err(ApiError::InvalidToken),
            Some(true) => return Err(ApiError::RevokedToken),
            Some(false) => {}
        }

        self.issue_pair(&claims.sub, device_id).await
    }

    /// Revoke the live refresh token for one device. Returns the number of
    /// rows actually revoked (0 when already logged out).
    pub async fn logout(&self, email: &str, device_id: &str) -> Result<u64, ApiError> {
        let txn = self.db.begin().await?;
        let revoked = ledger::revoke_matching(
            &txn,
            RevokeFilter {
                email,
                device_id: Some(device_id),
            },
        )
        .await?;
        txn.commit().await?;
        Ok(revoked)
    }

    /// Revoke every live refresh token for the subject, across all devices.
    pub async fn logout_all(&self, email: &str) -> Result<u64, ApiError> {
        let txn = self.db.begin().await?;
        let revoked = ledger::revoke_matching(
            &txn,
            RevokeFilter {
                email,
                device_id: None,
            },
        )
        .await?;
        txn.commit().await?;
        Ok(revoked)
    }

    /// Decode a token and require its `typ` claim to match.
    pub fn verify_token_and_type(
        &self,
        token: &str,
        expected: TokenType,
        verify_exp: bool,
    ) -> Result<TokenClaims, ApiError> {
        let claims = self.codec.decode(token, verify_exp)?;

        if claims.typ != expected {
            return Err(ApiError::WrongTokenType {
                expected,
                got: claims.typ,
            });
        }

        Ok(claims)
    }

    /// Look up the user and check credentials. The failure is the same
    /// generic message whether the user is missing or the password is wrong,
    /// and the username echo is compared in constant time on top of the
    /// indexed lookup.
    async fn authenticate(&self, username: &str, password: &str) -> Result<user::Model, ApiError> {
        let db_user = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or(ApiError::NotAuthorized)?;

        let username_ok = constant_time_eq(username.as_bytes(), db_user.username.as_bytes());
        let password_ok = verify_password(password, &db_user.hashed_password)?;

        if !(username_ok && password_ok) {
            return Err(ApiError::NotAuthorized);
        }

        Ok(db_user)
    }

    /// Issue a new token pair for (subject, device_id).
    ///
    /// The refresh token is minted first so its `jti` can be persisted.
    /// Revoking all prior tokens for the pair and inserting the new record
    /// commit in one transaction — partial application is never observable.
    ///
    /// Two refreshes racing on the same not-yet-revoked token can both
    /// succeed before either's revoke lands; each call is still atomic, but
    /// no cross-request mutual exclusion is attempted.
    async fn issue_pair(&self, email: &str, device_id: &str) -> Result<TokenPair, ApiError> {
        let refresh_claims = self.codec.create_claims(email, device_id, TokenType::Refresh);

        let txn = self.db.begin().await?;
        ledger::revoke_matching(
            &txn,
            RevokeFilter {
                email,
                device_id: Some(device_id),
            },
        )
        .await?;
        ledger::insert(
            &txn,
            TokenRecord {
                id: refresh_claims.jti.clone(),
                token_type: TokenType::Refresh,
                email: email.to_string(),
                device_id: Some(device_id.to_string()),
            },
        )
        .await?;
        txn.commit().await?;

        let access_claims = self.codec.create_claims(email, device_id, TokenType::Access);

        Ok(TokenPair {
            access_token: self.codec.encode(&access_claims)?,
            refresh_token: self.codec.encode(&refresh_claims)?,
        })
    }
}
