use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persisted record of one issued refresh token (the token ledger).
///
/// Access tokens are never persisted — their validity is expiry-only.
/// Rows are appended on issuance and soft-revoked, never deleted, except
/// by cascade when the owning user is deleted.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jwt_tokens")]
pub struct Model {
    /// The token's embedded `jti` claim
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Always "refresh" in persisted form
    pub token_type: String,

    /// Owning user's email (FK → users.email, cascade delete)
    pub email: String,

    /// Client device/session identifier
    pub device_id: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_revoked: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
