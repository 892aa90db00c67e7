use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};

use crate::auth::jwt::TokenType;
use crate::error::ApiError;
use crate::models::jwt_token;

/// A refresh token to append to the ledger.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    pub id: String,
    pub token_type: TokenType,
    pub email: String,
    pub device_id: Option<String>,
}

/// Exact-match filter for bulk revocation: `{email, device_id}` for a single
/// device, `{email}` alone for all devices.
#[derive(Debug, Clone, Copy)]
pub struct RevokeFilter<'a> {
    pub email: &'a str,
    pub device_id: Option<&'a str>,
}

/// Append a token record; not revoked by default.
///
/// Generic over [`ConnectionTrait`] so the same call runs on the pool or
/// inside a transaction.
pub async fn insert<C: ConnectionTrait>(conn: &C, record: TokenRecord) -> Result<(), ApiError> {
    let model = jwt_token::ActiveModel {
        id: Set(record.id),
        token_type: Set(record.token_type.to_string()),
        email: Set(record.email),
        device_id: Set(record.device_id),
        is_revoked: Set(false),
    };

    jwt_token::Entity::insert(model).exec(conn).await?;
    Ok(())
}

/// Point lookup of the revocation flag.
///
/// `None` means "no such token id" and must be treated as invalid-token by
/// callers, never as "not revoked".
pub async fn is_revoked<C: ConnectionTrait>(
    conn: &C,
    token_id: &str,
) -> Result<Option<bool>, ApiError> {
    let record = jwt_token::Entity::find_by_id(token_id).one(conn).await?;
    Ok(record.map(|r| r.is_revoked))
}

/// Revoke every non-revoked record matching the filter; returns the number of
/// rows actually flipped. Already-revoked rows are excluded from the match,
/// so repeated calls never double-count.
pub async fn revoke_matching<C: ConnectionTrait>(
    conn: &C,
    filter: RevokeFilter<'_>,
) -> Result<u64, ApiError> {
    let mut query = jwt_token::Entity::update_many()
        .col_expr(jwt_token::Column::IsRevoked, Expr::value(true))
        .filter(jwt_token::Column::Email.eq(filter.email))
        .filter(jwt_token::Column::IsRevoked.eq(false));

    if let Some(device_id) = filter.device_id {
        query = query.filter(jwt_token::Column::DeviceId.eq(device_id));
    }

    let result = query.exec(conn).await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{ConnectOptions, Database, DatabaseConnection};
    use sea_orm_migration::MigratorTrait;

    use crate::migrations::Migrator;
    use crate::models::user;

    async fn test_db() -> DatabaseConnection {
        let mut opts = ConnectOptions::new("sqlite::memory:");
        opts.max_connections(1).sqlx_logging(false);
        let db = Database::connect(opts).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        // Token rows need an owning user for the email FK.
        let model = user::ActiveModel {
            id: Set(uuid::Uuid::new_v4()),
            email: Set("owner@example.com".to_string()),
            username: Set("owner".to_string()),
            first_name: Set(None),
            last_name: Set(None),
            hashed_password: Set("x".to_string()),
        };
        user::Entity::insert(model).exec(&db).await.unwrap();
        db
    }

    fn record(id: &str, device_id: Option<&str>) -> TokenRecord {
        TokenRecord {
            id: id.to_string(),
            token_type: TokenType::Refresh,
            email: "owner@example.com".to_string(),
            device_id: device_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn is_revoked_distinguishes_unknown_live_and_revoked() {
        let db = test_db().await;
        insert(&db, record("jti-1", Some("phone"))).await.unwrap();

        assert_eq!(is_revoked(&db, "no-such-jti").await.unwrap(), None);
        assert_eq!(is_revoked(&db, "jti-1").await.unwrap(), Some(false));

        revoke_matching(
            &db,
            RevokeFilter {
                email: "owner@example.com",
                device_id: Some("phone"),
            },
        )
        .await
        .unwrap();
        assert_eq!(is_revoked(&db, "jti-1").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn revoke_matching_never_double_counts() {
        let db = test_db().await;
        insert(&db, record("jti-a", Some("phone"))).await.unwrap();
        insert(&db, record("jti-b", Some("laptop"))).await.unwrap();

        let filter = RevokeFilter {
            email: "owner@example.com",
            device_id: None,
        };
        assert_eq!(revoke_matching(&db, filter).await.unwrap(), 2);
        assert_eq!(revoke_matching(&db, filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn device_filter_leaves_other_devices_alone() {
        let db = test_db().await;
        insert(&db, record("jti-a", Some("phone"))).await.unwrap();
        insert(&db, record("jti-b", Some("laptop"))).await.unwrap();

        let revoked = revoke_matching(
            &db,
            RevokeFilter {
                email: "owner@example.com",
                device_id: Some("phone"),
            },
        )
        .await
        .unwrap();

        assert_eq!(revoked, 1);
        assert_eq!(is_revoked(&db, "jti-a").await.unwrap(), Some(true));
        assert_eq!(is_revoked(&db, "jti-b").await.unwrap(), Some(false));
    }
}
