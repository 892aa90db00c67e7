use sea_orm_migration::prelude::*;

use super::m20250601_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JwtTokens::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(JwtTokens::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(JwtTokens::TokenType).string().not_null())
                    .col(ColumnDef::new(JwtTokens::Email).string().not_null())
                    .col(ColumnDef::new(JwtTokens::DeviceId).string().null())
                    .col(
                        ColumnDef::new(JwtTokens::IsRevoked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-jwt_tokens-email")
                            .from(JwtTokens::Table, JwtTokens::Email)
                            .to(Users::Table, Users::Email)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Bulk revocation filters on (email, device_id).
        manager
            .create_index(
                Index::create()
                    .name("idx-jwt_tokens-email-device_id")
                    .table(JwtTokens::Table)
                    .col(JwtTokens::Email)
                    .col(JwtTokens::DeviceId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JwtTokens::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum JwtTokens {
    Table,
    Id,
    TokenType,
    Email,
    DeviceId,
    IsRevoked,
}
