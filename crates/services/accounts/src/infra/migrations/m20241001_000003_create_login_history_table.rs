//! Migration: Create login_history table.

use sea_orm_migration::prelude::*;

use super::m20241001_000001_create_users_table::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(LoginHistory::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(LoginHistory::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(LoginHistory::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(LoginHistory::LoginTime)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(LoginHistory::IpAddress).string_len(45).null())
                    .col(
                        ColumnDef::new(LoginHistory::UserAgent)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_login_history_user")
                            .from(LoginHistory::Table, LoginHistory::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Recent logins per user, newest first
        manager
            .create_index(
                Index::create()
                    .name("idx_login_history_user_time")
                    .table(LoginHistory::Table)
                    .col(LoginHistory::UserId)
                    .col(LoginHistory::LoginTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LoginHistory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum LoginHistory {
    Table,
    Id,
    UserId,
    LoginTime,
    IpAddress,
    UserAgent,
}
