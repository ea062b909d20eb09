//! Migration: Create user_profiles table (one row per user).

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
                    .table(UserProfiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserProfiles::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(UserProfiles::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(UserProfiles::Avatar).string_len(255).null())
                    .col(
                        ColumnDef::new(UserProfiles::Role)
                            .string_len(20)
                            .not_null()
                            .default("user"),
                    )
                    .col(text_col(UserProfiles::Phone, 20))
                    .col(text_col(UserProfiles::Department, 100))
                    .col(ColumnDef::new(UserProfiles::Bio).text().not_null().default(""))
                    .col(ColumnDef::new(UserProfiles::BirthDate).date().null())
                    .col(text_col(UserProfiles::Address, 255))
                    .col(text_col(UserProfiles::City, 100))
                    .col(text_col(UserProfiles::State, 2))
                    .col(text_col(UserProfiles::ZipCode, 10))
                    .col(
                        ColumnDef::new(UserProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserProfiles::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_profiles_user")
                            .from(UserProfiles::Table, UserProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserProfiles::Table).to_owned())
            .await
    }
}

fn text_col(column: UserProfiles, len: u32) -> ColumnDef {
    ColumnDef::new(column)
        .string_len(len)
        .not_null()
        .default("")
        .to_owned()
}

#[derive(Iden)]
enum UserProfiles {
    Table,
    Id,
    UserId,
    Avatar,
    Role,
    Phone,
    Department,
    Bio,
    BirthDate,
    Address,
    City,
    State,
    ZipCode,
    CreatedAt,
    UpdatedAt,
}
