//! Create role_profiles table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RoleProfiles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RoleProfiles::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RoleProfiles::UserId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(RoleProfiles::Role).string_len(20).not_null())
                    .col(
                        ColumnDef::new(RoleProfiles::CompletedTasksCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RoleProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(RoleProfiles::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_role_profiles_role")
                    .table(RoleProfiles::Table)
                    .col(RoleProfiles::Role)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoleProfiles::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum RoleProfiles {
    Table,
    Id,
    UserId,
    Role,
    CompletedTasksCount,
    CreatedAt,
    UpdatedAt,
}
