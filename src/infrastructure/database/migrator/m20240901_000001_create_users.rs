//! Create users table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::PhoneNumber).string_len(50))
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Users::LastModifiedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::LastLogin).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::DeletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::DeletedBy).string())
                    .col(ColumnDef::new(Users::PendingEmail).string_len(255))
                    .col(ColumnDef::new(Users::EmailVerificationToken).string())
                    .col(ColumnDef::new(Users::EmailTokenExpiresAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::PasswordResetToken).string())
                    .col(ColumnDef::new(Users::ResetTokenExpiresAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    FirstName,
    LastName,
    PhoneNumber,
    IsActive,
    CreatedAt,
    LastModifiedAt,
    LastLogin,
    DeletedAt,
    DeletedBy,
    PendingEmail,
    EmailVerificationToken,
    EmailTokenExpiresAt,
    PasswordResetToken,
    ResetTokenExpiresAt,
}
