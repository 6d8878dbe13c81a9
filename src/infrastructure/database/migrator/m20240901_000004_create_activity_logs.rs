//! Create activity_logs table

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ActivityLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ActivityLogs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ActivityLogs::UserId).string().not_null())
                    .col(ColumnDef::new(ActivityLogs::Action).string_len(100).not_null())
                    .col(ColumnDef::new(ActivityLogs::Description).text().not_null())
                    .col(
                        ColumnDef::new(ActivityLogs::IpAddress)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ActivityLogs::AdditionalInfo).text())
                    .col(
                        ColumnDef::new(ActivityLogs::Timestamp)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_logs_user_id")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::UserId)
                    .to_owned(),
            )
            .await?;

        // Retention purge scans by age
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_activity_logs_timestamp")
                    .table(ActivityLogs::Table)
                    .col(ActivityLogs::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ActivityLogs::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum ActivityLogs {
    Table,
    Id,
    UserId,
    Action,
    Description,
    IpAddress,
    AdditionalInfo,
    Timestamp,
}
