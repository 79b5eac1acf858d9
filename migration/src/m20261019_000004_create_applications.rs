use sea_orm_migration::prelude::*;

use crate::m20261019_000001_create_users::Users;
use crate::m20261019_000002_create_permit_offices::PermitOffices;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Applications::PermitType)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::Status)
                            .string_len(20)
                            .not_null()
                            .default("DRAFT"),
                    )
                    .col(
                        ColumnDef::new(Applications::ApplicationData)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(Applications::UserId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::PermitOfficeId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Applications::SubmittedAt).date_time().null())
                    .col(
                        ColumnDef::new(Applications::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Applications::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-applications-user_id")
                            .from(Applications::Table, Applications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-applications-permit_office_id")
                            .from(Applications::Table, Applications::PermitOfficeId)
                            .to(PermitOffices::Table, PermitOffices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-applications-user_id")
                    .table(Applications::Table)
                    .col(Applications::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum Applications {
    Table,
    Id,
    PermitType,
    Status,
    ApplicationData,
    UserId,
    PermitOfficeId,
    SubmittedAt,
    CreatedAt,
    UpdatedAt,
}
