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
                    .table(Reviews::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Reviews::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Reviews::Rating).integer().not_null())
                    .col(ColumnDef::new(Reviews::Comment).text().null())
                    .col(ColumnDef::new(Reviews::UserId).string_len(36).not_null())
                    .col(
                        ColumnDef::new(Reviews::PermitOfficeId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Reviews::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Reviews::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-user_id")
                            .from(Reviews::Table, Reviews::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-reviews-permit_office_id")
                            .from(Reviews::Table, Reviews::PermitOfficeId)
                            .to(PermitOffices::Table, PermitOffices::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One review per user per office
        manager
            .create_index(
                Index::create()
                    .name("idx-reviews-user_id-permit_office_id")
                    .table(Reviews::Table)
                    .col(Reviews::UserId)
                    .col(Reviews::PermitOfficeId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Reviews::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Reviews {
    Table,
    Id,
    Rating,
    Comment,
    UserId,
    PermitOfficeId,
    CreatedAt,
    UpdatedAt,
}
