use sea_orm_migration::prelude::*;

use crate::m20261019_000004_create_applications::Applications;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Documents::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Documents::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Documents::ApplicationId)
                            .string_len(36)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Documents::Filename).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Documents::OriginalName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Documents::Mimetype).string_len(127).not_null())
                    .col(ColumnDef::new(Documents::Size).big_integer().not_null())
                    .col(
                        ColumnDef::new(Documents::UploadedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-documents-application_id")
                            .from(Documents::Table, Documents::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Documents::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Documents {
    Table,
    Id,
    ApplicationId,
    Filename,
    OriginalName,
    Mimetype,
    Size,
    UploadedAt,
}
