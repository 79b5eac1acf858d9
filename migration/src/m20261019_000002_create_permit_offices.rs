use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PermitOffices::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PermitOffices::Id)
                            .string_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PermitOffices::Name).string_len(255).not_null())
                    .col(ColumnDef::new(PermitOffices::Description).text().null())
                    .col(ColumnDef::new(PermitOffices::Address).string_len(255).not_null())
                    .col(ColumnDef::new(PermitOffices::City).string_len(100).not_null())
                    .col(ColumnDef::new(PermitOffices::State).string_len(50).not_null())
                    .col(ColumnDef::new(PermitOffices::ZipCode).string_len(20).not_null())
                    .col(ColumnDef::new(PermitOffices::Phone).string_len(64).null())
                    .col(ColumnDef::new(PermitOffices::Email).string_len(255).null())
                    .col(ColumnDef::new(PermitOffices::Website).text().null())
                    .col(ColumnDef::new(PermitOffices::Latitude).double().null())
                    .col(ColumnDef::new(PermitOffices::Longitude).double().null())
                    .col(
                        ColumnDef::new(PermitOffices::Hours)
                            .text()
                            .not_null()
                            .default("{}"),
                    )
                    .col(
                        ColumnDef::new(PermitOffices::ServicesOffered)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(PermitOffices::PermitTypes)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(PermitOffices::CreatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(PermitOffices::UpdatedAt)
                            .date_time()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-permit_offices-city-state")
                    .table(PermitOffices::Table)
                    .col(PermitOffices::City)
                    .col(PermitOffices::State)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PermitOffices::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum PermitOffices {
    Table,
    Id,
    Name,
    Description,
    Address,
    City,
    State,
    ZipCode,
    Phone,
    Email,
    Website,
    Latitude,
    Longitude,
    Hours,
    ServicesOffered,
    PermitTypes,
    CreatedAt,
    UpdatedAt,
}
