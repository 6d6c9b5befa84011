//! Migration to create the schools table.
//!
//! Schools are the tenant roots: every house, student, staff profile and
//! exeat hangs off exactly one school and is removed with it.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Schools::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Schools::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Schools::Name).text().not_null())
                    .col(ColumnDef::new(Schools::Code).text().not_null())
                    .col(ColumnDef::new(Schools::ContactEmail).text().not_null())
                    .col(ColumnDef::new(Schools::ContactPhone).text().null())
                    .col(ColumnDef::new(Schools::Address).text().null())
                    .col(
                        ColumnDef::new(Schools::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Schools::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schools_name")
                    .table(Schools::Table)
                    .col(Schools::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_schools_code")
                    .table(Schools::Table)
                    .col(Schools::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_schools_name").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_schools_code").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Schools::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
    Name,
    Code,
    ContactEmail,
    ContactPhone,
    Address,
    CreatedAt,
    UpdatedAt,
}
