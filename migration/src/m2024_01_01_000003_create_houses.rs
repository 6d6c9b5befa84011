//! Migration to create the houses table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Houses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Houses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Houses::SchoolId).uuid().not_null())
                    .col(ColumnDef::new(Houses::Name).text().not_null())
                    .col(ColumnDef::new(Houses::Description).text().null())
                    .col(
                        ColumnDef::new(Houses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Houses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_houses_school_id")
                            .from(Houses::Table, Houses::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // House names are unique per school, not globally.
        manager
            .create_index(
                Index::create()
                    .name("idx_houses_school_name")
                    .table(Houses::Table)
                    .col(Houses::SchoolId)
                    .col(Houses::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_houses_school_name").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Houses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Houses {
    Table,
    Id,
    SchoolId,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
}
