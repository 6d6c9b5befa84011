//! Migration to create the exeats table.
//!
//! The audit actor columns reference users with SET NULL so that removing a
//! staff account keeps the exeat history intact.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Exeats::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Exeats::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Exeats::SchoolId).uuid().not_null())
                    .col(ColumnDef::new(Exeats::StudentId).uuid().not_null())
                    .col(ColumnDef::new(Exeats::Reason).text().not_null())
                    .col(
                        ColumnDef::new(Exeats::StartDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exeats::EndDate)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Exeats::Status)
                            .text()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Exeats::ApprovedBy).uuid().null())
                    .col(ColumnDef::new(Exeats::SignedOutBy).uuid().null())
                    .col(
                        ColumnDef::new(Exeats::SignedOutTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Exeats::SignedInBy).uuid().null())
                    .col(
                        ColumnDef::new(Exeats::SignedInTime)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Exeats::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Exeats::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exeats_school_id")
                            .from(Exeats::Table, Exeats::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exeats_student_id")
                            .from(Exeats::Table, Exeats::StudentId)
                            .to(Students::Table, Students::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exeats_approved_by")
                            .from(Exeats::Table, Exeats::ApprovedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exeats_signed_out_by")
                            .from(Exeats::Table, Exeats::SignedOutBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_exeats_signed_in_by")
                            .from(Exeats::Table, Exeats::SignedInBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exeats_school_id")
                    .table(Exeats::Table)
                    .col(Exeats::SchoolId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exeats_student_id")
                    .table(Exeats::Table)
                    .col(Exeats::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_exeats_status")
                    .table(Exeats::Table)
                    .col(Exeats::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_exeats_school_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_exeats_student_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_exeats_status").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Exeats::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Exeats {
    Table,
    Id,
    SchoolId,
    StudentId,
    Reason,
    StartDate,
    EndDate,
    Status,
    ApprovedBy,
    SignedOutBy,
    SignedOutTime,
    SignedInBy,
    SignedInTime,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
