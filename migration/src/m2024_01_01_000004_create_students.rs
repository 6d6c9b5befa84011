//! Migration to create the students table.
//!
//! Student reference numbers repeat across schools but not within one, so
//! the unique index is composite on (school_id, student_ref).

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Students::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Students::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Students::SchoolId).uuid().not_null())
                    .col(ColumnDef::new(Students::HouseId).uuid().null())
                    .col(ColumnDef::new(Students::UserId).uuid().not_null())
                    .col(ColumnDef::new(Students::StudentRef).text().not_null())
                    .col(ColumnDef::new(Students::FullName).text().not_null())
                    .col(ColumnDef::new(Students::GuardianName).text().null())
                    .col(ColumnDef::new(Students::GuardianPhone).text().null())
                    .col(ColumnDef::new(Students::PhotoPath).text().null())
                    .col(
                        ColumnDef::new(Students::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Students::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_school_id")
                            .from(Students::Table, Students::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_house_id")
                            .from(Students::Table, Students::HouseId)
                            .to(Houses::Table, Houses::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_students_user_id")
                            .from(Students::Table, Students::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_school_ref")
                    .table(Students::Table)
                    .col(Students::SchoolId)
                    .col(Students::StudentRef)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_user_id")
                    .table(Students::Table)
                    .col(Students::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_students_house_id")
                    .table(Students::Table)
                    .col(Students::HouseId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_students_school_ref").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_students_user_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_students_house_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Students::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Students {
    Table,
    Id,
    SchoolId,
    HouseId,
    UserId,
    StudentRef,
    FullName,
    GuardianName,
    GuardianPhone,
    PhotoPath,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Schools {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Houses {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
}
