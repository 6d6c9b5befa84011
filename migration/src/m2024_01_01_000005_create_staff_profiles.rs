//! Migration to create the staff profile tables.
//!
//! Three role extensions over users: sub_admins (one per school),
//! house_supervisors (one per house) and security_people (many per school).
//! The one-per-scope invariants are unique indexes, not application checks
//! alone.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubAdmins::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SubAdmins::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SubAdmins::SchoolId).uuid().not_null())
                    .col(ColumnDef::new(SubAdmins::UserId).uuid().not_null())
                    .col(ColumnDef::new(SubAdmins::FullName).text().not_null())
                    .col(ColumnDef::new(SubAdmins::Phone).text().null())
                    .col(
                        ColumnDef::new(SubAdmins::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_admins_school_id")
                            .from(SubAdmins::Table, SubAdmins::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sub_admins_user_id")
                            .from(SubAdmins::Table, SubAdmins::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one sub-admin per school.
        manager
            .create_index(
                Index::create()
                    .name("idx_sub_admins_school_id")
                    .table(SubAdmins::Table)
                    .col(SubAdmins::SchoolId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_sub_admins_user_id")
                    .table(SubAdmins::Table)
                    .col(SubAdmins::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(HouseSupervisors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HouseSupervisors::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(HouseSupervisors::HouseId).uuid().not_null())
                    .col(ColumnDef::new(HouseSupervisors::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(HouseSupervisors::FullName)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(HouseSupervisors::Phone).text().null())
                    .col(
                        ColumnDef::new(HouseSupervisors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_house_supervisors_house_id")
                            .from(HouseSupervisors::Table, HouseSupervisors::HouseId)
                            .to(Houses::Table, Houses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_house_supervisors_user_id")
                            .from(HouseSupervisors::Table, HouseSupervisors::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one supervisor per house.
        manager
            .create_index(
                Index::create()
                    .name("idx_house_supervisors_house_id")
                    .table(HouseSupervisors::Table)
                    .col(HouseSupervisors::HouseId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_house_supervisors_user_id")
                    .table(HouseSupervisors::Table)
                    .col(HouseSupervisors::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SecurityPeople::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SecurityPeople::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SecurityPeople::SchoolId).uuid().not_null())
                    .col(ColumnDef::new(SecurityPeople::UserId).uuid().not_null())
                    .col(ColumnDef::new(SecurityPeople::FullName).text().not_null())
                    .col(ColumnDef::new(SecurityPeople::Phone).text().null())
                    .col(
                        ColumnDef::new(SecurityPeople::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_security_people_school_id")
                            .from(SecurityPeople::Table, SecurityPeople::SchoolId)
                            .to(Schools::Table, Schools::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_security_people_user_id")
                            .from(SecurityPeople::Table, SecurityPeople::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_security_people_user_id")
                    .table(SecurityPeople::Table)
                    .col(SecurityPeople::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_security_people_school_id")
                    .table(SecurityPeople::Table)
                    .col(SecurityPeople::SchoolId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SecurityPeople::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(HouseSupervisors::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SubAdmins::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SubAdmins {
    Table,
    Id,
    SchoolId,
    UserId,
    FullName,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
enum HouseSupervisors {
    Table,
    Id,
    HouseId,
    UserId,
    FullName,
    Phone,
    CreatedAt,
}

#[derive(DeriveIden)]
enum SecurityPeople {
    Table,
    Id,
    SchoolId,
    UserId,
    FullName,
    Phone,
    CreatedAt,
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
